use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::models::{PoolDescriptor, RawSwapEvent, SwapMarker, TraderActivity, VolumeSummary};
use crate::services::eth_price_reconciler::EthPriceReconciler;
use crate::services::price_derivation::{PriceDerivationEngine, TradeDirection};
use crate::utils::math::{checked_product, decimal_ratio, PERCENT_SCALE, USD_SCALE};

/// Block gap that starts a new trading session, roughly an hour.
pub const SESSION_GAP_BLOCKS: u64 = 300;

/// Buy/sell volume and trader activity over a batch of swaps.
pub struct VolumeAnalyzer {
    engine: PriceDerivationEngine,
}

impl VolumeAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            engine: PriceDerivationEngine::new(config),
        }
    }

    /// Swaps with no usable flow still count as trades and traders, but add
    /// no volume.
    pub fn summarize(
        &self,
        pool: &PoolDescriptor,
        events: &[RawSwapEvent],
        reconciler: &EthPriceReconciler<'_>,
    ) -> VolumeSummary {
        let mut buy_count = 0;
        let mut sell_count = 0;
        let mut buy_volume_eth = BigDecimal::zero();
        let mut sell_volume_eth = BigDecimal::zero();
        let mut total_volume_token = BigDecimal::zero();
        let mut total_volume_usd: Option<BigDecimal> = None;
        let mut usd_priced_swaps = 0;
        let mut largest_buy: Option<(BigDecimal, Option<BigDecimal>)> = None;

        let mut senders = HashSet::new();
        let mut recipients = HashSet::new();
        let mut activity: BTreeMap<Address, usize> = BTreeMap::new();

        for event in events {
            let sender = event.sender();
            let recipient = event.recipient();
            senders.insert(sender);
            *activity.entry(sender).or_default() += 1;
            if recipient != sender {
                recipients.insert(recipient);
                *activity.entry(recipient).or_default() += 1;
            }

            let flow = match self.engine.swap_flow(pool, event) {
                Ok(flow) => flow,
                Err(reason) => {
                    debug!(tx_hash = %event.tx_hash(), reason = %reason, "No volume for swap event");
                    continue;
                }
            };

            let usd = checked_product(
                Some(&flow.eth_amount),
                reconciler.price_at(event.timestamp()),
                USD_SCALE,
            );
            if let Some(usd) = &usd {
                usd_priced_swaps += 1;
                total_volume_usd = Some(total_volume_usd.unwrap_or_else(BigDecimal::zero) + usd);
            }
            total_volume_token += &flow.token_amount;

            match flow.direction {
                TradeDirection::Buy => {
                    buy_count += 1;
                    buy_volume_eth += &flow.eth_amount;
                    if largest_buy.as_ref().map_or(true, |(eth, _)| flow.eth_amount > *eth) {
                        largest_buy = Some((flow.eth_amount, usd));
                    }
                }
                TradeDirection::Sell => {
                    sell_count += 1;
                    sell_volume_eth += &flow.eth_amount;
                }
            }
        }

        // Ties go to the smaller address
        let most_active_trader = activity
            .iter()
            .fold(None::<(&Address, usize)>, |best, (address, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((address, count)),
            })
            .map(|(address, swap_count)| TraderActivity {
                address: *address,
                swap_count,
            });

        let first_swap = events.iter().min_by_key(|e| e.ordering_key()).map(marker);
        let last_swap = events.iter().max_by_key(|e| e.ordering_key()).map(marker);
        let (largest_buy_eth, largest_buy_usd) = match largest_buy {
            Some((eth, usd)) => (Some(eth), usd),
            None => (None, None),
        };

        let summary = VolumeSummary {
            total_swaps: events.len(),
            buy_count,
            sell_count,
            total_volume_eth: &buy_volume_eth + &sell_volume_eth,
            buy_sell_ratio: decimal_ratio(&buy_volume_eth, &sell_volume_eth, PERCENT_SCALE),
            buy_volume_eth,
            sell_volume_eth,
            total_volume_token,
            total_volume_usd,
            usd_priced_swaps,
            largest_buy_eth,
            largest_buy_usd,
            unique_traders: activity.len(),
            unique_senders: senders.len(),
            unique_recipients: recipients.len(),
            most_active_trader,
            trading_sessions: trading_sessions(events.iter().map(RawSwapEvent::block_number)),
            first_swap,
            last_swap,
        };

        info!(
            pool_address = %pool.pool_address,
            total_swaps = summary.total_swaps,
            buys = summary.buy_count,
            sells = summary.sell_count,
            total_volume_eth = %summary.total_volume_eth,
            unique_traders = summary.unique_traders,
            "📊 Volume analysis complete"
        );
        summary
    }
}

fn marker(event: &RawSwapEvent) -> SwapMarker {
    SwapMarker {
        block_number: event.block_number(),
        timestamp: event.timestamp(),
        tx_hash: event.tx_hash(),
        sender: event.sender(),
    }
}

/// Count runs of blocks separated by more than [`SESSION_GAP_BLOCKS`].
pub fn trading_sessions(blocks: impl IntoIterator<Item = u64>) -> usize {
    let mut blocks: Vec<u64> = blocks.into_iter().collect();
    if blocks.is_empty() {
        return 0;
    }
    blocks.sort_unstable();
    1 + blocks
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > SESSION_GAP_BLOCKS)
        .count()
}
