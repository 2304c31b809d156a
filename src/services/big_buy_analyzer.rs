use alloy::primitives::B256;
use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::models::{
    BigBuyRecord, BigBuySource, BigBuySummary, DirectTransaction, PoolDescriptor, PoolVersion, PriceSeries,
    RawSwapEvent, TokenSide,
};
use crate::services::eth_price_reconciler::EthPriceReconciler;
use crate::services::price_derivation::PriceDerivationEngine;
use crate::utils::math::{checked_product, PRICE_SCALE, USD_SCALE};
use crate::utils::units::{normalize_amount, normalize_signed_amount, wei_to_eth};

/// ETH paid into the pool by one swap, with the tokens it bought.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub eth_amount: BigDecimal,
    pub token_amount: Option<BigDecimal>,
}

/// Finds purchases at or above the ETH threshold and prices them.
pub struct BigBuyAnalyzer {
    engine: PriceDerivationEngine,
    threshold_eth: BigDecimal,
}

impl BigBuyAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            engine: PriceDerivationEngine::new(config),
            threshold_eth: config.threshold_eth.clone(),
        }
    }

    pub fn threshold_eth(&self) -> &BigDecimal {
        &self.threshold_eth
    }

    /// The ETH side of a buy.
    ///
    /// V2 counts WETH in with no WETH out; V3 counts a positive WETH delta.
    /// Returns `None` for sells, degenerate swaps and version mismatches.
    pub fn purchase(&self, pool: &PoolDescriptor, event: &RawSwapEvent) -> Option<Purchase> {
        match (pool.version, event) {
            (PoolVersion::V2, RawSwapEvent::V2(swap)) => {
                let (eth_in, eth_out, token_out) = match pool.token_side {
                    TokenSide::Token0 => (swap.amount1_in, swap.amount1_out, swap.amount0_out),
                    TokenSide::Token1 => (swap.amount0_in, swap.amount0_out, swap.amount1_out),
                };
                if eth_in.is_zero() || !eth_out.is_zero() {
                    return None;
                }
                Some(Purchase {
                    eth_amount: normalize_amount(eth_in, pool.weth_decimals()),
                    token_amount: (!token_out.is_zero()).then(|| normalize_amount(token_out, pool.token_decimals())),
                })
            }
            (PoolVersion::V3, RawSwapEvent::V3(swap)) => {
                let (token_delta, eth_delta) = match pool.token_side {
                    TokenSide::Token0 => (swap.amount0, swap.amount1),
                    TokenSide::Token1 => (swap.amount1, swap.amount0),
                };
                let eth_amount = normalize_signed_amount(eth_delta, pool.weth_decimals());
                if !eth_amount.is_positive() {
                    return None;
                }
                let token_amount = normalize_signed_amount(token_delta, pool.token_decimals());
                Some(Purchase {
                    eth_amount,
                    token_amount: token_amount.is_negative().then(|| token_amount.abs()),
                })
            }
            _ => None,
        }
    }

    /// Big buys from swap events and direct pool transfers, in block order.
    ///
    /// A transfer sharing its hash with any swap in `events` is not a
    /// separate purchase.
    pub fn find_big_buys(
        &self,
        pool: &PoolDescriptor,
        events: &[RawSwapEvent],
        transactions: &[DirectTransaction],
        prices: &PriceSeries,
        reconciler: &EthPriceReconciler<'_>,
    ) -> Vec<BigBuyRecord> {
        let mut records = Vec::new();
        // Any swap, big or not, claims its transaction's ETH value
        let swap_tx_hashes: HashSet<B256> = events.iter().map(RawSwapEvent::tx_hash).collect();

        for event in events {
            let purchase = match self.purchase(pool, event) {
                Some(purchase) if purchase.eth_amount >= self.threshold_eth => purchase,
                _ => continue,
            };

            let token_price_eth = self
                .engine
                .derive_price_eth(pool, event)
                .ok()
                .or_else(|| prices.price_in_block(event.block_number()).map(|p| p.token_price_eth.clone()));

            records.push(self.enrich(
                BigBuyRecord {
                    block_number: event.block_number(),
                    timestamp: event.timestamp(),
                    log_index: event.log_index(),
                    tx_hash: event.tx_hash(),
                    source: BigBuySource::SwapEvent,
                    eth_amount: purchase.eth_amount,
                    token_amount: purchase.token_amount,
                    buyer: Some(event.recipient()),
                    raw_swap_fields: Some(event.clone()),
                    token_price_eth,
                    token_price_usd: None,
                    eth_price_usd: None,
                    usd_value: None,
                },
                reconciler,
            ));
        }

        for tx in transactions {
            if tx.is_error || !tx.touches(pool.pool_address) || swap_tx_hashes.contains(&tx.tx_hash) {
                continue;
            }
            let eth_amount = wei_to_eth(tx.value);
            if eth_amount < self.threshold_eth {
                continue;
            }

            debug!(tx_hash = %tx.tx_hash, eth_amount = %eth_amount, "Direct transfer big buy");
            records.push(self.enrich(
                BigBuyRecord {
                    block_number: tx.block_number,
                    timestamp: tx.timestamp,
                    log_index: None,
                    tx_hash: tx.tx_hash,
                    source: BigBuySource::DirectTransaction,
                    eth_amount,
                    token_amount: None,
                    buyer: Some(tx.from),
                    raw_swap_fields: None,
                    token_price_eth: prices.price_in_block(tx.block_number).map(|p| p.token_price_eth.clone()),
                    token_price_usd: None,
                    eth_price_usd: None,
                    usd_value: None,
                },
                reconciler,
            ));
        }

        records.sort_by_key(|r| r.ordering_key());
        records
    }

    pub fn analyze(
        &self,
        pool: &PoolDescriptor,
        events: &[RawSwapEvent],
        transactions: &[DirectTransaction],
        prices: &PriceSeries,
        reconciler: &EthPriceReconciler<'_>,
    ) -> BigBuySummary {
        let records = self.find_big_buys(pool, events, transactions, prices, reconciler);
        let summary = BigBuySummary::from_records(records, self.threshold_eth.clone());

        info!(
            pool_address = %pool.pool_address,
            total_big_buys = summary.total_big_buys,
            swap_event_buys = summary.swap_event_buys,
            direct_transaction_buys = summary.direct_transaction_buys,
            threshold_eth = %self.threshold_eth,
            "🐋 Big buy analysis complete"
        );
        summary
    }

    fn enrich(&self, mut record: BigBuyRecord, reconciler: &EthPriceReconciler<'_>) -> BigBuyRecord {
        let eth_price_usd = reconciler.price_at(record.timestamp).cloned();
        record.token_price_usd = checked_product(record.token_price_eth.as_ref(), eth_price_usd.as_ref(), PRICE_SCALE);
        record.usd_value = checked_product(Some(&record.eth_amount), eth_price_usd.as_ref(), USD_SCALE);
        record.eth_price_usd = eth_price_usd;
        record
    }
}
