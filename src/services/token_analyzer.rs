use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AppError, SkippedEvents};
use crate::models::{
    resolve_for_token, resolve_pool_descriptor, BigBuySummary, DirectTransaction, EthPriceSeries, PoolDescriptor,
    PoolMetadata, PoolVersion, PricePoint, PriceSeries, PriceStatsOutcome, RawLog, RawSwapEvent, VolumeSummary,
};
use crate::services::big_buy_analyzer::BigBuyAnalyzer;
use crate::services::eth_price_reconciler::EthPriceReconciler;
use crate::services::event_ledger::SeenEventLedger;
use crate::services::price_aggregator::PriceAggregator;
use crate::services::price_derivation::PriceDerivationEngine;
use crate::services::swap_decoder::decode_swap_logs;
use crate::services::volume_analyzer::VolumeAnalyzer;
use crate::utils::math::{checked_product, PRICE_SCALE};

/// Everything one analysis run produced for a (token, pool) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAnalysis {
    pub pool: PoolDescriptor,
    pub prices: PriceSeries,
    pub price_stats: PriceStatsOutcome,
    pub big_buy_analysis: BigBuySummary,
    pub volume: VolumeSummary,
    pub skipped_events: SkippedEvents,
    /// Price points and big buys left without an ETH/USD rate
    pub eth_price_unavailable: usize,
    pub new_events: usize,
    pub already_seen_events: usize,
}

/// One self-contained analysis batch, as read by the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub pool: PoolMetadata,
    #[serde(default)]
    pub version: Option<PoolVersion>,
    #[serde(default)]
    pub token_address: Option<Address>,
    /// Undecoded `Swap` logs; decoded and appended to `events`
    #[serde(default)]
    pub logs: Vec<RawLog>,
    #[serde(default)]
    pub events: Vec<RawSwapEvent>,
    #[serde(default)]
    pub transactions: Vec<DirectTransaction>,
    #[serde(default)]
    pub eth_prices: EthPriceSeries,
    #[serde(default)]
    pub ledger: SeenEventLedger,
}

/// Report plus the ledger to hand back to the sink.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis: TokenAnalysis,
    pub ledger: SeenEventLedger,
}

pub struct TokenAnalyzer {
    config: AnalysisConfig,
    engine: PriceDerivationEngine,
    aggregator: PriceAggregator,
    big_buys: BigBuyAnalyzer,
    volume: VolumeAnalyzer,
}

impl TokenAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            engine: PriceDerivationEngine::new(&config),
            aggregator: PriceAggregator::new(),
            big_buys: BigBuyAnalyzer::new(&config),
            volume: VolumeAnalyzer::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the pipeline over one batch.
    ///
    /// Only events and transactions the ledger has not seen are analyzed,
    /// and they are recorded in it. Input order does not matter.
    pub fn analyze(
        &self,
        pool: &PoolDescriptor,
        events: Vec<RawSwapEvent>,
        transactions: Vec<DirectTransaction>,
        eth_prices: &EthPriceSeries,
        ledger: &mut SeenEventLedger,
    ) -> TokenAnalysis {
        let event_delta = ledger.merge_batch(pool.pool_address, events);
        let tx_delta = ledger.merge_batch(pool.pool_address, transactions);

        let mut events = event_delta.new_entries;
        events.sort_by_key(|e| e.ordering_key());
        let mut transactions = tx_delta.new_entries;
        transactions.sort_by_key(|t| (t.block_number, t.tx_hash));

        let reconciler = EthPriceReconciler::new(eth_prices, self.config.eth_price_max_staleness_seconds);
        let mut skipped_events = SkippedEvents::default();
        let mut eth_price_unavailable = 0;
        let mut prices = PriceSeries::new(pool.token_address(), pool.pool_address);

        for event in &events {
            let token_price_eth = match self.engine.derive_price_eth(pool, event) {
                Ok(price) => price,
                Err(reason) => {
                    debug!(tx_hash = %event.tx_hash(), reason = %reason, "Skipping swap event");
                    skipped_events.record(&reason);
                    continue;
                }
            };

            let eth_price_usd = reconciler.price_at(event.timestamp()).cloned();
            if eth_price_usd.is_none() {
                eth_price_unavailable += 1;
            }

            prices.push(PricePoint {
                timestamp: event.timestamp(),
                block_number: event.block_number(),
                log_index: event.log_index(),
                tx_hash: event.tx_hash(),
                token_price_usd: checked_product(Some(&token_price_eth), eth_price_usd.as_ref(), PRICE_SCALE),
                token_price_eth,
                eth_price_usd,
            });
        }

        // Drop transfers whose swap was recorded in this or an earlier batch
        let unclaimed: Vec<DirectTransaction> = transactions
            .iter()
            .filter(|tx| !ledger.has_swap_tx(pool.pool_address, tx.tx_hash))
            .cloned()
            .collect();

        let price_stats = self.aggregator.calculate_stats(&prices);
        let big_buy_analysis = self
            .big_buys
            .analyze(pool, &events, &unclaimed, &prices, &reconciler);
        eth_price_unavailable += big_buy_analysis
            .big_buys
            .iter()
            .filter(|b| b.eth_price_usd.is_none())
            .count();
        let volume = self.volume.summarize(pool, &events, &reconciler);

        if skipped_events.total() > 0 {
            warn!(
                pool_address = %pool.pool_address,
                skipped = skipped_events.total(),
                "⚠️ Some swap events produced no price"
            );
        }

        let analysis = TokenAnalysis {
            pool: pool.clone(),
            prices,
            price_stats,
            big_buy_analysis,
            volume,
            skipped_events,
            eth_price_unavailable,
            new_events: events.len() + transactions.len(),
            already_seen_events: event_delta.already_seen + tx_delta.already_seen,
        };

        info!(
            pool_address = %pool.pool_address,
            token_address = %pool.token_address(),
            version = %pool.version,
            price_points = analysis.prices.len(),
            big_buys = analysis.big_buy_analysis.total_big_buys,
            new_events = analysis.new_events,
            already_seen = analysis.already_seen_events,
            "✅ Token analysis complete"
        );
        analysis
    }

    /// Resolve the pool, decode any raw logs, then [`analyze`](Self::analyze).
    pub fn analyze_request(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AppError> {
        let AnalysisRequest {
            pool,
            version,
            token_address,
            logs,
            mut events,
            transactions,
            eth_prices,
            mut ledger,
        } = request;

        let descriptor = match token_address {
            Some(token) => resolve_for_token(version, &pool, self.config.weth_address, token)?,
            None => resolve_pool_descriptor(version, &pool, self.config.weth_address)?,
        };

        let (decoded, decode_skips) = decode_swap_logs(&descriptor, &logs);
        events.extend(decoded);

        let mut analysis = self.analyze(&descriptor, events, transactions, &eth_prices, &mut ledger);
        analysis.skipped_events.merge(&decode_skips);

        Ok(AnalysisResponse { analysis, ledger })
    }
}
