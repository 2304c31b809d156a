use bigdecimal::BigDecimal;
use tracing::info;

use crate::models::{PricePoint, PriceSeries, PriceStats, PriceStatsOutcome};
use crate::utils::math::percentage_change;

/// Folds a price series into summary statistics.
pub struct PriceAggregator;

impl PriceAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Low/high/current over `token_price_usd`, with signed percent changes.
    ///
    /// Points without a USD price still count toward `total_swaps` but are
    /// ignored for the USD extrema. An empty series is `NoPrices`.
    pub fn calculate_stats(&self, series: &PriceSeries) -> PriceStatsOutcome {
        let current = match series.last() {
            Some(point) => point,
            None => return PriceStatsOutcome::NoPrices,
        };

        let lowest = extreme_by_usd(series.points(), |candidate, best| candidate < best);
        let highest = extreme_by_usd(series.points(), |candidate, best| candidate > best);

        let lowest_price_usd = lowest.and_then(|p| p.token_price_usd.clone());
        let highest_price_usd = highest.and_then(|p| p.token_price_usd.clone());
        let current_price_usd = current.token_price_usd.clone();

        let price_change_from_low = change_between(lowest_price_usd.as_ref(), current_price_usd.as_ref());
        let price_change_from_high = change_between(highest_price_usd.as_ref(), current_price_usd.as_ref());

        let eth_prices = series.points().iter().map(|p| &p.token_price_eth);
        let lowest_price_eth = eth_prices.clone().min().cloned().unwrap_or_else(|| current.token_price_eth.clone());
        let highest_price_eth = eth_prices.max().cloned().unwrap_or_else(|| current.token_price_eth.clone());

        let stats = PriceStats {
            lowest_price_usd,
            current_price_usd,
            highest_price_usd,
            price_change_from_low,
            price_change_from_high,
            total_swaps: series.len(),
            lowest_price_block: lowest.map(|p| p.block_number),
            lowest_price_timestamp: lowest.map(|p| p.timestamp),
            current_price_block: current.block_number,
            current_price_timestamp: current.timestamp,
            highest_price_block: highest.map(|p| p.block_number),
            highest_price_timestamp: highest.map(|p| p.timestamp),
            lowest_price_eth,
            highest_price_eth,
            current_price_eth: current.token_price_eth.clone(),
        };

        info!(
            total_swaps = stats.total_swaps,
            lowest_price_usd = ?stats.lowest_price_usd,
            highest_price_usd = ?stats.highest_price_usd,
            current_price_usd = ?stats.current_price_usd,
            "📊 Calculated price statistics"
        );

        PriceStatsOutcome::Stats(stats)
    }
}

impl Default for PriceAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// First point (in block order) whose USD price beats every other under `better`.
fn extreme_by_usd<F>(points: &[PricePoint], better: F) -> Option<&PricePoint>
where
    F: Fn(&BigDecimal, &BigDecimal) -> bool,
{
    let mut best: Option<(&PricePoint, &BigDecimal)> = None;
    for point in points {
        if let Some(price) = point.token_price_usd.as_ref() {
            match best {
                Some((_, best_price)) if !better(price, best_price) => {}
                _ => best = Some((point, price)),
            }
        }
    }
    best.map(|(point, _)| point)
}

fn change_between(base: Option<&BigDecimal>, current: Option<&BigDecimal>) -> Option<BigDecimal> {
    match (base, current) {
        (Some(base), Some(current)) => percentage_change(base, current).ok(),
        _ => None,
    }
}
