use bigdecimal::BigDecimal;
use tracing::debug;

use crate::models::{EthPriceSample, EthPriceSeries};
use crate::utils::time::{format_timestamp, time_diff_seconds};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    #[error("ETH price series is empty")]
    EmptySeries,

    #[error("Nearest ETH price sample at {nearest_timestamp} is {distance_seconds}s away, beyond the staleness bound")]
    Stale {
        nearest_timestamp: u64,
        distance_seconds: u64,
    },
}

/// Maps a block timestamp onto a historical ETH/USD series.
///
/// Inside the series range the nearest sample is always used, however wide
/// the gap. Outside it, the edge sample is used only within
/// `max_staleness_seconds`. Equal distances resolve to the earlier sample.
pub struct EthPriceReconciler<'a> {
    series: &'a EthPriceSeries,
    max_staleness_seconds: u64,
}

impl<'a> EthPriceReconciler<'a> {
    pub fn new(series: &'a EthPriceSeries, max_staleness_seconds: u64) -> Self {
        Self {
            series,
            max_staleness_seconds,
        }
    }

    pub fn reconcile(&self, timestamp: u64) -> Result<&'a EthPriceSample, ReconciliationError> {
        let samples = self.series.samples();
        if samples.is_empty() {
            return Err(ReconciliationError::EmptySeries);
        }

        let idx = samples.partition_point(|s| s.timestamp < timestamp);
        let before = idx.checked_sub(1).map(|i| &samples[i]);
        let after = samples.get(idx);

        let sample = match (before, after) {
            (Some(before), Some(after)) => {
                if timestamp - before.timestamp <= after.timestamp - timestamp {
                    before
                } else {
                    after
                }
            }
            (Some(edge), None) | (None, Some(edge)) => {
                let distance_seconds = time_diff_seconds(edge.timestamp, timestamp);
                if distance_seconds > self.max_staleness_seconds {
                    debug!(
                        at = %format_timestamp(timestamp),
                        nearest_sample = %format_timestamp(edge.timestamp),
                        distance_seconds,
                        "ETH price sample too far from timestamp"
                    );
                    return Err(ReconciliationError::Stale {
                        nearest_timestamp: edge.timestamp,
                        distance_seconds,
                    });
                }
                edge
            }
            (None, None) => return Err(ReconciliationError::EmptySeries),
        };

        debug!(timestamp, sample_timestamp = sample.timestamp, price_usd = %sample.price_usd, "Reconciled ETH price");
        Ok(sample)
    }

    /// USD price of ETH at `timestamp`, absent when unavailable.
    pub fn price_at(&self, timestamp: u64) -> Option<&'a BigDecimal> {
        self.reconcile(timestamp).ok().map(|s| &s.price_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(u64, i32)]) -> EthPriceSeries {
        EthPriceSeries::new(
            points
                .iter()
                .map(|(timestamp, price)| EthPriceSample {
                    timestamp: *timestamp,
                    price_usd: BigDecimal::from(*price),
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_series_is_unavailable() {
        let empty = EthPriceSeries::default();
        let reconciler = EthPriceReconciler::new(&empty, 7200);
        assert_eq!(reconciler.reconcile(1_000).unwrap_err(), ReconciliationError::EmptySeries);
        assert!(reconciler.price_at(1_000).is_none());
    }

    #[test]
    fn test_nearest_sample() {
        let s = series(&[(1_000, 1), (2_000, 2), (3_000, 3)]);
        let reconciler = EthPriceReconciler::new(&s, 60);
        assert_eq!(reconciler.price_at(1_000), Some(&BigDecimal::from(1)));
        assert_eq!(reconciler.price_at(1_400), Some(&BigDecimal::from(1)));
        assert_eq!(reconciler.price_at(1_600), Some(&BigDecimal::from(2)));
        assert_eq!(reconciler.price_at(2_999), Some(&BigDecimal::from(3)));
    }

    #[test]
    fn test_tie_resolves_to_earlier_sample() {
        let s = series(&[(1_000, 1), (2_000, 2)]);
        let reconciler = EthPriceReconciler::new(&s, 60);
        assert_eq!(reconciler.price_at(1_500), Some(&BigDecimal::from(1)));
    }

    #[test]
    fn test_gaps_inside_range_are_tolerated() {
        let s = series(&[(0, 1), (1_000_000, 2)]);
        let reconciler = EthPriceReconciler::new(&s, 60);
        assert_eq!(reconciler.price_at(400_000), Some(&BigDecimal::from(1)));
    }

    #[test]
    fn test_outside_range_respects_staleness_bound() {
        let s = series(&[(10_000, 1), (20_000, 2)]);
        let reconciler = EthPriceReconciler::new(&s, 7200);

        assert_eq!(reconciler.price_at(3_000), Some(&BigDecimal::from(1)));
        assert_eq!(reconciler.price_at(27_000), Some(&BigDecimal::from(2)));

        assert_eq!(
            reconciler.reconcile(2_000).unwrap_err(),
            ReconciliationError::Stale {
                nearest_timestamp: 10_000,
                distance_seconds: 8_000
            }
        );
        assert!(reconciler.price_at(30_000).is_none());
    }
}
