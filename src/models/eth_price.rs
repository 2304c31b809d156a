use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthPriceSample {
    pub timestamp: u64,
    pub price_usd: BigDecimal,
}

/// Historical ETH/USD samples, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EthPriceSample>", into = "Vec<EthPriceSample>")]
pub struct EthPriceSeries {
    samples: Vec<EthPriceSample>,
}

impl EthPriceSeries {
    /// Sorts by timestamp. For duplicate timestamps the first sample given wins.
    pub fn new(mut samples: Vec<EthPriceSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        samples.dedup_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn samples(&self) -> &[EthPriceSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

impl From<Vec<EthPriceSample>> for EthPriceSeries {
    fn from(samples: Vec<EthPriceSample>) -> Self {
        Self::new(samples)
    }
}

impl From<EthPriceSeries> for Vec<EthPriceSample> {
    fn from(series: EthPriceSeries) -> Self {
        series.samples
    }
}
