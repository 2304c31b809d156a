use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One derived price, taken from a single swap event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: u64,
    pub block_number: u64,
    pub log_index: Option<u64>,
    pub tx_hash: B256,
    pub token_price_eth: BigDecimal,
    pub token_price_usd: Option<BigDecimal>,
    pub eth_price_usd: Option<BigDecimal>,
}

impl PricePoint {
    pub fn ordering_key(&self) -> (u64, Option<u64>, u64) {
        (self.block_number, self.log_index, self.timestamp)
    }
}

/// Block-ordered price points for one (token, pool) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub token_address: Address,
    pub pool_address: Address,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(token_address: Address, pool_address: Address) -> Self {
        Self {
            token_address,
            pool_address,
            points: Vec::new(),
        }
    }

    /// Build from points in any order.
    pub fn from_points(token_address: Address, pool_address: Address, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.ordering_key());
        Self {
            token_address,
            pool_address,
            points,
        }
    }

    /// Append a point. Points arriving out of order are slotted into place so
    /// the series stays block-ordered.
    pub fn push(&mut self, point: PricePoint) {
        let key = point.ordering_key();
        match self.points.last() {
            Some(last) if last.ordering_key() > key => {
                let idx = self.points.partition_point(|p| p.ordering_key() <= key);
                self.points.insert(idx, point);
            }
            _ => self.points.push(point),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Last price point recorded in `block_number`, if any.
    pub fn price_in_block(&self, block_number: u64) -> Option<&PricePoint> {
        let end = self.points.partition_point(|p| p.block_number <= block_number);
        self.points[..end]
            .last()
            .filter(|p| p.block_number == block_number)
    }
}

/// Summary statistics over a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub lowest_price_usd: Option<BigDecimal>,
    pub current_price_usd: Option<BigDecimal>,
    pub highest_price_usd: Option<BigDecimal>,
    pub price_change_from_low: Option<BigDecimal>,
    pub price_change_from_high: Option<BigDecimal>,
    pub total_swaps: usize,
    pub lowest_price_block: Option<u64>,
    pub lowest_price_timestamp: Option<u64>,
    pub current_price_block: u64,
    pub current_price_timestamp: u64,
    pub highest_price_block: Option<u64>,
    pub highest_price_timestamp: Option<u64>,
    pub lowest_price_eth: BigDecimal,
    pub highest_price_eth: BigDecimal,
    pub current_price_eth: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceStatsOutcome {
    NoPrices,
    Stats(PriceStats),
}

impl PriceStatsOutcome {
    pub fn stats(&self) -> Option<&PriceStats> {
        match self {
            PriceStatsOutcome::Stats(stats) => Some(stats),
            PriceStatsOutcome::NoPrices => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(block: u64, log_index: Option<u64>, price: i32) -> PricePoint {
        PricePoint {
            timestamp: 1_700_000_000 + block * 12,
            block_number: block,
            log_index,
            tx_hash: B256::with_last_byte(block as u8),
            token_price_eth: BigDecimal::from(price),
            token_price_usd: None,
            eth_price_usd: None,
        }
    }

    #[test]
    fn test_push_keeps_block_order() {
        let mut series = PriceSeries::new(Address::ZERO, Address::ZERO);
        series.push(point(10, Some(1), 1));
        series.push(point(12, Some(0), 2));
        series.push(point(11, Some(3), 3));
        series.push(point(10, Some(0), 4));

        let blocks: Vec<(u64, Option<u64>)> = series.points().iter().map(|p| (p.block_number, p.log_index)).collect();
        assert_eq!(blocks, vec![(10, Some(0)), (10, Some(1)), (11, Some(3)), (12, Some(0))]);
    }

    #[test]
    fn test_price_in_block() {
        let series = PriceSeries::from_points(
            Address::ZERO,
            Address::ZERO,
            vec![point(12, Some(5), 3), point(10, Some(0), 1), point(10, Some(4), 2)],
        );

        assert_eq!(series.price_in_block(10).unwrap().token_price_eth, BigDecimal::from(2));
        assert_eq!(series.price_in_block(12).unwrap().token_price_eth, BigDecimal::from(3));
        assert!(series.price_in_block(11).is_none());
        assert!(series.price_in_block(9).is_none());
        assert!(series.price_in_block(13).is_none());
    }
}
