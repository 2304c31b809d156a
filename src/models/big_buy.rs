use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::RawSwapEvent;
use crate::utils::math::{decimal_ratio, USD_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigBuySource {
    SwapEvent,
    DirectTransaction,
}

/// A purchase at or above the ETH threshold, enriched with prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigBuyRecord {
    pub block_number: u64,
    pub timestamp: u64,
    pub log_index: Option<u64>,
    pub tx_hash: B256,
    pub source: BigBuySource,
    pub eth_amount: BigDecimal,
    pub token_amount: Option<BigDecimal>,
    pub buyer: Option<Address>,
    pub raw_swap_fields: Option<RawSwapEvent>,
    pub token_price_eth: Option<BigDecimal>,
    pub token_price_usd: Option<BigDecimal>,
    pub eth_price_usd: Option<BigDecimal>,
    pub usd_value: Option<BigDecimal>,
}

impl BigBuyRecord {
    pub fn ordering_key(&self) -> (u64, Option<u64>, B256) {
        (self.block_number, self.log_index, self.tx_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigBuySummary {
    pub total_big_buys: usize,
    pub threshold_eth: BigDecimal,
    pub big_buys: Vec<BigBuyRecord>,
    pub total_eth_amount: BigDecimal,
    pub average_eth_amount: Option<BigDecimal>,
    pub largest_eth_amount: Option<BigDecimal>,
    /// Sum over records that have a USD value
    pub total_usd_value: Option<BigDecimal>,
    pub swap_event_buys: usize,
    pub direct_transaction_buys: usize,
    pub unique_buyers: usize,
}

impl BigBuySummary {
    pub fn from_records(big_buys: Vec<BigBuyRecord>, threshold_eth: BigDecimal) -> Self {
        let total_eth_amount: BigDecimal = big_buys.iter().map(|b| &b.eth_amount).sum();
        let average_eth_amount = decimal_ratio(&total_eth_amount, &BigDecimal::from(big_buys.len() as u64), USD_SCALE);
        let largest_eth_amount = big_buys.iter().map(|b| &b.eth_amount).max().cloned();

        let usd_values: Vec<&BigDecimal> = big_buys.iter().filter_map(|b| b.usd_value.as_ref()).collect();
        let total_usd_value = if usd_values.is_empty() {
            None
        } else {
            Some(usd_values.into_iter().fold(BigDecimal::zero(), |acc, v| acc + v))
        };

        let swap_event_buys = big_buys.iter().filter(|b| b.source == BigBuySource::SwapEvent).count();
        let unique_buyers = big_buys
            .iter()
            .filter_map(|b| b.buyer)
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_big_buys: big_buys.len(),
            threshold_eth,
            total_eth_amount,
            average_eth_amount,
            largest_eth_amount,
            total_usd_value,
            swap_event_buys,
            direct_transaction_buys: big_buys.len() - swap_event_buys,
            unique_buyers,
            big_buys,
        }
    }
}
