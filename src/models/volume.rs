use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Where a swap sits in the chain, for first/last markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapMarker {
    pub block_number: u64,
    pub timestamp: u64,
    pub tx_hash: B256,
    pub sender: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderActivity {
    pub address: Address,
    pub swap_count: usize,
}

/// Volume and trader activity over one batch of swap events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub total_swaps: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_volume_eth: BigDecimal,
    pub buy_volume_eth: BigDecimal,
    pub sell_volume_eth: BigDecimal,
    pub total_volume_token: BigDecimal,
    /// Sum over swaps with an ETH/USD rate
    pub total_volume_usd: Option<BigDecimal>,
    pub usd_priced_swaps: usize,
    /// Buy over sell ETH volume; absent when nothing was sold
    pub buy_sell_ratio: Option<BigDecimal>,
    pub largest_buy_eth: Option<BigDecimal>,
    pub largest_buy_usd: Option<BigDecimal>,
    pub unique_traders: usize,
    pub unique_senders: usize,
    pub unique_recipients: usize,
    pub most_active_trader: Option<TraderActivity>,
    /// Runs of swaps with no gap wider than the session gap
    pub trading_sessions: usize,
    pub first_swap: Option<SwapMarker>,
    pub last_swap: Option<SwapMarker>,
}

impl VolumeSummary {
    pub fn is_empty(&self) -> bool {
        self.total_swaps == 0
    }
}
