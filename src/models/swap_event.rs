use alloy::primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};

use crate::models::PoolVersion;

/// Uniswap V2 `Swap(sender, amount0In, amount1In, amount0Out, amount1Out, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2Swap {
    pub sender: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub to: Address,
    pub block_number: u64,
    pub tx_hash: B256,
    pub timestamp: u64,
    #[serde(default)]
    pub log_index: Option<u64>,
}

/// Uniswap V3 `Swap(sender, recipient, amount0, amount1, sqrtPriceX96, liquidity, tick)`.
///
/// Amounts are pool deltas: positive flows into the pool, negative flows out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V3Swap {
    pub sender: Address,
    pub recipient: Address,
    pub amount0: I256,
    pub amount1: I256,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    pub block_number: u64,
    pub tx_hash: B256,
    pub timestamp: u64,
    #[serde(default)]
    pub log_index: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum RawSwapEvent {
    V2(V2Swap),
    V3(V3Swap),
}

impl RawSwapEvent {
    pub fn version(&self) -> PoolVersion {
        match self {
            RawSwapEvent::V2(_) => PoolVersion::V2,
            RawSwapEvent::V3(_) => PoolVersion::V3,
        }
    }

    pub fn block_number(&self) -> u64 {
        match self {
            RawSwapEvent::V2(e) => e.block_number,
            RawSwapEvent::V3(e) => e.block_number,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            RawSwapEvent::V2(e) => e.timestamp,
            RawSwapEvent::V3(e) => e.timestamp,
        }
    }

    pub fn tx_hash(&self) -> B256 {
        match self {
            RawSwapEvent::V2(e) => e.tx_hash,
            RawSwapEvent::V3(e) => e.tx_hash,
        }
    }

    pub fn log_index(&self) -> Option<u64> {
        match self {
            RawSwapEvent::V2(e) => e.log_index,
            RawSwapEvent::V3(e) => e.log_index,
        }
    }

    /// The address that called the pool, usually a router.
    pub fn sender(&self) -> Address {
        match self {
            RawSwapEvent::V2(e) => e.sender,
            RawSwapEvent::V3(e) => e.sender,
        }
    }

    /// The address receiving the swap output.
    pub fn recipient(&self) -> Address {
        match self {
            RawSwapEvent::V2(e) => e.to,
            RawSwapEvent::V3(e) => e.recipient,
        }
    }

    /// Block order, then log index, then timestamp; tx hash keeps it total.
    pub fn ordering_key(&self) -> (u64, Option<u64>, u64, B256) {
        (self.block_number(), self.log_index(), self.timestamp(), self.tx_hash())
    }
}

/// Plain value transfer as reported by the explorer's transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectTransaction {
    pub tx_hash: B256,
    pub block_number: u64,
    pub timestamp: u64,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    #[serde(default)]
    pub is_error: bool,
}

impl DirectTransaction {
    pub fn touches(&self, address: Address) -> bool {
        self.from == address || self.to == Some(address)
    }
}

/// Undecoded event log as returned by `eth_getLogs` or an explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub timestamp: u64,
    pub tx_hash: B256,
    #[serde(default)]
    pub log_index: Option<u64>,
}
