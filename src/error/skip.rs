use serde::{Deserialize, Serialize};

/// Why a single swap event produced no price point.
///
/// These never abort a batch; callers tally them in [`SkippedEvents`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("Zero token-side or ETH-side amount")]
    ZeroAmount,

    #[error("Invalid sqrtPriceX96: {0}")]
    InvalidSqrtPrice(String),

    #[error("Event shape does not match pool version {0}")]
    VersionMismatch(String),

    #[error("Undecodable swap log: {0}")]
    Undecodable(String),

    #[error("Implausible derived price: {0} ETH")]
    ImplausiblePrice(String),
}

/// Per-reason counters for skipped events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEvents {
    pub zero_amount: usize,
    pub invalid_sqrt_price: usize,
    pub version_mismatch: usize,
    pub undecodable: usize,
    pub implausible_price: usize,
}

impl SkippedEvents {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::ZeroAmount => self.zero_amount += 1,
            SkipReason::InvalidSqrtPrice(_) => self.invalid_sqrt_price += 1,
            SkipReason::VersionMismatch(_) => self.version_mismatch += 1,
            SkipReason::Undecodable(_) => self.undecodable += 1,
            SkipReason::ImplausiblePrice(_) => self.implausible_price += 1,
        }
    }

    pub fn merge(&mut self, other: &SkippedEvents) {
        self.zero_amount += other.zero_amount;
        self.invalid_sqrt_price += other.invalid_sqrt_price;
        self.version_mismatch += other.version_mismatch;
        self.undecodable += other.undecodable;
        self.implausible_price += other.implausible_price;
    }

    pub fn total(&self) -> usize {
        self.zero_amount
            + self.invalid_sqrt_price
            + self.version_mismatch
            + self.undecodable
            + self.implausible_price
    }
}
