use alloy::primitives::U256;
use num_bigint::BigInt;
use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::SkipReason;
use crate::models::{PoolDescriptor, PoolVersion, RawSwapEvent, TokenSide, V2Swap, V3Swap};
use crate::utils::math::{pow10, ratio, PRICE_SCALE};
use crate::utils::units::{i256_to_bigint, u256_to_bigint};

/// TickMath.MIN_SQRT_RATIO
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);

/// TickMath.MAX_SQRT_RATIO
pub const MAX_SQRT_RATIO: U256 = U256::from_limbs([
    0x5d951d5263988d26,
    0xefd1fc6a50648849,
    0x00000000fffd8963,
    0,
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    /// ETH into the pool, token out
    Buy,
    /// Token into the pool, ETH out
    Sell,
}

/// Both legs of a swap, decimal-adjusted and unsigned.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapFlow {
    pub direction: TradeDirection,
    pub eth_amount: BigDecimal,
    pub token_amount: BigDecimal,
}

/// Signed raw deltas from the pool's point of view (positive = into the pool).
struct PoolDeltas {
    eth: BigInt,
    token: BigInt,
}

impl PoolDeltas {
    fn direction(&self) -> Option<TradeDirection> {
        if self.eth.is_positive() && self.token.is_negative() {
            Some(TradeDirection::Buy)
        } else if self.eth.is_negative() && self.token.is_positive() {
            Some(TradeDirection::Sell)
        } else {
            None
        }
    }
}

/// Turns one version-specific swap event into a token price in ETH.
pub struct PriceDerivationEngine {
    max_plausible_price_eth: BigDecimal,
}

impl PriceDerivationEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_plausible_price_eth: config.max_plausible_price_eth.clone(),
        }
    }

    /// Token price in ETH for one event.
    ///
    /// V2 prices come from the traded amounts, V3 prices from `sqrtPriceX96`.
    /// Any failure is a [`SkipReason`] for the caller to tally.
    pub fn derive_price_eth(&self, pool: &PoolDescriptor, event: &RawSwapEvent) -> Result<BigDecimal, SkipReason> {
        let price = match (pool.version, event) {
            (PoolVersion::V2, RawSwapEvent::V2(swap)) => self.derive_v2(pool, swap)?,
            (PoolVersion::V3, RawSwapEvent::V3(swap)) => self.derive_v3(pool, swap)?,
            (version, _) => return Err(SkipReason::VersionMismatch(version.to_string())),
        };

        if price.is_zero() || price > self.max_plausible_price_eth {
            return Err(SkipReason::ImplausiblePrice(price.to_string()));
        }

        debug!(
            tx_hash = %event.tx_hash(),
            block_number = event.block_number(),
            price_eth = %price,
            "Derived swap price"
        );
        Ok(price)
    }

    /// ETH and token legs of the swap with the trade direction.
    pub fn swap_flow(&self, pool: &PoolDescriptor, event: &RawSwapEvent) -> Result<SwapFlow, SkipReason> {
        let deltas = match (pool.version, event) {
            (PoolVersion::V2, RawSwapEvent::V2(swap)) => v2_deltas(pool, swap),
            (PoolVersion::V3, RawSwapEvent::V3(swap)) => v3_deltas(pool, swap),
            (version, _) => return Err(SkipReason::VersionMismatch(version.to_string())),
        };

        let direction = deltas.direction().ok_or(SkipReason::ZeroAmount)?;
        Ok(SwapFlow {
            direction,
            eth_amount: BigDecimal::new(deltas.eth.abs(), pool.weth_decimals() as i64),
            token_amount: BigDecimal::new(deltas.token.abs(), pool.token_decimals() as i64),
        })
    }

    fn derive_v2(&self, pool: &PoolDescriptor, swap: &V2Swap) -> Result<BigDecimal, SkipReason> {
        let deltas = v2_deltas(pool, swap);
        if deltas.direction().is_none() {
            return Err(SkipReason::ZeroAmount);
        }

        // (eth / 10^weth_dec) / (token / 10^token_dec), as one integer ratio
        let numerator = deltas.eth.abs() * pow10(pool.token_decimals() as u32);
        let denominator = deltas.token.abs() * pow10(pool.weth_decimals() as u32);
        ratio(&numerator, &denominator, PRICE_SCALE).ok_or(SkipReason::ZeroAmount)
    }

    fn derive_v3(&self, pool: &PoolDescriptor, swap: &V3Swap) -> Result<BigDecimal, SkipReason> {
        match pool.token_side {
            TokenSide::Token0 => price_token0_in_token1(swap.sqrt_price_x96, pool.token0_decimals, pool.token1_decimals),
            TokenSide::Token1 => price_token1_in_token0(swap.sqrt_price_x96, pool.token0_decimals, pool.token1_decimals),
        }
    }
}

fn v2_deltas(pool: &PoolDescriptor, swap: &V2Swap) -> PoolDeltas {
    let delta0 = u256_to_bigint(swap.amount0_in) - u256_to_bigint(swap.amount0_out);
    let delta1 = u256_to_bigint(swap.amount1_in) - u256_to_bigint(swap.amount1_out);
    side_deltas(pool.token_side, delta0, delta1)
}

fn v3_deltas(pool: &PoolDescriptor, swap: &V3Swap) -> PoolDeltas {
    side_deltas(pool.token_side, i256_to_bigint(swap.amount0), i256_to_bigint(swap.amount1))
}

fn side_deltas(token_side: TokenSide, delta0: BigInt, delta1: BigInt) -> PoolDeltas {
    match token_side {
        TokenSide::Token0 => PoolDeltas { token: delta0, eth: delta1 },
        TokenSide::Token1 => PoolDeltas { token: delta1, eth: delta0 },
    }
}

fn check_sqrt_price(sqrt_price_x96: U256) -> Result<BigInt, SkipReason> {
    if sqrt_price_x96.is_zero() {
        return Err(SkipReason::InvalidSqrtPrice("zero".to_string()));
    }
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 > MAX_SQRT_RATIO {
        return Err(SkipReason::InvalidSqrtPrice(format!("{} outside tick range", sqrt_price_x96)));
    }
    Ok(u256_to_bigint(sqrt_price_x96))
}

fn q192() -> BigInt {
    BigInt::from(1u8) << 192
}

/// Human-scale price of token0 denominated in token1:
/// (sqrtPriceX96 / 2^96)^2 * 10^(decimals0 - decimals1).
pub fn price_token0_in_token1(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Result<BigDecimal, SkipReason> {
    let sqrt = check_sqrt_price(sqrt_price_x96)?;
    let numerator = &sqrt * &sqrt * pow10(decimals0 as u32);
    let denominator = q192() * pow10(decimals1 as u32);
    ratio(&numerator, &denominator, PRICE_SCALE).ok_or_else(|| SkipReason::InvalidSqrtPrice("zero".to_string()))
}

/// Reciprocal of [`price_token0_in_token1`], computed from the exact ratio.
pub fn price_token1_in_token0(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Result<BigDecimal, SkipReason> {
    let sqrt = check_sqrt_price(sqrt_price_x96)?;
    let numerator = q192() * pow10(decimals1 as u32);
    let denominator = &sqrt * &sqrt * pow10(decimals0 as u32);
    ratio(&numerator, &denominator, PRICE_SCALE).ok_or_else(|| SkipReason::InvalidSqrtPrice("zero".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Address, B256, I256};
    use std::str::FromStr;

    const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const TOKEN: Address = address!("1111111111111111111111111111111111111111");

    fn pool(version: PoolVersion, token_side: TokenSide, token0_decimals: u8, token1_decimals: u8) -> PoolDescriptor {
        let (token0, token1) = match token_side {
            TokenSide::Token0 => (TOKEN, WETH),
            TokenSide::Token1 => (WETH, TOKEN),
        };
        PoolDescriptor {
            pool_address: Address::ZERO,
            version,
            token0,
            token1,
            token0_decimals,
            token1_decimals,
            token_side,
        }
    }

    fn v2(a0_in: u128, a1_in: u128, a0_out: u128, a1_out: u128) -> RawSwapEvent {
        RawSwapEvent::V2(V2Swap {
            sender: Address::ZERO,
            amount0_in: U256::from(a0_in),
            amount1_in: U256::from(a1_in),
            amount0_out: U256::from(a0_out),
            amount1_out: U256::from(a1_out),
            to: Address::ZERO,
            block_number: 1,
            tx_hash: B256::ZERO,
            timestamp: 0,
            log_index: Some(0),
        })
    }

    fn v3(amount0: &str, amount1: &str, sqrt_price_x96: U256) -> RawSwapEvent {
        RawSwapEvent::V3(V3Swap {
            sender: Address::ZERO,
            recipient: Address::ZERO,
            amount0: I256::from_dec_str(amount0).unwrap(),
            amount1: I256::from_dec_str(amount1).unwrap(),
            sqrt_price_x96,
            liquidity: 1,
            tick: 0,
            block_number: 1,
            tx_hash: B256::ZERO,
            timestamp: 0,
            log_index: Some(0),
        })
    }

    #[test]
    fn test_v2_buy_price() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V2, TokenSide::Token0, 0, 18);
        let price = engine.derive_price_eth(&pool, &v2(0, 500_000_000_000_000_000, 1000, 0)).unwrap();
        assert_eq!(price, BigDecimal::from_str("0.0005").unwrap());
    }

    #[test]
    fn test_v2_sell_price_with_weth_as_token0() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V2, TokenSide::Token1, 18, 6);
        // 2_000 tokens (6 dec) in, 1 ETH out
        let event = v2(0, 2_000_000_000, 1_000_000_000_000_000_000, 0);
        let price = engine.derive_price_eth(&pool, &event).unwrap();
        assert_eq!(price, BigDecimal::from_str("0.0005").unwrap());

        let flow = engine.swap_flow(&pool, &event).unwrap();
        assert_eq!(flow.direction, TradeDirection::Sell);
        assert_eq!(flow.eth_amount, BigDecimal::from(1));
        assert_eq!(flow.token_amount, BigDecimal::from(2000));
    }

    #[test]
    fn test_v2_zero_token_side_is_skipped() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V2, TokenSide::Token0, 18, 18);
        let err = engine.derive_price_eth(&pool, &v2(0, 1_000, 0, 0)).unwrap_err();
        assert_eq!(err, SkipReason::ZeroAmount);
        assert_eq!(engine.swap_flow(&pool, &v2(0, 0, 0, 0)).unwrap_err(), SkipReason::ZeroAmount);
    }

    #[test]
    fn test_version_mismatch_is_skipped() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V3, TokenSide::Token0, 18, 18);
        let err = engine.derive_price_eth(&pool, &v2(1, 0, 0, 1)).unwrap_err();
        assert!(matches!(err, SkipReason::VersionMismatch(_)));
    }

    #[test]
    fn test_v3_price_at_parity() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let q96 = U256::from(1u8) << 96;
        let pool = pool(PoolVersion::V3, TokenSide::Token0, 18, 18);
        let price = engine.derive_price_eth(&pool, &v3("-10", "10", q96)).unwrap();
        assert_eq!(price, BigDecimal::from(1));
    }

    #[test]
    fn test_v3_decimal_adjustment() {
        // raw price token1/token0 = 4; token0 has 6 decimals, WETH (token1) 18
        let sqrt = U256::from(2u8) << 96;
        let token0_priced = price_token0_in_token1(sqrt, 6, 18).unwrap();
        assert_eq!(token0_priced, BigDecimal::from_str("0.000000000004").unwrap());

        let token1_priced = price_token1_in_token0(sqrt, 6, 18).unwrap();
        assert_eq!(token1_priced, BigDecimal::from(250_000_000_000u64));
    }

    #[test]
    fn test_v3_token1_uses_reciprocal() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let sqrt = U256::from(2u8) << 96;
        let pool = pool(PoolVersion::V3, TokenSide::Token1, 18, 18);
        let price = engine.derive_price_eth(&pool, &v3("1", "-4", sqrt)).unwrap();
        assert_eq!(price, BigDecimal::from_str("0.25").unwrap());
    }

    #[test]
    fn test_v3_invalid_sqrt_price() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V3, TokenSide::Token0, 18, 18);
        let zero = engine.derive_price_eth(&pool, &v3("1", "-1", U256::ZERO)).unwrap_err();
        assert!(matches!(zero, SkipReason::InvalidSqrtPrice(_)));

        let too_large = engine
            .derive_price_eth(&pool, &v3("1", "-1", MAX_SQRT_RATIO + U256::from(1u8)))
            .unwrap_err();
        assert!(matches!(too_large, SkipReason::InvalidSqrtPrice(_)));
    }

    #[test]
    fn test_v3_flow_direction() {
        let engine = PriceDerivationEngine::new(&AnalysisConfig::default());
        let pool = pool(PoolVersion::V3, TokenSide::Token0, 9, 18);
        let q96 = U256::from(1u8) << 96;

        let buy = engine
            .swap_flow(&pool, &v3("-5000000000", "300000000000000000", q96))
            .unwrap();
        assert_eq!(buy.direction, TradeDirection::Buy);
        assert_eq!(buy.eth_amount, BigDecimal::from_str("0.3").unwrap());
        assert_eq!(buy.token_amount, BigDecimal::from(5));

        let sell = engine
            .swap_flow(&pool, &v3("5000000000", "-300000000000000000", q96))
            .unwrap();
        assert_eq!(sell.direction, TradeDirection::Sell);
    }

    #[test]
    fn test_implausible_price_is_skipped() {
        let config = AnalysisConfig {
            max_plausible_price_eth: BigDecimal::from(1),
            ..AnalysisConfig::default()
        };
        let engine = PriceDerivationEngine::new(&config);
        let pool = pool(PoolVersion::V2, TokenSide::Token0, 0, 18);
        // 2 ETH for 1 token
        let err = engine
            .derive_price_eth(&pool, &v2(0, 2_000_000_000_000_000_000, 1, 0))
            .unwrap_err();
        assert!(matches!(err, SkipReason::ImplausiblePrice(_)));
    }

    #[test]
    fn test_max_sqrt_ratio_constant() {
        assert_eq!(
            MAX_SQRT_RATIO,
            U256::from_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
    }
}
