use alloy::primitives::{I256, U256};
use num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

/// Decimals of native ETH and WETH.
pub const ETH_DECIMALS: u8 = 18;

pub fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

pub fn i256_to_bigint(value: I256) -> BigInt {
    let (sign, abs) = value.into_sign_and_abs();
    let magnitude = u256_to_bigint(abs);
    if sign.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Raw integer amount to a human-scale quantity. Exact: no rounding happens.
pub fn normalize_amount(raw: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_bigint(raw), decimals as i64)
}

/// Signed variant used for V3 pool deltas.
pub fn normalize_signed_amount(raw: I256, decimals: u8) -> BigDecimal {
    BigDecimal::new(i256_to_bigint(raw), decimals as i64)
}

/// Wei to ETH.
pub fn wei_to_eth(wei: U256) -> BigDecimal {
    normalize_amount(wei, ETH_DECIMALS)
}
