use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolVersion {
    V2,
    V3,
}

impl fmt::Display for PoolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolVersion::V2 => write!(f, "v2"),
            PoolVersion::V3 => write!(f, "v3"),
        }
    }
}

impl FromStr for PoolVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2" => Ok(PoolVersion::V2),
            "v3" => Ok(PoolVersion::V3),
            other => Err(AppError::ValidationError(format!(
                "Unsupported Uniswap version: {}. Supported versions: 'v2', 'v3'",
                other
            ))),
        }
    }
}

/// Which side of the pair holds the analyzed token. The other side is WETH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSide {
    Token0,
    Token1,
}

/// Pool metadata as reported by the data source, before role resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMetadata {
    pub pool_address: Address,
    pub token0: Address,
    pub token1: Address,
    pub token0_decimals: Option<u8>,
    pub token1_decimals: Option<u8>,
    /// V3-only: fee tier in hundredths of a bip
    #[serde(default)]
    pub fee: Option<u32>,
    /// V3-only
    #[serde(default)]
    pub tick_spacing: Option<i32>,
}

impl PoolMetadata {
    /// V3 pools expose `fee` and `tickSpacing`; V2 pairs do not.
    pub fn inferred_version(&self) -> PoolVersion {
        if self.fee.is_some() || self.tick_spacing.is_some() {
            PoolVersion::V3
        } else {
            PoolVersion::V2
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub pool_address: Address,
    pub version: PoolVersion,
    pub token0: Address,
    pub token1: Address,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
    pub token_side: TokenSide,
}

impl PoolDescriptor {
    pub fn token_address(&self) -> Address {
        match self.token_side {
            TokenSide::Token0 => self.token0,
            TokenSide::Token1 => self.token1,
        }
    }

    pub fn weth_address(&self) -> Address {
        match self.token_side {
            TokenSide::Token0 => self.token1,
            TokenSide::Token1 => self.token0,
        }
    }

    pub fn token_decimals(&self) -> u8 {
        match self.token_side {
            TokenSide::Token0 => self.token0_decimals,
            TokenSide::Token1 => self.token1_decimals,
        }
    }

    pub fn weth_decimals(&self) -> u8 {
        match self.token_side {
            TokenSide::Token0 => self.token1_decimals,
            TokenSide::Token1 => self.token0_decimals,
        }
    }
}

/// Resolve version and pair roles from metadata alone.
///
/// The version hint wins when given; otherwise it is inferred from V3-only
/// metadata with V2 as the fallback. Fails when decimals are missing or when
/// exactly one side of the pair is not WETH.
pub fn resolve_pool_descriptor(
    version_hint: Option<PoolVersion>,
    metadata: &PoolMetadata,
    weth_address: Address,
) -> Result<PoolDescriptor, AppError> {
    let version = version_hint.unwrap_or_else(|| metadata.inferred_version());

    let token0_decimals = metadata.token0_decimals.ok_or_else(|| {
        AppError::InvalidPoolDescriptor(format!(
            "missing decimals for token0 {} in pool {}",
            metadata.token0, metadata.pool_address
        ))
    })?;
    let token1_decimals = metadata.token1_decimals.ok_or_else(|| {
        AppError::InvalidPoolDescriptor(format!(
            "missing decimals for token1 {} in pool {}",
            metadata.token1, metadata.pool_address
        ))
    })?;

    let token_side = match (metadata.token0 == weth_address, metadata.token1 == weth_address) {
        (false, true) => TokenSide::Token0,
        (true, false) => TokenSide::Token1,
        (true, true) => {
            return Err(AppError::InvalidPoolDescriptor(format!(
                "both sides of pool {} are WETH",
                metadata.pool_address
            )))
        }
        (false, false) => {
            warn!(
                pool_address = %metadata.pool_address,
                token0 = %metadata.token0,
                token1 = %metadata.token1,
                "WETH not found in pool"
            );
            return Err(AppError::InvalidPoolDescriptor(format!(
                "WETH {} is not a side of pool {}",
                weth_address, metadata.pool_address
            )));
        }
    };

    debug!(
        pool_address = %metadata.pool_address,
        version = %version,
        token_side = ?token_side,
        "Resolved pool descriptor"
    );

    Ok(PoolDescriptor {
        pool_address: metadata.pool_address,
        version,
        token0: metadata.token0,
        token1: metadata.token1,
        token0_decimals,
        token1_decimals,
        token_side,
    })
}

/// Same as [`resolve_pool_descriptor`] but also checks the analyzed token.
pub fn resolve_for_token(
    version_hint: Option<PoolVersion>,
    metadata: &PoolMetadata,
    weth_address: Address,
    token_address: Address,
) -> Result<PoolDescriptor, AppError> {
    let descriptor = resolve_pool_descriptor(version_hint, metadata, weth_address)?;
    if descriptor.token_address() != token_address {
        return Err(AppError::InvalidPoolDescriptor(format!(
            "token {} not found in pool {}. Token0: {}, Token1: {}",
            token_address, metadata.pool_address, metadata.token0, metadata.token1
        )));
    }
    Ok(descriptor)
}
