#![allow(dead_code)]

use alloy::primitives::{address, Address, B256, I256, U256};
use bigdecimal::BigDecimal;
use uniswap_price_analyzer::config::WETH_MAINNET;
use uniswap_price_analyzer::models::{
    DirectTransaction, EthPriceSample, EthPriceSeries, PoolDescriptor, PoolVersion, RawSwapEvent, TokenSide,
    V2Swap, V3Swap,
};

pub const TOKEN: Address = address!("6982508145454Ce325dDbE47a25d4ec3d2311933");
pub const POOL: Address = address!("A43fe16908251ee70EF74718545e4FE6C5cCEc9f");
pub const BUYER: Address = address!("3333333333333333333333333333333333333333");

pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// 10^15, so amounts can be written in thousandths of a unit.
pub fn milli(amount: u64) -> U256 {
    U256::from(amount) * U256::from(1_000_000_000_000_000u64)
}

pub fn v2_pool(token_decimals: u8) -> PoolDescriptor {
    PoolDescriptor {
        pool_address: POOL,
        version: PoolVersion::V2,
        token0: TOKEN,
        token1: WETH_MAINNET,
        token0_decimals: token_decimals,
        token1_decimals: 18,
        token_side: TokenSide::Token0,
    }
}

pub fn v3_pool(token_side: TokenSide) -> PoolDescriptor {
    let (token0, token1) = match token_side {
        TokenSide::Token0 => (TOKEN, WETH_MAINNET),
        TokenSide::Token1 => (WETH_MAINNET, TOKEN),
    };
    PoolDescriptor {
        pool_address: POOL,
        version: PoolVersion::V3,
        token0,
        token1,
        token0_decimals: 18,
        token1_decimals: 18,
        token_side,
    }
}

/// V2 buy on a token0/WETH pair: WETH in, token out.
pub fn v2_buy(block: u64, log_index: u64, weth_in: U256, token_out: U256) -> RawSwapEvent {
    RawSwapEvent::V2(V2Swap {
        sender: Address::ZERO,
        amount0_in: U256::ZERO,
        amount1_in: weth_in,
        amount0_out: token_out,
        amount1_out: U256::ZERO,
        to: BUYER,
        block_number: block,
        tx_hash: B256::left_padding_from(&block.to_be_bytes()),
        timestamp: GENESIS_TIMESTAMP + block * 12,
        log_index: Some(log_index),
    })
}

pub fn v3_swap(block: u64, amount0: &str, amount1: &str, sqrt_price_x96: U256) -> RawSwapEvent {
    RawSwapEvent::V3(V3Swap {
        sender: Address::ZERO,
        recipient: BUYER,
        amount0: I256::from_dec_str(amount0).unwrap(),
        amount1: I256::from_dec_str(amount1).unwrap(),
        sqrt_price_x96,
        liquidity: 1_000_000,
        tick: 0,
        block_number: block,
        tx_hash: B256::left_padding_from(&block.to_be_bytes()),
        timestamp: GENESIS_TIMESTAMP + block * 12,
        log_index: Some(0),
    })
}

pub fn transfer(hash_byte: u8, block: u64, value: U256) -> DirectTransaction {
    DirectTransaction {
        tx_hash: B256::repeat_byte(hash_byte),
        block_number: block,
        timestamp: GENESIS_TIMESTAMP + block * 12,
        from: BUYER,
        to: Some(POOL),
        value,
        is_error: false,
    }
}

pub fn flat_eth_price(price_usd: u64) -> EthPriceSeries {
    EthPriceSeries::new(vec![EthPriceSample {
        timestamp: GENESIS_TIMESTAMP,
        price_usd: BigDecimal::from(price_usd),
    }])
}
