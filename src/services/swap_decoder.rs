use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::SolEvent;
use tracing::{debug, info};

use crate::error::{SkipReason, SkippedEvents};
use crate::models::{PoolDescriptor, PoolVersion, RawLog, RawSwapEvent, V2Swap, V3Swap};

sol! {
    interface IUniswapV2Pair {
        event Swap(
            address indexed sender,
            uint256 amount0In,
            uint256 amount1In,
            uint256 amount0Out,
            uint256 amount1Out,
            address indexed to
        );
    }

    interface IUniswapV3Pool {
        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick
        );
    }
}

/// Decode one raw log as the `Swap` event of the given pool version.
pub fn decode_swap_log(version: PoolVersion, log: &RawLog) -> Result<RawSwapEvent, SkipReason> {
    let topic0 = log
        .topics
        .first()
        .ok_or_else(|| SkipReason::Undecodable("log has no topics".to_string()))?;

    match version {
        PoolVersion::V2 => {
            if *topic0 != IUniswapV2Pair::Swap::SIGNATURE_HASH {
                return Err(SkipReason::Undecodable(format!("topic0 {} is not a V2 Swap", topic0)));
            }
            let swap = IUniswapV2Pair::Swap::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .map_err(|e| SkipReason::Undecodable(e.to_string()))?;

            Ok(RawSwapEvent::V2(V2Swap {
                sender: swap.sender,
                amount0_in: swap.amount0In,
                amount1_in: swap.amount1In,
                amount0_out: swap.amount0Out,
                amount1_out: swap.amount1Out,
                to: swap.to,
                block_number: log.block_number,
                tx_hash: log.tx_hash,
                timestamp: log.timestamp,
                log_index: log.log_index,
            }))
        }
        PoolVersion::V3 => {
            if *topic0 != IUniswapV3Pool::Swap::SIGNATURE_HASH {
                return Err(SkipReason::Undecodable(format!("topic0 {} is not a V3 Swap", topic0)));
            }
            let swap = IUniswapV3Pool::Swap::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .map_err(|e| SkipReason::Undecodable(e.to_string()))?;
            let tick = i32::try_from(swap.tick).map_err(|e| SkipReason::Undecodable(e.to_string()))?;

            Ok(RawSwapEvent::V3(V3Swap {
                sender: swap.sender,
                recipient: swap.recipient,
                amount0: swap.amount0,
                amount1: swap.amount1,
                sqrt_price_x96: U256::from(swap.sqrtPriceX96),
                liquidity: swap.liquidity,
                tick,
                block_number: log.block_number,
                tx_hash: log.tx_hash,
                timestamp: log.timestamp,
                log_index: log.log_index,
            }))
        }
    }
}

/// Decode every log emitted by the pool, tallying the ones that fail.
pub fn decode_swap_logs(pool: &PoolDescriptor, logs: &[RawLog]) -> (Vec<RawSwapEvent>, SkippedEvents) {
    let mut events = Vec::with_capacity(logs.len());
    let mut skipped = SkippedEvents::default();

    for log in logs {
        let decoded = if log.address == pool.pool_address {
            decode_swap_log(pool.version, log)
        } else {
            Err(SkipReason::Undecodable(format!("log emitted by {}", log.address)))
        };

        match decoded {
            Ok(event) => events.push(event),
            Err(reason) => {
                debug!(tx_hash = %log.tx_hash, reason = %reason, "Skipping swap log");
                skipped.record(&reason);
            }
        }
    }

    info!(
        pool_address = %pool.pool_address,
        version = %pool.version,
        decoded = events.len(),
        skipped = skipped.total(),
        "🔎 Decoded swap logs"
    );
    (events, skipped)
}
