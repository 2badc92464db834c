// src/blockchain/services/blocks.rs

use ethers_core::types::{Block as EthersBlock, U256};
use tracing::warn;

use crate::blockchain::constants::ETHEREUM;
use crate::blockchain::models::{Block, NormalizeError};
use crate::blockchain::payloads::{BlockPayload, SubscriptionBlock};
use crate::utils::{decode_u256, decode_u64, parse_h256, present, u256_to_u64};

/// Difficulty recorded for polled blocks.
///
/// The polling provider overflows on difficulty values beyond native integer
/// precision before they reach this layer, so the field is not carried across
/// this path at all.
pub const POLLED_BLOCK_DIFFICULTY: U256 = U256::zero();

/// Normalizes a block fetched from the polling provider.
pub fn from_polled_block<TX>(raw: &EthersBlock<TX>) -> Result<Block, NormalizeError> {
    let hash = raw.hash.ok_or_else(|| {
        warn!("Rejecting polled block without a hash (pending block?)");
        NormalizeError::missing("hash")
    })?;
    let block_height = raw
        .number
        .ok_or_else(|| NormalizeError::missing("number"))?
        .as_u64();

    Ok(Block {
        hash,
        parent_hash: raw.parent_hash,
        block_height,
        difficulty: POLLED_BLOCK_DIFFICULTY,
        timestamp: u256_to_u64("timestamp", raw.timestamp)?,
        base_fee_per_gas: raw.base_fee_per_gas,
        network: ETHEREUM.clone(),
    })
}

/// Normalizes a block header pushed by the subscription provider.
pub fn from_subscription_block(raw: &SubscriptionBlock) -> Result<Block, NormalizeError> {
    let hash = required(&raw.hash, "hash")?;
    let parent_hash = required(&raw.parent_hash, "parentHash")?;

    let block = Block {
        hash: parse_h256("hash", hash)?,
        parent_hash: parse_h256("parentHash", parent_hash)?,
        block_height: decode_u64("number", required(&raw.number, "number")?)?,
        difficulty: decode_u256("difficulty", required(&raw.difficulty, "difficulty")?)?,
        timestamp: decode_u64("timestamp", required(&raw.timestamp, "timestamp")?)?,
        base_fee_per_gas: present(&raw.base_fee_per_gas)
            .map(|fee| decode_u256("baseFeePerGas", fee))
            .transpose()?,
        network: ETHEREUM.clone(),
    };

    Ok(block)
}

/// Dispatches a tagged block payload to the normalizer for its transport.
pub fn normalize_block(payload: &BlockPayload) -> Result<Block, NormalizeError> {
    match payload {
        BlockPayload::Polled(raw) => from_polled_block(raw.as_ref()),
        BlockPayload::Subscription(raw) => from_subscription_block(raw),
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, NormalizeError> {
    present(field).ok_or_else(|| {
        warn!("Rejecting subscription block without '{}'", name);
        NormalizeError::missing(name)
    })
}
