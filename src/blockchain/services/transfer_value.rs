// src/blockchain/services/transfer_value.rs

use ethers_core::types::U256;
use tracing::debug;

use crate::blockchain::models::NormalizeError;

/// Size of one ABI word in bytes
const WORD_SIZE: usize = 32;

/// Recovers the amount moved by a token transfer from its call data.
pub trait TransferValueDecoder: Send + Sync {
    fn transfer_value(&self, input: &[u8]) -> Result<U256, NormalizeError>;
}

/// Best-effort heuristic: the amount is the last 32-byte word of the call data.
///
/// That holds for `transfer(address,uint256)` and anything else that ends with
/// the amount word. The selector is not checked, so a call with any other
/// layout yields whatever its last word happens to be.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrailingWordHeuristic;

impl TransferValueDecoder for TrailingWordHeuristic {
    fn transfer_value(&self, input: &[u8]) -> Result<U256, NormalizeError> {
        trailing_word_value(input)
    }
}

/// Reads the trailing word of `input` as a big-endian unsigned integer.
pub fn trailing_word_value(input: &[u8]) -> Result<U256, NormalizeError> {
    if input.len() < WORD_SIZE {
        return Err(NormalizeError::AssetValueDecodeFailure(format!(
            "call data is {} bytes, need at least {}",
            input.len(),
            WORD_SIZE
        )));
    }

    let word = &input[input.len() - WORD_SIZE..];
    let value = U256::from_big_endian(word);
    debug!("Recovered transfer value {} from trailing call-data word", value);
    Ok(value)
}
