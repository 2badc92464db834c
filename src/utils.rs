//! Utility functions for decoding provider quantities

use std::str::FromStr;

use ethers_core::types::{Address, Bytes, H256, U256};
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::blockchain::models::NormalizeError;
use crate::ingest::protocol::{error_codes, Response};

/// Hex digits in a 256-bit word
const U256_HEX_DIGITS: usize = 64;

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|e| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}' ({})", key, e),
        )
    })
}

/// Helper function to extract an optional argument, treating `null` as absent
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_required_arg(args, key, req_id).map(Some),
    }
}

/// A payload string counts as present when it is non-empty after trimming.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn strip_hex_prefix(raw: &str) -> &str {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
}

/// Decodes a `0x`-prefixed hex quantity into a 256-bit unsigned integer.
///
/// Anything wider than 256 bits is a `NumericOverflow`; an empty or non-hex
/// string is `MalformedInput`.
pub fn decode_u256(field: &'static str, raw: &str) -> Result<U256, NormalizeError> {
    let digits = strip_hex_prefix(raw.trim());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NormalizeError::MalformedInput(format!(
            "'{}' is not a hex quantity: {:?}",
            field, raw
        )));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    if significant.len() > U256_HEX_DIGITS {
        return Err(NormalizeError::NumericOverflow {
            field,
            value: raw.to_string(),
        });
    }

    U256::from_str_radix(significant, 16)
        .map_err(|e| NormalizeError::MalformedInput(format!("'{}': {}", field, e)))
}

/// Decodes a hex quantity that must fit a native `u64`.
pub fn decode_u64(field: &'static str, raw: &str) -> Result<u64, NormalizeError> {
    let value = decode_u256(field, raw)?;
    u256_to_u64(field, value)
}

/// Narrows a provider big number to `u64`, failing instead of truncating.
pub fn u256_to_u64(field: &'static str, value: U256) -> Result<u64, NormalizeError> {
    if value > U256::from(u64::MAX) {
        return Err(NormalizeError::NumericOverflow {
            field,
            value: value.to_string(),
        });
    }
    Ok(value.as_u64())
}

/// Decodes hex call data. `"0x"` is the empty byte string.
pub fn decode_bytes(field: &'static str, raw: &str) -> Result<Bytes, NormalizeError> {
    let digits = strip_hex_prefix(raw.trim());
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| NormalizeError::MalformedInput(format!("'{}': {}", field, e)))
}

pub fn parse_h256(field: &'static str, raw: &str) -> Result<H256, NormalizeError> {
    H256::from_str(raw.trim())
        .map_err(|e| NormalizeError::MalformedInput(format!("'{}' is not a 32-byte hash: {}", field, e)))
}

pub fn parse_address(field: &'static str, raw: &str) -> Result<Address, NormalizeError> {
    Address::from_str(raw.trim())
        .map_err(|e| NormalizeError::MalformedInput(format!("'{}' is not an address: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_u256() {
        assert_eq!(decode_u256("gas", "0x2540be400").unwrap(), U256::from(10_000_000_000u64));
        assert_eq!(decode_u256("gas", "0x0").unwrap(), U256::zero());
        assert_eq!(decode_u256("gas", "0x00000000000000ff").unwrap(), U256::from(255));
        assert_eq!(
            decode_u256("gas", &format!("0x{}", "f".repeat(64))).unwrap(),
            U256::MAX
        );
    }

    #[test]
    fn test_decode_u256_rejects_garbage() {
        for raw in ["", "0x", "0xzz", "twelve"] {
            assert!(
                matches!(decode_u256("value", raw), Err(NormalizeError::MalformedInput(_))),
                "{:?} should be malformed",
                raw
            );
        }
    }

    #[test]
    fn test_decode_u256_overflow() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(matches!(
            decode_u256("difficulty", &too_wide),
            Err(NormalizeError::NumericOverflow { field: "difficulty", .. })
        ));
    }

    #[test]
    fn test_decode_u64_boundary() {
        assert_eq!(decode_u64("number", "0xffffffffffffffff").unwrap(), u64::MAX);
        let err = decode_u64("number", "0x10000000000000000").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::NumericOverflow {
                field: "number",
                value: "18446744073709551616".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_bytes() {
        assert!(decode_bytes("input", "0x").unwrap().is_empty());
        assert_eq!(decode_bytes("input", "0xa9059cbb").unwrap().to_vec(), vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert!(decode_bytes("input", "0xabc").is_err());
    }

    #[test]
    fn test_present_treats_blank_strings_as_absent() {
        assert_eq!(present(&Some(" 0x1 ".to_string())), Some("0x1"));
        assert_eq!(present(&Some("  ".to_string())), None);
        assert_eq!(present(&None), None);
    }

    #[test]
    fn test_parse_hash_and_address() {
        let hash = parse_h256("hash", &format!("0x{}", "11".repeat(32))).unwrap();
        assert_eq!(hash, H256::repeat_byte(0x11));

        let address = parse_address("from", "0x742d35Cc6634C0532925a3b844Bc454e4438f44e").unwrap();
        assert_eq!(format!("{:?}", address), "0x742d35cc6634c0532925a3b844bc454e4438f44e");

        assert!(parse_address("to", "0x123").is_err());
    }
}
