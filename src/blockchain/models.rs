// src/blockchain/models.rs
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ethers_core::types::{transaction::eip2930::AccessList, Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// --- Error types for normalization ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unsupported transaction type: {0}")]
    UnsupportedTransactionType(u64),
    #[error("numeric overflow decoding '{field}': {value}")]
    NumericOverflow { field: &'static str, value: String },
    #[error("failed to decode asset transfer value: {0}")]
    AssetValueDecodeFailure(String),
}

impl NormalizeError {
    /// Short machine-readable name, used as error `data` on the ingest surface.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::MalformedInput(_) => "MalformedInput",
            NormalizeError::UnsupportedTransactionType(_) => "UnsupportedTransactionType",
            NormalizeError::NumericOverflow { .. } => "NumericOverflow",
            NormalizeError::AssetValueDecodeFailure(_) => "AssetValueDecodeFailure",
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        NormalizeError::MalformedInput(format!("missing required field '{}'", field))
    }
}

// --- Registry Models ---

/// Fungible asset descriptor as supplied by the asset registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Contract address for smart-contract tokens, `None` for a chain's base asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
}

/// Canonical network descriptor as supplied by the network registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Decimal chain ID, e.g. "1"
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub name: String,
    pub native_asset: Arc<Asset>,
}

impl Network {
    /// Whether `asset` is this network's base currency.
    pub fn is_native_asset(&self, asset: &Asset) -> bool {
        asset.symbol == self.native_asset.symbol
    }

    /// The chain ID parsed from its decimal string form.
    pub fn numeric_chain_id(&self) -> Result<u64, NormalizeError> {
        self.chain_id.trim().parse::<u64>().map_err(|_| {
            NormalizeError::MalformedInput(format!(
                "chain ID '{}' of network '{}' is not a decimal integer",
                self.chain_id, self.name
            ))
        })
    }
}

// --- Block Models ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub hash: H256,
    pub parent_hash: H256,
    pub block_height: u64,
    pub difficulty: U256,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub base_fee_per_gas: Option<U256>,
    pub network: Arc<Network>,
}

impl Block {
    /// Block timestamp as a UTC date, `None` if it is outside chrono's range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

// --- Transaction Models ---

/// EIP-2718 envelope types understood by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u64")]
#[repr(u8)]
pub enum TransactionType {
    Legacy = 0,
    AccessList = 1,
    DynamicFee = 2,
}

impl TransactionType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u64> for TransactionType {
    type Error = NormalizeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransactionType::Legacy),
            1 => Ok(TransactionType::AccessList),
            2 => Ok(TransactionType::DynamicFee),
            other => Err(NormalizeError::UnsupportedTransactionType(other)),
        }
    }
}

impl From<TransactionType> for u8 {
    fn from(value: TransactionType) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Canonical transaction, independent of the transport that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: H256,
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub nonce: u64,
    pub gas_limit: U256,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    /// Amount of `asset` transferred, in its smallest unit
    pub value: U256,
    /// Native-currency amount the sender signed over. Same as `value` when
    /// `asset` is the native asset, usually zero for a token transfer.
    pub native_value: U256,
    pub input: Bytes,
    /// EIP-2930 access list, empty for legacy transactions
    #[serde(skip_serializing_if = "access_list_is_empty")]
    pub access_list: AccessList,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub block_hash: Option<H256>,
    pub block_height: Option<u64>,
    pub asset: Arc<Asset>,
    pub network: Arc<Network>,
}

fn access_list_is_empty(list: &AccessList) -> bool {
    list.0.is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub r: U256,
    pub s: U256,
    pub v: u64,
}

/// Result of normalizing a transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum AnyTransaction {
    Unsigned(Transaction),
    Signed(SignedTransaction),
}

impl AnyTransaction {
    /// The transaction fields shared by both variants.
    pub fn transaction(&self) -> &Transaction {
        match self {
            AnyTransaction::Unsigned(tx) => tx,
            AnyTransaction::Signed(signed) => &signed.transaction,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, AnyTransaction::Signed(_))
    }

    pub fn into_signed(self) -> Option<SignedTransaction> {
        match self {
            AnyTransaction::Signed(signed) => Some(signed),
            AnyTransaction::Unsigned(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::constants::ETHEREUM;

    #[test]
    fn test_transaction_type_accepts_known_values() {
        assert_eq!(TransactionType::try_from(0).unwrap(), TransactionType::Legacy);
        assert_eq!(TransactionType::try_from(1).unwrap(), TransactionType::AccessList);
        assert_eq!(TransactionType::try_from(2).unwrap(), TransactionType::DynamicFee);
    }

    #[test]
    fn test_transaction_type_rejects_unknown_values() {
        assert_eq!(
            TransactionType::try_from(3),
            Err(NormalizeError::UnsupportedTransactionType(3))
        );
        assert!(TransactionType::try_from(0x7e).is_err());
    }

    #[test]
    fn test_numeric_chain_id() {
        assert_eq!(ETHEREUM.numeric_chain_id().unwrap(), 1);

        let mut broken = (**ETHEREUM).clone();
        broken.chain_id = "0x1".to_string();
        assert!(matches!(
            broken.numeric_chain_id(),
            Err(NormalizeError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_block_timestamp_utc() {
        let block = Block {
            hash: H256::repeat_byte(1),
            parent_hash: H256::zero(),
            block_height: 1,
            difficulty: U256::zero(),
            timestamp: 1_438_269_988,
            base_fee_per_gas: None,
            network: ETHEREUM.clone(),
        };
        let date = block.timestamp_utc().unwrap();
        assert_eq!(date.to_rfc3339(), "2015-07-30T15:26:28+00:00");
    }

    #[test]
    fn test_network_serializes_registry_shape() {
        let value = serde_json::to_value(&**ETHEREUM).unwrap();
        assert_eq!(value["chainID"], "1");
        assert_eq!(value["name"], "Ethereum");
        assert_eq!(value["nativeAsset"]["symbol"], "ETH");
    }
}
