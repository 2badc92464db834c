// src/blockchain/payloads.rs
//! Raw payload shapes, one per transport.
//!
//! The polling provider hands out ethers-rs types whose quantities are already
//! `U256`/`U64`. The subscription provider pushes JSON objects with every
//! quantity as a hex string; those are modelled here as structs of optional
//! strings so that "absent" and "present" stay distinguishable.

use ethers_core::types::{
    transaction::eip2930::AccessList, Block as EthersBlock, Transaction as EthersTransaction, H256,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::models::NormalizeError;
use crate::utils::decode_u64;

/// Transaction object as returned by the polling provider. It's also the shape
/// handed back to the provider library for broadcast.
pub type ProviderTransaction = EthersTransaction;

/// Block object as returned by the polling provider (transaction hashes only).
pub type PolledBlock = EthersBlock<H256>;

/// A numeric field the subscription provider may send as a JSON number or as
/// a (hex or decimal) string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    /// Only a blank string counts as absent. Zero is a real value here
    /// (`v = 0` is a valid y-parity).
    pub fn is_present(&self) -> bool {
        match self {
            Quantity::Number(_) => true,
            Quantity::Text(s) => !s.trim().is_empty(),
        }
    }

    pub fn to_u64(&self, field: &'static str) -> Result<u64, NormalizeError> {
        match self {
            Quantity::Number(n) => Ok(*n),
            Quantity::Text(s) => {
                let s = s.trim();
                if s.starts_with("0x") || s.starts_with("0X") {
                    decode_u64(field, s)
                } else {
                    s.parse::<u64>().map_err(|_| {
                        NormalizeError::MalformedInput(format!(
                            "'{}' is neither a hex nor a decimal quantity: {:?}",
                            field, s
                        ))
                    })
                }
            }
        }
    }
}

/// Block header as pushed by a `newHeads` subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBlock {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub parent_hash: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub base_fee_per_gas: Option<String>,
}

/// Transaction object as pushed by a pending/full transaction subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTransaction {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub gas: Option<String>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub max_fee_per_gas: Option<String>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<Quantity>,
    #[serde(default)]
    pub access_list: Option<AccessList>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub r: Option<String>,
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub v: Option<Quantity>,
}

/// A block payload tagged with the transport it arrived on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "payload", rename_all = "snake_case")]
pub enum BlockPayload {
    Polled(Box<PolledBlock>),
    Subscription(SubscriptionBlock),
}

/// A transaction payload tagged with the transport it arrived on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "payload", rename_all = "snake_case")]
pub enum TransactionPayload {
    Polled(Box<ProviderTransaction>),
    Subscription(SubscriptionTransaction),
}
