// src/blockchain/services/transactions.rs

use std::sync::Arc;

use ethers_core::types::{transaction::eip2930::AccessList, Bytes, U256, U64};
use tracing::{debug, warn};

use crate::blockchain::constants::DEFAULT_TRANSACTION_TYPE;
use crate::blockchain::models::{
    AnyTransaction, Asset, Network, NormalizeError, SignedTransaction, Transaction,
    TransactionType,
};
use crate::blockchain::payloads::{
    ProviderTransaction, SubscriptionTransaction, TransactionPayload,
};
use crate::blockchain::services::transfer_value::{TrailingWordHeuristic, TransferValueDecoder};
use crate::utils::{
    decode_bytes, decode_u256, decode_u64, parse_address, parse_h256, present, u256_to_u64,
};

/// Fee fields as they arrive, before the per-type invariants are applied.
struct FeeFields {
    gas_price: Option<U256>,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
}

/// Normalizes provider transaction payloads, using `D` to recover the value of
/// non-native asset transfers.
#[derive(Debug, Default, Clone)]
pub struct TransactionNormalizer<D = TrailingWordHeuristic> {
    decoder: D,
}

impl TransactionNormalizer<TrailingWordHeuristic> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: TransferValueDecoder> TransactionNormalizer<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self { decoder }
    }

    /// Normalizes a transaction fetched from the polling provider.
    pub fn from_polled_tx(
        &self,
        raw: &ProviderTransaction,
        asset: &Arc<Asset>,
        network: &Arc<Network>,
    ) -> Result<AnyTransaction, NormalizeError> {
        if raw.hash.is_zero() {
            warn!("Rejecting polled transaction without a hash");
            return Err(NormalizeError::missing("hash"));
        }

        let transaction_type = match raw.transaction_type {
            Some(t) => TransactionType::try_from(t.as_u64())?,
            None => DEFAULT_TRANSACTION_TYPE,
        };

        let value = self.resolve_value(Some(raw.value), &raw.input, asset, network)?;
        let fees = apply_fee_invariants(
            transaction_type,
            FeeFields {
                gas_price: raw.gas_price,
                max_fee_per_gas: raw.max_fee_per_gas,
                max_priority_fee_per_gas: raw.max_priority_fee_per_gas,
            },
        )?;

        let transaction = Transaction {
            hash: raw.hash,
            from: raw.from,
            to: raw.to,
            nonce: u256_to_u64("nonce", raw.nonce)?,
            gas_limit: raw.gas,
            gas_price: fees.gas_price,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            value,
            native_value: raw.value,
            input: raw.input.clone(),
            access_list: carried_access_list(transaction_type, raw.access_list.as_ref()),
            transaction_type,
            block_hash: raw.block_hash,
            block_height: raw.block_number.map(|n| n.as_u64()),
            asset: asset.clone(),
            network: network.clone(),
        };

        // ethers reports missing signature components as zero
        let r = Some(raw.r).filter(|r| !r.is_zero());
        let s = Some(raw.s).filter(|s| !s.is_zero());
        Ok(attach_signature(transaction, r, s, Some(raw.v.as_u64())))
    }

    /// Normalizes a transaction pushed by the subscription provider.
    pub fn from_subscription_tx(
        &self,
        raw: &SubscriptionTransaction,
        asset: &Arc<Asset>,
        network: &Arc<Network>,
    ) -> Result<AnyTransaction, NormalizeError> {
        let hash = present(&raw.hash).ok_or_else(|| NormalizeError::missing("hash"))?;
        let hash = parse_h256("hash", hash)?;
        let from = present(&raw.from).ok_or_else(|| NormalizeError::missing("from"))?;
        let from = parse_address("from", from)?;
        let to = present(&raw.to).map(|to| parse_address("to", to)).transpose()?;

        let transaction_type = match &raw.transaction_type {
            Some(t) => TransactionType::try_from(t.to_u64("type")?)?,
            None => {
                debug!(
                    "Subscription transaction {:?} has no type, assuming {}",
                    hash, DEFAULT_TRANSACTION_TYPE
                );
                DEFAULT_TRANSACTION_TYPE
            }
        };

        let input = match present(&raw.input) {
            Some(data) => decode_bytes("input", data)?,
            None => Bytes::default(),
        };
        let literal_value = optional_u256(&raw.value, "value")?;
        let value = self.resolve_value(literal_value, &input, asset, network)?;

        let fees = apply_fee_invariants(
            transaction_type,
            FeeFields {
                gas_price: optional_u256(&raw.gas_price, "gasPrice")?,
                max_fee_per_gas: optional_u256(&raw.max_fee_per_gas, "maxFeePerGas")?,
                max_priority_fee_per_gas: optional_u256(
                    &raw.max_priority_fee_per_gas,
                    "maxPriorityFeePerGas",
                )?,
            },
        )?;

        let nonce = present(&raw.nonce).ok_or_else(|| NormalizeError::missing("nonce"))?;
        let gas = present(&raw.gas).ok_or_else(|| NormalizeError::missing("gas"))?;

        let transaction = Transaction {
            hash,
            from,
            to,
            nonce: decode_u64("nonce", nonce)?,
            gas_limit: decode_u256("gas", gas)?,
            gas_price: fees.gas_price,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            value,
            native_value: literal_value.unwrap_or_default(),
            input,
            access_list: carried_access_list(transaction_type, raw.access_list.as_ref()),
            transaction_type,
            block_hash: present(&raw.block_hash)
                .map(|h| parse_h256("blockHash", h))
                .transpose()?,
            block_height: present(&raw.block_number)
                .map(|n| decode_u64("blockNumber", n))
                .transpose()?,
            asset: asset.clone(),
            network: network.clone(),
        };

        let r = optional_u256(&raw.r, "r")?;
        let s = optional_u256(&raw.s, "s")?;
        let v = match raw.v.as_ref().filter(|v| v.is_present()) {
            Some(v) => Some(v.to_u64("v")?),
            None => None,
        };
        Ok(attach_signature(transaction, r, s, v))
    }

    /// Dispatches a tagged transaction payload to the normalizer for its transport.
    pub fn normalize(
        &self,
        payload: &TransactionPayload,
        asset: &Arc<Asset>,
        network: &Arc<Network>,
    ) -> Result<AnyTransaction, NormalizeError> {
        match payload {
            TransactionPayload::Polled(raw) => self.from_polled_tx(raw, asset, network),
            TransactionPayload::Subscription(raw) => self.from_subscription_tx(raw, asset, network),
        }
    }

    fn resolve_value(
        &self,
        literal: Option<U256>,
        input: &Bytes,
        asset: &Asset,
        network: &Network,
    ) -> Result<U256, NormalizeError> {
        if network.is_native_asset(asset) {
            return literal.ok_or_else(|| NormalizeError::missing("value"));
        }
        debug!(
            "Deriving {} transfer value from {} bytes of call data",
            asset.symbol,
            input.len()
        );
        self.decoder.transfer_value(input.as_ref())
    }
}

/// Normalizes a transaction fetched from the polling provider.
pub fn from_polled_tx(
    raw: &ProviderTransaction,
    asset: &Arc<Asset>,
    network: &Arc<Network>,
) -> Result<AnyTransaction, NormalizeError> {
    TransactionNormalizer::new().from_polled_tx(raw, asset, network)
}

/// Normalizes a transaction pushed by the subscription provider.
pub fn from_subscription_tx(
    raw: &SubscriptionTransaction,
    asset: &Arc<Asset>,
    network: &Arc<Network>,
) -> Result<AnyTransaction, NormalizeError> {
    TransactionNormalizer::new().from_subscription_tx(raw, asset, network)
}

/// Normalizes a tagged transaction payload.
pub fn normalize_transaction(
    payload: &TransactionPayload,
    asset: &Arc<Asset>,
    network: &Arc<Network>,
) -> Result<AnyTransaction, NormalizeError> {
    TransactionNormalizer::new().normalize(payload, asset, network)
}

/// Converts a signed canonical transaction back into the provider library's
/// transaction object, ready to be handed to its broadcast path.
///
/// The envelope carries `native_value`, not the derived asset amount, so the
/// encoded fields are exactly the ones that were signed.
pub fn to_external_tx(signed: &SignedTransaction) -> Result<ProviderTransaction, NormalizeError> {
    let tx = &signed.transaction;
    let chain_id = tx.network.numeric_chain_id()?;
    let access_list = match tx.transaction_type {
        TransactionType::Legacy => None,
        _ => Some(tx.access_list.clone()),
    };

    Ok(ProviderTransaction {
        hash: tx.hash,
        nonce: U256::from(tx.nonce),
        block_hash: tx.block_hash,
        block_number: tx.block_height.map(U64::from),
        from: tx.from,
        to: tx.to,
        value: tx.native_value,
        gas_price: tx.gas_price,
        gas: tx.gas_limit,
        input: tx.input.clone(),
        v: U64::from(signed.v),
        r: signed.r,
        s: signed.s,
        transaction_type: Some(U64::from(tx.transaction_type.as_u8())),
        access_list,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        chain_id: Some(U256::from(chain_id)),
        ..Default::default()
    })
}

/// Signed RLP envelope of a transaction, as accepted by `eth_sendRawTransaction`.
pub fn raw_transaction(signed: &SignedTransaction) -> Result<Bytes, NormalizeError> {
    Ok(to_external_tx(signed)?.rlp())
}

/// The one place a transaction becomes signed: all of r, s and v must be present.
fn attach_signature(
    transaction: Transaction,
    r: Option<U256>,
    s: Option<U256>,
    v: Option<u64>,
) -> AnyTransaction {
    match (r, s, v) {
        (Some(r), Some(s), Some(v)) => AnyTransaction::Signed(SignedTransaction {
            transaction,
            r,
            s,
            v,
        }),
        _ => AnyTransaction::Unsigned(transaction),
    }
}

fn apply_fee_invariants(
    transaction_type: TransactionType,
    fees: FeeFields,
) -> Result<FeeFields, NormalizeError> {
    match transaction_type {
        TransactionType::Legacy => {
            let gas_price = fees
                .gas_price
                .ok_or_else(|| NormalizeError::missing("gasPrice"))?;
            Ok(FeeFields {
                gas_price: Some(gas_price),
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
            })
        }
        TransactionType::AccessList => Ok(fees),
        TransactionType::DynamicFee => {
            if fees.max_fee_per_gas.is_none() {
                return Err(NormalizeError::missing("maxFeePerGas"));
            }
            if fees.max_priority_fee_per_gas.is_none() {
                return Err(NormalizeError::missing("maxPriorityFeePerGas"));
            }
            Ok(fees)
        }
    }
}

/// Legacy envelopes have no access list.
fn carried_access_list(transaction_type: TransactionType, list: Option<&AccessList>) -> AccessList {
    match (transaction_type, list) {
        (TransactionType::Legacy, _) | (_, None) => AccessList::default(),
        (_, Some(list)) => list.clone(),
    }
}

fn optional_u256(field: &Option<String>, name: &'static str) -> Result<Option<U256>, NormalizeError> {
    present(field).map(|raw| decode_u256(name, raw)).transpose()
}
