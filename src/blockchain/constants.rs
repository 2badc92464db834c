// src/blockchain/constants.rs

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::blockchain::models::{Asset, Network, TransactionType};

/// Canonical name the network registry uses for Ethereum mainnet.
pub const MAINNET_NETWORK_NAME: &str = "Ethereum";

/// Name the provider library still uses internally for Ethereum mainnet.
pub const PROVIDER_MAINNET_ALIAS: &str = "homestead";

/// Type assumed when a payload carries no explicit `type` field.
///
/// Pre-EIP-2718 nodes omit the field for legacy transactions, but nothing in
/// the JSON-RPC contract guarantees that an untyped payload is legacy. Treat
/// this as a policy, not a protocol fact.
pub const DEFAULT_TRANSACTION_TYPE: TransactionType = TransactionType::Legacy;

lazy_static! {
    /// Ether, the base asset of Ethereum mainnet
    pub static ref ETH: Arc<Asset> = Arc::new(Asset {
        name: "Ether".to_string(),
        symbol: "ETH".to_string(),
        decimals: 18,
        contract_address: None,
    });

    /// The single network this integration serves. Blocks are always tagged with it.
    pub static ref ETHEREUM: Arc<Network> = Arc::new(Network {
        chain_id: "1".to_string(),
        name: MAINNET_NETWORK_NAME.to_string(),
        native_asset: ETH.clone(),
    });
}
