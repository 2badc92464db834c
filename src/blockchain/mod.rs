// src/blockchain/mod.rs

pub mod constants;
pub mod models;
pub mod payloads;
pub mod services;

// Re-export the normalizer entry points
pub use services::blocks::{from_polled_block, from_subscription_block, normalize_block};
pub use services::network::{to_provider_network, ProviderNetwork};
pub use services::transactions::{
    from_polled_tx, from_subscription_tx, normalize_transaction, raw_transaction, to_external_tx,
    TransactionNormalizer,
};
pub use services::transfer_value::{TrailingWordHeuristic, TransferValueDecoder};

// Re-export commonly used types
pub use ethers::types::{Address, Bytes, H256, U256, U64};
