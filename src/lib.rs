// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, Bytes, H256, U256, U64};

// Re-export modules
pub mod blockchain;
pub mod config;
pub mod ingest;
pub mod utils;

pub use blockchain::models::{
    AnyTransaction, Asset, Block, Network, NormalizeError, SignedTransaction, Transaction,
    TransactionType,
};

/// Application state shared across the ingest loop
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::Config>,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
