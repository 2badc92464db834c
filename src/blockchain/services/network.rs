// src/blockchain/services/network.rs

use ethers_core::types::Chain;
use serde::{Deserialize, Serialize};

use crate::blockchain::constants::{MAINNET_NETWORK_NAME, PROVIDER_MAINNET_ALIAS};
use crate::blockchain::models::{Network, NormalizeError};

/// Network descriptor in the form the provider library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderNetwork {
    pub name: String,
    pub chain_id: u64,
}

impl ProviderNetwork {
    /// The ethers `Chain` for this chain ID, if ethers knows it.
    pub fn chain(&self) -> Option<Chain> {
        Chain::try_from(self.chain_id).ok()
    }
}

/// Maps a canonical network onto the provider library's network descriptor.
///
/// Mainnet keeps the provider's legacy `homestead` alias; any other network
/// goes by its lower-cased canonical name. The registry hands out decimal
/// chain IDs, so a non-numeric one is reported rather than guessed at.
pub fn to_provider_network(network: &Network) -> Result<ProviderNetwork, NormalizeError> {
    let name = if network.name == MAINNET_NETWORK_NAME {
        PROVIDER_MAINNET_ALIAS.to_string()
    } else {
        network.name.to_lowercase()
    };

    Ok(ProviderNetwork {
        name,
        chain_id: network.numeric_chain_id()?,
    })
}
