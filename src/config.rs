// src/config.rs

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::blockchain::models::{Asset, Network};

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Token registry for the ingest surface, keyed by symbol.
    /// The network's native asset is always resolvable and need not be listed.
    pub token_assets: HashMap<String, Arc<Asset>>,

    // Output settings
    pub pretty_output: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from a dotenv-style file without touching the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to open env file {}", path.display()))?
        {
            let (key, value) = item.context("Invalid line in env file")?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // TOKEN_ASSETS is an optional JSON map of symbol -> asset descriptor
        let token_assets = match lookup("TOKEN_ASSETS") {
            Some(raw) if !raw.trim().is_empty() => {
                let assets: HashMap<String, Asset> = serde_json::from_str(&raw)
                    .context("Invalid TOKEN_ASSETS JSON format")?;
                assets
                    .into_iter()
                    .map(|(symbol, asset)| (symbol, Arc::new(asset)))
                    .collect()
            }
            _ => HashMap::new(),
        };

        let pretty_output = lookup("PRETTY_OUTPUT")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .context("PRETTY_OUTPUT must be true or false")?;

        Ok(Config {
            token_assets,
            pretty_output,
        })
    }

    /// Resolves an asset symbol against the registry. `None` means the native asset.
    pub fn resolve_asset(&self, symbol: Option<&str>, network: &Network) -> Option<Arc<Asset>> {
        match symbol {
            None => Some(network.native_asset.clone()),
            Some(symbol) if symbol == network.native_asset.symbol => {
                Some(network.native_asset.clone())
            }
            Some(symbol) => self.token_assets.get(symbol).cloned(),
        }
    }
}
