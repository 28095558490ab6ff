use crate::constants::{CRV_MINTER, CURVE_META_REGISTRY, WETH_ADDRESS};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterFlavor {
    Stableswap,
    Cryptoswap,
}

impl AdapterFlavor {
    pub fn name(&self) -> &'static str {
        match self {
            AdapterFlavor::Stableswap => "stableswap_adapter",
            AdapterFlavor::Cryptoswap => "cryptoswap_adapter",
        }
    }
}

/// Static wiring of one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub flavor: AdapterFlavor,
    /// Address the adapter acts from when calling collaborators.
    pub address: Address,
    pub owner: Address,
    #[serde(default = "default_meta_registry")]
    pub meta_registry: Address,
    #[serde(default = "default_minter")]
    pub minter: Address,
    /// Wrapped-native token that cryptoswap pools can settle as native coin.
    #[serde(default = "default_wrapped_native")]
    pub wrapped_native: Address,
}

fn default_meta_registry() -> Address {
    CURVE_META_REGISTRY
}

fn default_minter() -> Address {
    CRV_MINTER
}

fn default_wrapped_native() -> Address {
    WETH_ADDRESS
}

impl AdapterConfig {
    /// Mainnet collaborators.
    pub fn mainnet(flavor: AdapterFlavor, address: Address, owner: Address) -> Self {
        Self {
            flavor,
            address,
            owner,
            meta_registry: CURVE_META_REGISTRY,
            minter: CRV_MINTER,
            wrapped_native: WETH_ADDRESS,
        }
    }
}

/// A pool the binary registers on start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub address: Address,
    #[serde(default)]
    pub zapper: Option<Address>,
}

/// Everything the binary needs: node, optional event database and adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub rpc_url: Url,
    #[serde(default)]
    pub database_url: Option<String>,
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DeploymentConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
