use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Stableswap pool classification as reported by the meta registry.
/// The discriminants are the values the on-chain adapters expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoolType {
    Base = 1,
    Meta = 2,
}

/// How calls against a pool have to be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolShape {
    /// Stableswap pool trading its own coins directly.
    StableBase,
    /// Stableswap meta-pool; every operation goes through `zapper`.
    StableMeta { zapper: Address },
    /// Cryptoswap pool (2 or 3 coins, possibly holding wrapped native).
    Crypto,
}

/// Metadata cached for a registered pool. Copied from the meta registry at
/// registration time and never refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub contract: Address,
    pub shape: PoolShape,
    pub gauge: Address,
    pub lp_token: Address,
    pub n_coins: usize,
}

impl PoolInfo {
    /// `None` for cryptoswap pools, which carry no type tag.
    pub fn pool_type(&self) -> Option<PoolType> {
        match self.shape {
            PoolShape::StableBase => Some(PoolType::Base),
            PoolShape::StableMeta { .. } => Some(PoolType::Meta),
            PoolShape::Crypto => None,
        }
    }

    /// The meta zapper, or the zero address for every other shape.
    pub fn zapper(&self) -> Address {
        match self.shape {
            PoolShape::StableMeta { zapper } => zapper,
            PoolShape::StableBase | PoolShape::Crypto => Address::ZERO,
        }
    }

    pub fn has_gauge(&self) -> bool {
        !self.gauge.is_zero()
    }
}
