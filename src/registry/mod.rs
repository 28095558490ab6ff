use crate::errors::AdapterError;
use alloy_primitives::Address;
use std::collections::HashMap;

pub mod meta_registry;
pub mod pool_info;

pub use meta_registry::{MetaRegistry, PoolMetadata};
pub use pool_info::{PoolInfo, PoolShape, PoolType};

/// Owner-gated table of registered pools.
///
/// Entries are only ever added: there is no way to unregister a pool or to
/// change its cached metadata.
#[derive(Debug, Clone)]
pub struct Registry {
    owner: Address,
    order: Vec<Address>,
    pools: HashMap<Address, PoolInfo>,
}

impl Registry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            order: Vec::new(),
            pools: HashMap::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, caller: Address) -> Result<(), AdapterError> {
        if caller != self.owner {
            return Err(AdapterError::NotOwner);
        }
        Ok(())
    }

    pub fn contains(&self, pool: Address) -> bool {
        self.pools.contains_key(&pool)
    }

    pub fn get(&self, pool: Address) -> Option<&PoolInfo> {
        self.pools.get(&pool)
    }

    /// Inserts a new entry. Callers are expected to have validated `info`;
    /// the only check performed here is uniqueness.
    pub fn insert(&mut self, info: PoolInfo) -> Result<(), AdapterError> {
        if self.contains(info.contract) {
            return Err(AdapterError::PoolAlreadyRegistered);
        }
        self.order.push(info.contract);
        self.pools.insert(info.contract, info);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered pools in registration order.
    pub fn pools(&self) -> &[Address] {
        &self.order
    }

    pub fn pool_at(&self, index: usize) -> Option<Address> {
        self.order.get(index).copied()
    }
}
