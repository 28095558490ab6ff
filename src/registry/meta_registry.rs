use crate::chain::Chain;
use crate::config::AdapterFlavor;
use crate::errors::AdapterError;
use crate::interfaces::{IMetaRegistry, encode};
use crate::registry::pool_info::PoolType;
use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use std::sync::Arc;

/// Read-only client for Curve's meta registry, the source of truth for which
/// pools exist and what they look like.
pub struct MetaRegistry<C: Chain + ?Sized> {
    pub address: Address,
    chain: Arc<C>,
}

impl<C: Chain + ?Sized> Clone for MetaRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            chain: self.chain.clone(),
        }
    }
}

/// Everything the registry copies out of the meta registry for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetadata {
    pub n_coins: usize,
    pub gauge: Address,
    pub lp_token: Address,
    /// Only read for stableswap pools.
    pub pool_type: Option<PoolType>,
}

impl<C: Chain + ?Sized> MetaRegistry<C> {
    pub fn new(address: Address, chain: Arc<C>) -> Self {
        Self { address, chain }
    }

    pub async fn is_registered(&self, pool: Address) -> Result<bool, AdapterError> {
        let result = self
            .chain
            .view(self.address, encode(IMetaRegistry::is_registeredCall { pool }))
            .await?;
        Ok(IMetaRegistry::is_registeredCall::abi_decode_returns(&result)?)
    }

    pub async fn get_n_coins(&self, pool: Address) -> Result<usize, AdapterError> {
        let result = self
            .chain
            .view(self.address, encode(IMetaRegistry::get_n_coinsCall { pool }))
            .await?;
        let n_coins = IMetaRegistry::get_n_coinsCall::abi_decode_returns(&result)?;
        Ok(n_coins.saturating_to::<usize>())
    }

    pub async fn get_gauge(&self, pool: Address) -> Result<Address, AdapterError> {
        let result = self
            .chain
            .view(self.address, encode(IMetaRegistry::get_gaugeCall { pool }))
            .await?;
        Ok(IMetaRegistry::get_gaugeCall::abi_decode_returns(&result)?)
    }

    pub async fn get_lp_token(&self, pool: Address) -> Result<Address, AdapterError> {
        let result = self
            .chain
            .view(self.address, encode(IMetaRegistry::get_lp_tokenCall { pool }))
            .await?;
        Ok(IMetaRegistry::get_lp_tokenCall::abi_decode_returns(&result)?)
    }

    pub async fn get_pool_type(&self, pool: Address) -> Result<PoolType, AdapterError> {
        let result = self
            .chain
            .view(self.address, encode(IMetaRegistry::is_metaCall { pool }))
            .await?;
        if IMetaRegistry::is_metaCall::abi_decode_returns(&result)? {
            Ok(PoolType::Meta)
        } else {
            Ok(PoolType::Base)
        }
    }

    /// Fetches the pool's shape data in one go. `is_meta` is only queried
    /// for stableswap pools.
    pub async fn get_metadata(
        &self,
        pool: Address,
        flavor: AdapterFlavor,
    ) -> Result<PoolMetadata, AdapterError> {
        let pool_type = async {
            match flavor {
                AdapterFlavor::Stableswap => self.get_pool_type(pool).await.map(Some),
                AdapterFlavor::Cryptoswap => Ok(None),
            }
        };
        let (n_coins, gauge, lp_token, pool_type) = tokio::join!(
            self.get_n_coins(pool),
            self.get_gauge(pool),
            self.get_lp_token(pool),
            pool_type,
        );
        Ok(PoolMetadata {
            n_coins: n_coins?,
            gauge: gauge?,
            lp_token: lp_token?,
            pool_type: pool_type?,
        })
    }
}
