//! The adapter engine: owner-gated pool registration plus one routing entry
//! point per Curve operation.
//!
//! Every mutating operation follows the same pattern. Requests are validated
//! against the cached pool record, a chain checkpoint is taken, the external
//! calls run, and the event is appended only once everything succeeded. Any
//! failure after the checkpoint rolls the chain back, so a failed call leaves
//! neither balances nor the event log changed.

use crate::chain::{CallContext, Chain, Checkpoint};
use crate::config::{AdapterConfig, AdapterFlavor};
use crate::constants::{MAX_CRYPTOSWAP_COINS, MAX_STABLESWAP_COINS, MIN_COINS};
use crate::errors::AdapterError;
use crate::events::{AdapterEvent, EventLog, EventSink};
use crate::interfaces::{ICryptoSwap, IERC20, IStableSwap, encode};
use crate::registry::{MetaRegistry, PoolInfo, PoolMetadata, PoolShape, PoolType, Registry};
use crate::validator;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use futures::future::join_all;
use std::sync::Arc;

pub mod exchange;
pub mod liquidity;
pub mod staking;

pub use exchange::ExchangeParams;
pub use liquidity::{
    AddLiquidityParams, RemoveLiquidityImbalanceParams, RemoveLiquidityOneCoinParams,
    RemoveLiquidityParams,
};

pub struct Adapter<C: Chain + ?Sized> {
    config: AdapterConfig,
    chain: Arc<C>,
    meta_registry: MetaRegistry<C>,
    registry: Registry,
    events: EventLog,
}

impl<C: Chain + ?Sized> Adapter<C> {
    pub fn new(config: AdapterConfig, chain: Arc<C>) -> Self {
        let meta_registry = MetaRegistry::new(config.meta_registry, chain.clone());
        let registry = Registry::new(config.owner);
        Self {
            config,
            chain,
            meta_registry,
            registry,
            events: EventLog::new(),
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events.add_sink(sink);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn flavor(&self) -> AdapterFlavor {
        self.config.flavor
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn owner(&self) -> Address {
        self.registry.owner()
    }

    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    pub fn events(&self) -> &[AdapterEvent] {
        self.events.records()
    }

    pub fn get_pool_info(&self, pool: Address) -> Result<PoolInfo, AdapterError> {
        validator::resolve(&self.registry, pool)
    }

    pub fn get_pools_count(&self) -> usize {
        self.registry.len()
    }

    /// Registered pools, oldest first.
    pub fn pools(&self) -> &[Address] {
        self.registry.pools()
    }

    pub fn pool_at(&self, index: usize) -> Option<Address> {
        self.registry.pool_at(index)
    }

    /// Registers `pool` after checking it against the meta registry.
    ///
    /// Only the owner may register. Stableswap meta-pools need a `zapper`;
    /// for every other pool it is ignored.
    pub async fn register_pool(
        &mut self,
        ctx: CallContext,
        pool: Address,
        zapper: Option<Address>,
    ) -> Result<PoolInfo, AdapterError> {
        self.registry.ensure_owner(ctx.caller)?;

        if !self.meta_registry.is_registered(pool).await? {
            return Err(AdapterError::PoolNotInMetaRegistry);
        }
        if self.registry.contains(pool) {
            return Err(AdapterError::PoolAlreadyRegistered);
        }

        let metadata = self.meta_registry.get_metadata(pool, self.config.flavor).await?;
        let shape = self.classify(&metadata, zapper)?;
        let info = PoolInfo {
            contract: pool,
            shape,
            gauge: metadata.gauge,
            lp_token: metadata.lp_token,
            n_coins: metadata.n_coins,
        };
        self.registry.insert(info)?;

        tracing::info!(
            adapter = self.config.flavor.name(),
            ?pool,
            n_coins = info.n_coins,
            ?shape,
            "Pool registered"
        );
        self.events.emit(AdapterEvent::registered(&info)).await;
        Ok(info)
    }

    fn classify(
        &self,
        metadata: &PoolMetadata,
        zapper: Option<Address>,
    ) -> Result<PoolShape, AdapterError> {
        match self.config.flavor {
            AdapterFlavor::Cryptoswap => {
                if metadata.n_coins > MAX_CRYPTOSWAP_COINS {
                    return Err(AdapterError::TooManyCoins);
                }
                if metadata.n_coins < MIN_COINS {
                    return Err(AdapterError::UnsupportedCoinCount(metadata.n_coins));
                }
                Ok(PoolShape::Crypto)
            }
            AdapterFlavor::Stableswap => {
                let shape = match metadata.pool_type {
                    None | Some(PoolType::Base) => PoolShape::StableBase,
                    Some(PoolType::Meta) => match zapper {
                        Some(zapper) if !zapper.is_zero() => PoolShape::StableMeta { zapper },
                        _ => return Err(AdapterError::ZapperRequiredForMetapool),
                    },
                };
                if !(MIN_COINS..=MAX_STABLESWAP_COINS).contains(&metadata.n_coins) {
                    return Err(AdapterError::UnsupportedCoinCount(metadata.n_coins));
                }
                Ok(shape)
            }
        }
    }

    /// Settles a routed operation: releases `checkpoint` on success, rolls
    /// the chain back to it on failure.
    async fn settle<T>(
        &self,
        checkpoint: Checkpoint,
        result: Result<T, AdapterError>,
    ) -> Result<T, AdapterError> {
        match result {
            Ok(value) => {
                if let Err(release_err) = self.chain.release(checkpoint).await {
                    tracing::warn!("Checkpoint release failed: {:?}", release_err);
                }
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Operation failed, rolling back");
                if let Err(rollback_err) = self.chain.rollback(checkpoint).await {
                    tracing::error!("Rollback failed: {:?}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn view_call<T: SolCall>(&self, to: Address, call: T) -> Result<Bytes, AdapterError> {
        self.chain.view(to, encode(call)).await
    }

    /// Executes `call` against `to` with the adapter as sender.
    async fn send_call<T: SolCall>(
        &self,
        to: Address,
        value: U256,
        call: T,
    ) -> Result<Bytes, AdapterError> {
        self.send_raw(to, value, encode(call)).await
    }

    async fn send_raw(&self, to: Address, value: U256, input: Bytes) -> Result<Bytes, AdapterError> {
        self.chain.execute(self.address(), to, value, input).await
    }

    async fn coin(&self, info: &PoolInfo, index: usize) -> Result<Address, AdapterError> {
        let i = U256::from(index);
        let output = match info.shape {
            PoolShape::StableBase | PoolShape::StableMeta { .. } => {
                self.view_call(info.contract, IStableSwap::coinsCall { i })
                    .await?
            }
            PoolShape::Crypto => {
                self.view_call(info.contract, ICryptoSwap::coinsCall { i })
                    .await?
            }
        };
        Ok(ICryptoSwap::coinsCall::abi_decode_returns(&output)?)
    }

    async fn coins(&self, info: &PoolInfo) -> Result<Vec<Address>, AdapterError> {
        join_all((0..info.n_coins).map(|k| self.coin(info, k)))
            .await
            .into_iter()
            .collect()
    }

    /// Position of the wrapped-native coin when the caller asked to settle
    /// it as native. Stableswap pools never settle natively.
    fn native_slot(
        &self,
        info: &PoolInfo,
        coins: &[Address],
        use_native: bool,
    ) -> Result<Option<usize>, AdapterError> {
        if !use_native {
            return Ok(None);
        }
        match info.shape {
            PoolShape::Crypto => Ok(coins.iter().position(|c| *c == self.config.wrapped_native)),
            PoolShape::StableBase | PoolShape::StableMeta { .. } => {
                Err(AdapterError::NativeNotSupported)
            }
        }
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256, AdapterError> {
        let output = self
            .view_call(token, IERC20::balanceOfCall { owner: account })
            .await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&output)?)
    }

    /// Balances of `account` for each of `coins`; the slot in `native` is
    /// read as the account's native balance.
    async fn balances(
        &self,
        coins: &[Address],
        account: Address,
        native: Option<usize>,
    ) -> Result<Vec<U256>, AdapterError> {
        join_all(coins.iter().enumerate().map(|(k, coin)| async move {
            if Some(k) == native {
                self.chain.native_balance(account).await
            } else {
                self.token_balance(*coin, account).await
            }
        }))
        .await
        .into_iter()
        .collect()
    }

    /// Moves `amount` of `token` from `from` into the adapter. Relies on the
    /// allowance `from` granted the adapter.
    async fn pull(&self, token: Address, from: Address, amount: U256) -> Result<(), AdapterError> {
        if amount.is_zero() {
            return Ok(());
        }
        let call = IERC20::transferFromCall {
            from,
            to: self.address(),
            amount,
        };
        self.send_call(token, U256::ZERO, call).await?;
        Ok(())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<(), AdapterError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.send_call(token, U256::ZERO, IERC20::approveCall { spender, amount })
            .await?;
        Ok(())
    }

    async fn pull_and_approve(
        &self,
        token: Address,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), AdapterError> {
        self.pull(token, from, amount).await?;
        self.approve(token, spender, amount).await
    }

    /// Sends `amount` of `token` from the adapter to `to`.
    async fn push(&self, token: Address, to: Address, amount: U256) -> Result<(), AdapterError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.send_call(token, U256::ZERO, IERC20::transferCall { to, amount })
            .await?;
        Ok(())
    }

    /// Moves the native value attached to the call into the adapter.
    async fn receive_native(&self, ctx: &CallContext) -> Result<(), AdapterError> {
        if ctx.value.is_zero() {
            return Ok(());
        }
        self.chain
            .execute(ctx.caller, self.address(), ctx.value, Bytes::new())
            .await?;
        Ok(())
    }
}

/// Element-wise `after - before`, saturating at zero.
fn deltas(before: &[U256], after: &[U256]) -> Vec<U256> {
    before
        .iter()
        .zip(after)
        .map(|(b, a)| a.saturating_sub(*b))
        .collect()
}

fn curve_index(index: usize) -> i128 {
    index as i128
}
