use super::{Adapter, curve_index, deltas};
use crate::chain::{CallContext, Chain};
use crate::errors::{AdapterError, IndexSide};
use crate::events::AdapterEvent;
use crate::interfaces::{self, ICryptoSwap, IMetaZap, IStableSwap, decode_uint};
use crate::registry::{PoolInfo, PoolShape};
use crate::validator;
use alloy_primitives::{Address, U256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub pool: Address,
    /// One entry per pool coin.
    pub amounts: Vec<U256>,
    pub min_mint_amount: U256,
    pub use_native: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub pool: Address,
    pub lp_amount: U256,
    pub min_amounts: Vec<U256>,
    pub use_native: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityImbalanceParams {
    pub pool: Address,
    /// Exact amounts to withdraw, one entry per pool coin.
    pub amounts: Vec<U256>,
    pub max_burn_amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveLiquidityOneCoinParams {
    pub pool: Address,
    pub coin_index: usize,
    pub lp_amount: U256,
    pub min_amount: U256,
    pub use_native: bool,
}

impl<C: Chain + ?Sized> Adapter<C> {
    /// Deposits the caller's coins and hands the minted LP tokens to the
    /// caller. Returns the amount minted.
    pub async fn add_liquidity(
        &mut self,
        ctx: CallContext,
        params: AddLiquidityParams,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, params.pool)?;
        validator::check_amounts_len(&info, params.amounts.len())?;

        let coins = self.coins(&info).await?;
        let native = self.native_slot(&info, &coins, params.use_native)?;
        let expected_value = native.map_or(U256::ZERO, |k| params.amounts[k]);
        validator::check_native_value(expected_value, ctx.value)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = self
            .route_add_liquidity(&ctx, &info, &coins, &params, native)
            .await;
        let mint_amount = self.settle(checkpoint, result).await?;

        tracing::debug!(pool = ?params.pool, %mint_amount, "Liquidity added");
        self.events
            .emit(AdapterEvent::AddLiquidity {
                pool: params.pool,
                amounts: params.amounts,
                min_mint_amount: params.min_mint_amount,
                mint_amount,
            })
            .await;
        Ok(mint_amount)
    }

    async fn route_add_liquidity(
        &self,
        ctx: &CallContext,
        info: &PoolInfo,
        coins: &[Address],
        params: &AddLiquidityParams,
        native: Option<usize>,
    ) -> Result<U256, AdapterError> {
        let spender = match info.shape {
            PoolShape::StableMeta { zapper } => zapper,
            PoolShape::StableBase | PoolShape::Crypto => info.contract,
        };
        for (k, (coin, amount)) in coins.iter().zip(&params.amounts).enumerate() {
            if Some(k) == native {
                continue;
            }
            self.pull_and_approve(*coin, ctx.caller, spender, *amount)
                .await?;
        }

        match info.shape {
            PoolShape::StableBase => {
                let before = self.token_balance(info.lp_token, self.address()).await?;
                let input = interfaces::stable_add_liquidity(
                    info.n_coins,
                    &params.amounts,
                    params.min_mint_amount,
                )?;
                self.send_raw(info.contract, U256::ZERO, input).await?;
                let after = self.token_balance(info.lp_token, self.address()).await?;

                let minted = after.saturating_sub(before);
                self.push(info.lp_token, ctx.caller, minted).await?;
                Ok(minted)
            }
            PoolShape::StableMeta { zapper } => {
                let input = interfaces::zap_add_liquidity(
                    info.n_coins,
                    info.contract,
                    &params.amounts,
                    params.min_mint_amount,
                    ctx.caller,
                )?;
                let output = self.send_raw(zapper, U256::ZERO, input).await?;
                decode_uint(&output)
            }
            PoolShape::Crypto => {
                self.receive_native(ctx).await?;
                let input = interfaces::crypto_add_liquidity(
                    info.n_coins,
                    &params.amounts,
                    params.min_mint_amount,
                    native.is_some(),
                    ctx.caller,
                )?;
                let output = self.send_raw(info.contract, ctx.value, input).await?;
                decode_uint(&output)
            }
        }
    }

    /// Burns `lp_amount` of the caller's LP tokens for a proportional share of
    /// every coin. Returns the per-coin amounts the caller received.
    pub async fn remove_liquidity(
        &mut self,
        ctx: CallContext,
        params: RemoveLiquidityParams,
    ) -> Result<Vec<U256>, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, params.pool)?;
        validator::check_amounts_len(&info, params.min_amounts.len())?;

        let coins = self.coins(&info).await?;
        let native = self.native_slot(&info, &coins, params.use_native)?;
        validator::check_native_value(U256::ZERO, ctx.value)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = self
            .route_remove_liquidity(&ctx, &info, &coins, &params, native)
            .await;
        let received = self.settle(checkpoint, result).await?;

        tracing::debug!(pool = ?params.pool, ?received, "Liquidity removed");
        self.events
            .emit(AdapterEvent::RemoveLiquidity {
                pool: params.pool,
                amount: params.lp_amount,
                min_amounts: params.min_amounts,
                received: received.clone(),
            })
            .await;
        Ok(received)
    }

    async fn route_remove_liquidity(
        &self,
        ctx: &CallContext,
        info: &PoolInfo,
        coins: &[Address],
        params: &RemoveLiquidityParams,
        native: Option<usize>,
    ) -> Result<Vec<U256>, AdapterError> {
        self.pull(info.lp_token, ctx.caller, params.lp_amount).await?;

        match info.shape {
            PoolShape::StableBase => {
                let adapter = self.address();
                let before = self.balances(coins, adapter, None).await?;
                let input = interfaces::stable_remove_liquidity(
                    info.n_coins,
                    params.lp_amount,
                    &params.min_amounts,
                )?;
                self.send_raw(info.contract, U256::ZERO, input).await?;
                let after = self.balances(coins, adapter, None).await?;

                let received = deltas(&before, &after);
                for (coin, amount) in coins.iter().zip(&received) {
                    self.push(*coin, ctx.caller, *amount).await?;
                }
                Ok(received)
            }
            PoolShape::StableMeta { zapper } => {
                self.approve(info.lp_token, zapper, params.lp_amount).await?;
                let before = self.balances(coins, ctx.caller, None).await?;
                let input = interfaces::zap_remove_liquidity(
                    info.n_coins,
                    info.contract,
                    params.lp_amount,
                    &params.min_amounts,
                    ctx.caller,
                )?;
                self.send_raw(zapper, U256::ZERO, input).await?;
                let after = self.balances(coins, ctx.caller, None).await?;
                Ok(deltas(&before, &after))
            }
            PoolShape::Crypto => {
                let before = self.balances(coins, ctx.caller, native).await?;
                let input = interfaces::crypto_remove_liquidity(
                    info.n_coins,
                    params.lp_amount,
                    &params.min_amounts,
                    native.is_some(),
                    ctx.caller,
                )?;
                self.send_raw(info.contract, U256::ZERO, input).await?;
                let after = self.balances(coins, ctx.caller, native).await?;
                Ok(deltas(&before, &after))
            }
        }
    }

    /// Withdraws exact `amounts`, burning at most `max_burn_amount` LP tokens.
    /// Unburned LP goes back to the caller. Returns the amount burned.
    pub async fn remove_liquidity_imbalance(
        &mut self,
        ctx: CallContext,
        params: RemoveLiquidityImbalanceParams,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, params.pool)?;
        validator::check_amounts_len(&info, params.amounts.len())?;
        if info.shape == PoolShape::Crypto {
            return Err(AdapterError::UnsupportedOperation(
                "remove_liquidity_imbalance",
            ));
        }
        validator::check_native_value(U256::ZERO, ctx.value)?;

        let coins = self.coins(&info).await?;
        let checkpoint = self.chain.checkpoint().await?;
        let result = self
            .route_remove_liquidity_imbalance(&ctx, &info, &coins, &params)
            .await;
        let burn_amount = self.settle(checkpoint, result).await?;

        tracing::debug!(pool = ?params.pool, %burn_amount, "Imbalanced withdrawal");
        self.events
            .emit(AdapterEvent::RemoveLiquidityImbalance {
                pool: params.pool,
                amounts: params.amounts,
                max_burn_amount: params.max_burn_amount,
                burn_amount,
            })
            .await;
        Ok(burn_amount)
    }

    async fn route_remove_liquidity_imbalance(
        &self,
        ctx: &CallContext,
        info: &PoolInfo,
        coins: &[Address],
        params: &RemoveLiquidityImbalanceParams,
    ) -> Result<U256, AdapterError> {
        let adapter = self.address();
        self.pull(info.lp_token, ctx.caller, params.max_burn_amount)
            .await?;
        let lp_before = self.token_balance(info.lp_token, adapter).await?;

        match info.shape {
            PoolShape::StableBase => {
                let before = self.balances(coins, adapter, None).await?;
                let input = interfaces::stable_remove_liquidity_imbalance(
                    info.n_coins,
                    &params.amounts,
                    params.max_burn_amount,
                )?;
                self.send_raw(info.contract, U256::ZERO, input).await?;
                let after = self.balances(coins, adapter, None).await?;

                for (coin, amount) in coins.iter().zip(deltas(&before, &after)) {
                    self.push(*coin, ctx.caller, amount).await?;
                }
            }
            PoolShape::StableMeta { zapper } => {
                self.approve(info.lp_token, zapper, params.max_burn_amount)
                    .await?;
                let input = interfaces::zap_remove_liquidity_imbalance(
                    info.n_coins,
                    info.contract,
                    &params.amounts,
                    params.max_burn_amount,
                    ctx.caller,
                )?;
                // The zap takes `max_burn_amount` and sends back what it did not burn.
                self.send_raw(zapper, U256::ZERO, input).await?;
            }
            PoolShape::Crypto => {
                return Err(AdapterError::UnsupportedOperation(
                    "remove_liquidity_imbalance",
                ));
            }
        }

        let lp_after = self.token_balance(info.lp_token, adapter).await?;
        let burned = lp_before.saturating_sub(lp_after);
        self.push(
            info.lp_token,
            ctx.caller,
            params.max_burn_amount.saturating_sub(burned),
        )
        .await?;
        Ok(burned)
    }

    /// Burns `lp_amount` LP tokens for a single coin. Returns the amount of
    /// that coin the caller received.
    pub async fn remove_liquidity_one_coin(
        &mut self,
        ctx: CallContext,
        params: RemoveLiquidityOneCoinParams,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, params.pool)?;
        validator::check_index(&info, params.coin_index, IndexSide::Out)?;
        if params.use_native && info.shape != PoolShape::Crypto {
            return Err(AdapterError::NativeNotSupported);
        }
        validator::check_native_value(U256::ZERO, ctx.value)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = self
            .route_remove_liquidity_one_coin(&ctx, &info, &params)
            .await;
        let out_amount = self.settle(checkpoint, result).await?;

        tracing::debug!(pool = ?params.pool, coin_index = params.coin_index, %out_amount, "Single-coin withdrawal");
        self.events
            .emit(AdapterEvent::RemoveLiquidityOneCoin {
                pool: params.pool,
                coin_index: params.coin_index,
                lp_amount: params.lp_amount,
                min_amount: params.min_amount,
                out_amount,
            })
            .await;
        Ok(out_amount)
    }

    async fn route_remove_liquidity_one_coin(
        &self,
        ctx: &CallContext,
        info: &PoolInfo,
        params: &RemoveLiquidityOneCoinParams,
    ) -> Result<U256, AdapterError> {
        self.pull(info.lp_token, ctx.caller, params.lp_amount).await?;

        match info.shape {
            PoolShape::StableBase => {
                let coin = self.coin(info, params.coin_index).await?;
                let before = self.token_balance(coin, self.address()).await?;
                let call = IStableSwap::remove_liquidity_one_coinCall {
                    token_amount: params.lp_amount,
                    i: curve_index(params.coin_index),
                    min_amount: params.min_amount,
                };
                self.send_call(info.contract, U256::ZERO, call).await?;
                let after = self.token_balance(coin, self.address()).await?;

                let out_amount = after.saturating_sub(before);
                self.push(coin, ctx.caller, out_amount).await?;
                Ok(out_amount)
            }
            PoolShape::StableMeta { zapper } => {
                self.approve(info.lp_token, zapper, params.lp_amount).await?;
                let call = IMetaZap::remove_liquidity_one_coinCall {
                    pool: info.contract,
                    burn_amount: params.lp_amount,
                    i: curve_index(params.coin_index),
                    min_amount: params.min_amount,
                    receiver: ctx.caller,
                };
                let output = self.send_call(zapper, U256::ZERO, call).await?;
                decode_uint(&output)
            }
            PoolShape::Crypto => {
                let call = ICryptoSwap::remove_liquidity_one_coinCall {
                    token_amount: params.lp_amount,
                    i: U256::from(params.coin_index),
                    min_amount: params.min_amount,
                    use_eth: params.use_native,
                    receiver: ctx.caller,
                };
                let output = self.send_call(info.contract, U256::ZERO, call).await?;
                decode_uint(&output)
            }
        }
    }

    /// LP tokens minted for depositing `amounts`.
    pub async fn get_lp_amount_after_deposit(
        &self,
        pool: Address,
        amounts: &[U256],
    ) -> Result<U256, AdapterError> {
        self.calc_token_amount(pool, amounts, true).await
    }

    /// LP tokens burned for withdrawing `amounts`.
    pub async fn get_lp_amount_after_withdraw(
        &self,
        pool: Address,
        amounts: &[U256],
    ) -> Result<U256, AdapterError> {
        self.calc_token_amount(pool, amounts, false).await
    }

    async fn calc_token_amount(
        &self,
        pool: Address,
        amounts: &[U256],
        is_deposit: bool,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, pool)?;
        validator::check_amounts_len(&info, amounts.len())?;

        let output = match info.shape {
            PoolShape::StableBase => {
                let input = interfaces::stable_calc_token_amount(info.n_coins, amounts, is_deposit)?;
                self.chain.view(info.contract, input).await?
            }
            PoolShape::StableMeta { zapper } => {
                let input = interfaces::zap_calc_token_amount(
                    info.n_coins,
                    info.contract,
                    amounts,
                    is_deposit,
                )?;
                self.chain.view(zapper, input).await?
            }
            PoolShape::Crypto => {
                let input = interfaces::crypto_calc_token_amount(info.n_coins, amounts, is_deposit)?;
                self.chain.view(info.contract, input).await?
            }
        };
        decode_uint(&output)
    }

    /// Amount of coin `coin_index` paid out for burning `lp_amount`.
    pub async fn get_lp_amount_after_remove_one_coin(
        &self,
        pool: Address,
        coin_index: usize,
        lp_amount: U256,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, pool)?;
        validator::check_index(&info, coin_index, IndexSide::Out)?;

        let output = match info.shape {
            PoolShape::StableBase => {
                let call = IStableSwap::calc_withdraw_one_coinCall {
                    token_amount: lp_amount,
                    i: curve_index(coin_index),
                };
                self.view_call(info.contract, call).await?
            }
            PoolShape::StableMeta { zapper } => {
                let call = IMetaZap::calc_withdraw_one_coinCall {
                    pool: info.contract,
                    token_amount: lp_amount,
                    i: curve_index(coin_index),
                };
                self.view_call(zapper, call).await?
            }
            PoolShape::Crypto => {
                let call = ICryptoSwap::calc_withdraw_one_coinCall {
                    token_amount: lp_amount,
                    i: U256::from(coin_index),
                };
                self.view_call(info.contract, call).await?
            }
        };
        decode_uint(&output)
    }
}
