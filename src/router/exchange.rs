use super::{Adapter, curve_index};
use crate::chain::{CallContext, Chain};
use crate::errors::AdapterError;
use crate::events::AdapterEvent;
use crate::interfaces::{ICryptoSwap, IMetaZap, IStableSwap, decode_uint};
use crate::registry::{PoolInfo, PoolShape};
use crate::validator;
use alloy_primitives::{Address, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeParams {
    pub pool: Address,
    pub index_in: usize,
    pub index_out: usize,
    pub amount_in: U256,
    pub min_amount_out: U256,
    /// Pay or receive the wrapped-native coin as native value. Cryptoswap only.
    pub use_native: bool,
}

impl<C: Chain + ?Sized> Adapter<C> {
    /// Swaps `amount_in` of coin `index_in` for coin `index_out`; the output
    /// ends up with the caller. Returns the amount received.
    pub async fn exchange(
        &mut self,
        ctx: CallContext,
        params: ExchangeParams,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, params.pool)?;
        validator::check_exchange_indices(&info, params.index_in, params.index_out)?;

        let coins = self.coins(&info).await?;
        let native = self.native_slot(&info, &coins, params.use_native)?;
        let native_in = native == Some(params.index_in);
        let expected_value = if native_in { params.amount_in } else { U256::ZERO };
        validator::check_native_value(expected_value, ctx.value)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = self
            .route_exchange(&ctx, &info, &coins, &params, native_in)
            .await;
        let out_amount = self.settle(checkpoint, result).await?;

        tracing::debug!(
            pool = ?params.pool,
            index_in = params.index_in,
            index_out = params.index_out,
            %out_amount,
            "Exchange routed"
        );
        self.events
            .emit(AdapterEvent::Exchange {
                pool: params.pool,
                index_in: params.index_in,
                index_out: params.index_out,
                amount_in: params.amount_in,
                min_amount_out: params.min_amount_out,
                out_amount,
            })
            .await;
        Ok(out_amount)
    }

    async fn route_exchange(
        &self,
        ctx: &CallContext,
        info: &PoolInfo,
        coins: &[Address],
        params: &ExchangeParams,
        native_in: bool,
    ) -> Result<U256, AdapterError> {
        let coin_in = coins[params.index_in];
        let coin_out = coins[params.index_out];

        match info.shape {
            PoolShape::StableBase => {
                self.pull_and_approve(coin_in, ctx.caller, info.contract, params.amount_in)
                    .await?;
                let before = self.token_balance(coin_out, self.address()).await?;
                let call = IStableSwap::exchangeCall {
                    i: curve_index(params.index_in),
                    j: curve_index(params.index_out),
                    dx: params.amount_in,
                    min_dy: params.min_amount_out,
                };
                self.send_call(info.contract, U256::ZERO, call).await?;
                let after = self.token_balance(coin_out, self.address()).await?;

                let out_amount = after.saturating_sub(before);
                self.push(coin_out, ctx.caller, out_amount).await?;
                Ok(out_amount)
            }
            PoolShape::StableMeta { zapper } => {
                self.pull_and_approve(coin_in, ctx.caller, zapper, params.amount_in)
                    .await?;
                let call = IMetaZap::exchange_underlyingCall {
                    pool: info.contract,
                    i: curve_index(params.index_in),
                    j: curve_index(params.index_out),
                    dx: params.amount_in,
                    min_dy: params.min_amount_out,
                    receiver: ctx.caller,
                };
                let output = self.send_call(zapper, U256::ZERO, call).await?;
                decode_uint(&output)
            }
            PoolShape::Crypto => {
                let value = if native_in {
                    self.receive_native(ctx).await?;
                    params.amount_in
                } else {
                    self.pull_and_approve(coin_in, ctx.caller, info.contract, params.amount_in)
                        .await?;
                    U256::ZERO
                };
                let call = ICryptoSwap::exchangeCall {
                    i: U256::from(params.index_in),
                    j: U256::from(params.index_out),
                    dx: params.amount_in,
                    min_dy: params.min_amount_out,
                    use_eth: params.use_native,
                    receiver: ctx.caller,
                };
                let output = self.send_call(info.contract, value, call).await?;
                decode_uint(&output)
            }
        }
    }

    /// Quotes an exchange without executing it.
    pub async fn get_exchange_amount_out(
        &self,
        pool: Address,
        index_in: usize,
        index_out: usize,
        amount_in: U256,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, pool)?;
        validator::check_exchange_indices(&info, index_in, index_out)?;

        let output = match info.shape {
            PoolShape::StableBase => {
                let call = IStableSwap::get_dyCall {
                    i: curve_index(index_in),
                    j: curve_index(index_out),
                    dx: amount_in,
                };
                self.view_call(info.contract, call).await?
            }
            PoolShape::StableMeta { zapper } => {
                let call = IMetaZap::get_dy_underlyingCall {
                    pool: info.contract,
                    i: curve_index(index_in),
                    j: curve_index(index_out),
                    dx: amount_in,
                };
                self.view_call(zapper, call).await?
            }
            PoolShape::Crypto => {
                let call = ICryptoSwap::get_dyCall {
                    i: U256::from(index_in),
                    j: U256::from(index_out),
                    dx: amount_in,
                };
                self.view_call(info.contract, call).await?
            }
        };
        decode_uint(&output)
    }
}
