use super::Adapter;
use crate::chain::{CallContext, Chain};
use crate::errors::AdapterError;
use crate::events::AdapterEvent;
use crate::interfaces::{ILiquidityGauge, IMinter};
use crate::validator;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

impl<C: Chain + ?Sized> Adapter<C> {
    /// Stakes `lp_amount` of the caller's LP tokens in the pool's gauge,
    /// crediting the stake to the caller. Returns the amount deposited.
    pub async fn deposit_lp_for_crv(
        &mut self,
        ctx: CallContext,
        pool: Address,
        lp_amount: U256,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, pool)?;
        validator::check_gauge(&info)?;
        validator::check_native_value(U256::ZERO, ctx.value)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = async {
            self.pull_and_approve(info.lp_token, ctx.caller, info.gauge, lp_amount)
                .await?;
            let call = ILiquidityGauge::depositCall {
                value: lp_amount,
                addr: ctx.caller,
            };
            self.send_call(info.gauge, U256::ZERO, call).await?;
            Ok::<_, AdapterError>(())
        }
        .await;
        self.settle(checkpoint, result).await?;

        tracing::debug!(?pool, gauge = ?info.gauge, %lp_amount, "LP staked in gauge");
        self.events
            .emit(AdapterEvent::DepositLpForCrv {
                pool,
                gauge: info.gauge,
                lp_amount,
            })
            .await;
        Ok(lp_amount)
    }

    /// Mints the CRV the caller has accrued in the pool's gauge, straight to
    /// the caller. The caller must have approved the adapter as a minter via
    /// `toggle_approve_mint`. Returns the amount minted.
    pub async fn claim_crv_rewards(
        &mut self,
        ctx: CallContext,
        pool: Address,
    ) -> Result<U256, AdapterError> {
        let info = validator::resolve_for_call(&self.registry, pool)?;
        validator::check_gauge(&info)?;
        validator::check_native_value(U256::ZERO, ctx.value)?;

        let minter = self.config.minter;
        let output = self.view_call(minter, IMinter::tokenCall {}).await?;
        let crv = IMinter::tokenCall::abi_decode_returns(&output)?;

        let checkpoint = self.chain.checkpoint().await?;
        let result = async {
            let before = self.token_balance(crv, ctx.caller).await?;
            let call = IMinter::mint_forCall {
                gauge: info.gauge,
                account: ctx.caller,
            };
            self.send_call(minter, U256::ZERO, call).await?;
            let after = self.token_balance(crv, ctx.caller).await?;
            Ok::<_, AdapterError>(after.saturating_sub(before))
        }
        .await;
        let amount = self.settle(checkpoint, result).await?;

        tracing::debug!(?pool, gauge = ?info.gauge, %amount, "CRV claimed");
        self.events
            .emit(AdapterEvent::ClaimCrvRewards {
                pool,
                gauge: info.gauge,
                amount,
            })
            .await;
        Ok(amount)
    }
}
