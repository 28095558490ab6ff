use crate::chain::{Chain, Checkpoint};
use crate::errors::AdapterError;
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::Provider;
use alloy_provider::ext::AnvilApi;
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

/// `Chain` backed by an anvil fork. Every `from` is impersonated, so the adapter
/// address does not need a deployed contract or a private key.
pub struct ForkChain<P: Provider + Send + Sync + 'static> {
    provider: Arc<P>,
}

impl<P: Provider + Send + Sync + 'static> ForkChain<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Tops up `account` on the fork, mostly useful for funding the adapter's gas.
    pub async fn fund(&self, account: Address, balance: U256) -> Result<(), AdapterError> {
        self.provider
            .anvil_set_balance(account, balance)
            .await
            .map_err(rpc_error)
    }
}

fn rpc_error(e: TransportError) -> AdapterError {
    match e.as_error_resp() {
        Some(payload) => AdapterError::Reverted(payload.message.to_string()),
        None => AdapterError::ProviderError(e.to_string()),
    }
}

#[async_trait]
impl<P: Provider + Send + Sync + 'static> Chain for ForkChain<P> {
    async fn view(&self, to: Address, input: Bytes) -> Result<Bytes, AdapterError> {
        let request = TransactionRequest::default().to(to).input(input.into());
        self.provider.call(request).await.map_err(rpc_error)
    }

    async fn execute(
        &self,
        from: Address,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> Result<Bytes, AdapterError> {
        self.provider
            .anvil_impersonate_account(from)
            .await
            .map_err(rpc_error)?;

        let request = TransactionRequest::default()
            .from(from)
            .to(to)
            .value(value)
            .input(input.into());

        // Return data is only observable through a call, so simulate first.
        let output = self.provider.call(request.clone()).await.map_err(rpc_error)?;

        let receipt = self
            .provider
            .send_transaction(request)
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(|e| AdapterError::ProviderError(e.to_string()))?;

        if !receipt.status() {
            tracing::warn!(?from, ?to, tx = ?receipt.transaction_hash(), "Transaction reverted on fork");
            return Err(AdapterError::Reverted(format!(
                "transaction {} reverted",
                receipt.transaction_hash()
            )));
        }
        Ok(output)
    }

    async fn native_balance(&self, account: Address) -> Result<U256, AdapterError> {
        self.provider.get_balance(account).await.map_err(rpc_error)
    }

    async fn checkpoint(&self) -> Result<Checkpoint, AdapterError> {
        let id = self.provider.anvil_snapshot().await.map_err(rpc_error)?;
        Ok(Checkpoint(id))
    }

    async fn rollback(&self, checkpoint: Checkpoint) -> Result<(), AdapterError> {
        let reverted = self
            .provider
            .anvil_revert(checkpoint.0)
            .await
            .map_err(rpc_error)?;
        if !reverted {
            return Err(AdapterError::ProviderError(format!(
                "evm_revert rejected snapshot {}",
                checkpoint.0
            )));
        }
        Ok(())
    }

    /// Anvil has no call to discard a snapshot without reverting to it, so
    /// released snapshots stay on the node until it restarts.
    async fn release(&self, checkpoint: Checkpoint) -> Result<(), AdapterError> {
        tracing::trace!(snapshot = %checkpoint.0, "Snapshot left on node");
        Ok(())
    }
}
