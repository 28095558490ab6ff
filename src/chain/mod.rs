use crate::errors::AdapterError;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;

pub mod fork;

pub use fork::ForkChain;

/// Identity and attached native value of the account invoking an adapter entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: U256,
}

impl CallContext {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Opaque handle to a saved chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(pub U256);

/// The only path from the adapter to its collaborators (meta registry, pools,
/// zappers, gauges, minter and tokens).
#[async_trait]
pub trait Chain: Send + Sync {
    /// Read-only call; must not change any state.
    async fn view(&self, to: Address, input: Bytes) -> Result<Bytes, AdapterError>;

    /// State-changing call issued by `from`, carrying `value` wei.
    /// An empty `input` is a plain native transfer.
    async fn execute(
        &self,
        from: Address,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> Result<Bytes, AdapterError>;

    async fn native_balance(&self, account: Address) -> Result<U256, AdapterError>;

    /// Saves the current state. Every checkpoint is later either rolled back
    /// or released.
    async fn checkpoint(&self) -> Result<Checkpoint, AdapterError>;

    /// Restores the state saved by `checkpoint`, discarding everything executed since.
    async fn rollback(&self, checkpoint: Checkpoint) -> Result<(), AdapterError>;

    /// Drops a checkpoint whose operation succeeded, keeping the current state.
    async fn release(&self, checkpoint: Checkpoint) -> Result<(), AdapterError>;
}
