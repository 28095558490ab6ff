use crate::registry::{PoolInfo, PoolType};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// One record per successful mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdapterEvent {
    PoolRegistered {
        pool: Address,
        pool_type: Option<PoolType>,
        gauge: Address,
        lp_token: Address,
        zapper: Address,
        n_coins: usize,
    },
    Exchange {
        pool: Address,
        index_in: usize,
        index_out: usize,
        amount_in: U256,
        min_amount_out: U256,
        out_amount: U256,
    },
    AddLiquidity {
        pool: Address,
        amounts: Vec<U256>,
        min_mint_amount: U256,
        mint_amount: U256,
    },
    RemoveLiquidity {
        pool: Address,
        amount: U256,
        min_amounts: Vec<U256>,
        received: Vec<U256>,
    },
    RemoveLiquidityImbalance {
        pool: Address,
        amounts: Vec<U256>,
        max_burn_amount: U256,
        burn_amount: U256,
    },
    RemoveLiquidityOneCoin {
        pool: Address,
        coin_index: usize,
        lp_amount: U256,
        min_amount: U256,
        out_amount: U256,
    },
    DepositLpForCrv {
        pool: Address,
        gauge: Address,
        lp_amount: U256,
    },
    ClaimCrvRewards {
        pool: Address,
        gauge: Address,
        amount: U256,
    },
}

impl AdapterEvent {
    pub fn registered(info: &PoolInfo) -> Self {
        AdapterEvent::PoolRegistered {
            pool: info.contract,
            pool_type: info.pool_type(),
            gauge: info.gauge,
            lp_token: info.lp_token,
            zapper: info.zapper(),
            n_coins: info.n_coins,
        }
    }

    pub fn pool(&self) -> Address {
        match self {
            AdapterEvent::PoolRegistered { pool, .. }
            | AdapterEvent::Exchange { pool, .. }
            | AdapterEvent::AddLiquidity { pool, .. }
            | AdapterEvent::RemoveLiquidity { pool, .. }
            | AdapterEvent::RemoveLiquidityImbalance { pool, .. }
            | AdapterEvent::RemoveLiquidityOneCoin { pool, .. }
            | AdapterEvent::DepositLpForCrv { pool, .. }
            | AdapterEvent::ClaimCrvRewards { pool, .. } => *pool,
        }
    }

    /// Stable name used by sinks, matching the serde tag.
    pub fn name(&self) -> &'static str {
        match self {
            AdapterEvent::PoolRegistered { .. } => "pool_registered",
            AdapterEvent::Exchange { .. } => "exchange",
            AdapterEvent::AddLiquidity { .. } => "add_liquidity",
            AdapterEvent::RemoveLiquidity { .. } => "remove_liquidity",
            AdapterEvent::RemoveLiquidityImbalance { .. } => "remove_liquidity_imbalance",
            AdapterEvent::RemoveLiquidityOneCoin { .. } => "remove_liquidity_one_coin",
            AdapterEvent::DepositLpForCrv { .. } => "deposit_lp_for_crv",
            AdapterEvent::ClaimCrvRewards { .. } => "claim_crv_rewards",
        }
    }
}

/// Receives a copy of every event after it has been committed to the log.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, sequence: u64, event: &AdapterEvent) -> Result<(), String>;
}

/// Append-only, call-ordered event log.
#[derive(Default)]
pub struct EventLog {
    records: Vec<AdapterEvent>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("records", &self.records.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Appends `event` and forwards it to every sink. A failing sink is
    /// logged and skipped; the record stays in the log either way.
    pub async fn emit(&mut self, event: AdapterEvent) {
        let sequence = self.records.len() as u64;
        tracing::info!(sequence, event = event.name(), pool = ?event.pool(), "Event emitted");

        for sink in &self.sinks {
            if let Err(e) = sink.publish(sequence, &event).await {
                tracing::warn!(sequence, "Failed to publish event to sink: {}", e);
            }
        }
        self.records.push(event);
    }

    pub fn records(&self) -> &[AdapterEvent] {
        &self.records
    }

    pub fn last(&self) -> Option<&AdapterEvent> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
