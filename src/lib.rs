pub mod chain;
pub mod config;
pub mod constants;
pub mod db;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod registry;
pub mod router;
pub mod validator;

pub use errors::{AdapterError, IndexSide};

pub use chain::{CallContext, Chain, Checkpoint, ForkChain};
pub use config::{AdapterConfig, AdapterFlavor, DeploymentConfig};
pub use events::{AdapterEvent, EventSink};
pub use registry::{PoolInfo, PoolShape, PoolType};
pub use router::{
    AddLiquidityParams, Adapter, ExchangeParams, RemoveLiquidityImbalanceParams,
    RemoveLiquidityOneCoinParams, RemoveLiquidityParams,
};
