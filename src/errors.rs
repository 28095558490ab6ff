use alloy_primitives::U256;
use std::fmt;
use thiserror::Error;

/// Which side of a two-index operation an out-of-range index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSide {
    In,
    Out,
}

impl fmt::Display for IndexSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSide::In => f.write_str("in"),
            IndexSide::Out => f.write_str("out"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("ownable: caller is not the owner")]
    NotOwner,

    #[error("pool is not registered in meta registry")]
    PoolNotInMetaRegistry,

    #[error("pool already registered")]
    PoolAlreadyRegistered,

    #[error("pool has more than 3 coins")]
    TooManyCoins,

    #[error("zapper address is required for metapools")]
    ZapperRequiredForMetapool,

    #[error("pool not registered")]
    PoolNotRegistered,

    #[error("pool address mismatch")]
    PoolAddressMismatch,

    #[error("invalid number of amounts")]
    InvalidAmountsLength,

    #[error("index {0} out of bounds")]
    IndexOutOfBounds(IndexSide),

    #[error("index in and index out cannot be the same")]
    SameIndex,

    #[error("unsupported number of coins: {0}")]
    UnsupportedCoinCount(usize),

    #[error("attached value {actual} does not match expected native amount {expected}")]
    NativeValueMismatch { expected: U256, actual: U256 },

    #[error("native coin is not supported for stableswap pools")]
    NativeNotSupported,

    #[error("pool has no gauge")]
    GaugeNotSet,

    #[error("operation not supported by this pool: {0}")]
    UnsupportedOperation(&'static str),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("ABI decoding error for contract call: {0}")]
    AbiDecodeError(String),
}

impl From<alloy_sol_types::Error> for AdapterError {
    fn from(err: alloy_sol_types::Error) -> Self {
        AdapterError::AbiDecodeError(err.to_string())
    }
}
