//! Request checks shared by every routing operation. They run before any
//! external call and in a fixed order: registration, pool address, array
//! lengths, index bounds, index distinctness.

use crate::errors::{AdapterError, IndexSide};
use crate::registry::{PoolInfo, Registry};
use alloy_primitives::{Address, U256};

/// Looks up a registered pool; used by read accessors.
pub fn resolve(registry: &Registry, pool: Address) -> Result<PoolInfo, AdapterError> {
    registry
        .get(pool)
        .copied()
        .ok_or(AdapterError::PoolNotRegistered)
}

/// Looks up the pool named by a routing request and checks that the stored
/// record really belongs to it. An unknown address has no record, so it
/// fails the same way a mismatching one does.
pub fn resolve_for_call(registry: &Registry, pool: Address) -> Result<PoolInfo, AdapterError> {
    match registry.get(pool) {
        Some(info) if info.contract == pool => Ok(*info),
        _ => Err(AdapterError::PoolAddressMismatch),
    }
}

pub fn check_amounts_len(info: &PoolInfo, len: usize) -> Result<(), AdapterError> {
    if len != info.n_coins {
        return Err(AdapterError::InvalidAmountsLength);
    }
    Ok(())
}

pub fn check_index(info: &PoolInfo, index: usize, side: IndexSide) -> Result<(), AdapterError> {
    if index >= info.n_coins {
        return Err(AdapterError::IndexOutOfBounds(side));
    }
    Ok(())
}

pub fn check_exchange_indices(
    info: &PoolInfo,
    index_in: usize,
    index_out: usize,
) -> Result<(), AdapterError> {
    check_index(info, index_in, IndexSide::In)?;
    check_index(info, index_out, IndexSide::Out)?;
    if index_in == index_out {
        return Err(AdapterError::SameIndex);
    }
    Ok(())
}

/// The value attached to a call has to match the native amount it pays for, exactly.
pub fn check_native_value(expected: U256, attached: U256) -> Result<(), AdapterError> {
    if expected != attached {
        return Err(AdapterError::NativeValueMismatch {
            expected,
            actual: attached,
        });
    }
    Ok(())
}

pub fn check_gauge(info: &PoolInfo) -> Result<(), AdapterError> {
    if !info.has_gauge() {
        return Err(AdapterError::GaugeNotSet);
    }
    Ok(())
}
