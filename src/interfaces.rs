//! ABI surface of every collaborator the adapter talks to.
//!
//! Curve pools take fixed-size amount arrays, so each family gets one
//! interface per supported coin count; the `encode_*` helpers below pick the
//! right one from `n_coins`.

use crate::errors::AdapterError;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolType, sol, sol_data};

sol! {
    interface IMetaRegistry {
        function is_registered(address pool) external view returns (bool);
        function get_n_coins(address pool) external view returns (uint256);
        function get_gauge(address pool) external view returns (address);
        function get_lp_token(address pool) external view returns (address);
        function is_meta(address pool) external view returns (bool);
    }

    // Return values are not declared on purpose: USDT-style tokens return nothing.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function approve(address spender, uint256 amount) external;
        function transfer(address to, uint256 amount) external;
        function transferFrom(address from, address to, uint256 amount) external;
    }

    // Legacy base pools (3pool and friends) return nothing from state-changing calls.
    interface IStableSwap {
        function coins(uint256 i) external view returns (address);
        function exchange(int128 i, int128 j, uint256 dx, uint256 min_dy) external;
        function get_dy(int128 i, int128 j, uint256 dx) external view returns (uint256);
        function remove_liquidity_one_coin(uint256 token_amount, int128 i, uint256 min_amount) external;
        function calc_withdraw_one_coin(uint256 token_amount, int128 i) external view returns (uint256);
    }

    interface IStableSwap2 {
        function add_liquidity(uint256[2] amounts, uint256 min_mint_amount) external;
        function remove_liquidity(uint256 amount, uint256[2] min_amounts) external;
        function remove_liquidity_imbalance(uint256[2] amounts, uint256 max_burn_amount) external;
        function calc_token_amount(uint256[2] amounts, bool is_deposit) external view returns (uint256);
    }

    interface IStableSwap3 {
        function add_liquidity(uint256[3] amounts, uint256 min_mint_amount) external;
        function remove_liquidity(uint256 amount, uint256[3] min_amounts) external;
        function remove_liquidity_imbalance(uint256[3] amounts, uint256 max_burn_amount) external;
        function calc_token_amount(uint256[3] amounts, bool is_deposit) external view returns (uint256);
    }

    interface IStableSwap4 {
        function add_liquidity(uint256[4] amounts, uint256 min_mint_amount) external;
        function remove_liquidity(uint256 amount, uint256[4] min_amounts) external;
        function remove_liquidity_imbalance(uint256[4] amounts, uint256 max_burn_amount) external;
        function calc_token_amount(uint256[4] amounts, bool is_deposit) external view returns (uint256);
    }

    // Deposit zap shared by many meta-pools; the pool is always the first argument.
    interface IMetaZap {
        function exchange_underlying(address pool, int128 i, int128 j, uint256 dx, uint256 min_dy, address receiver) external returns (uint256);
        function get_dy_underlying(address pool, int128 i, int128 j, uint256 dx) external view returns (uint256);
        function remove_liquidity_one_coin(address pool, uint256 burn_amount, int128 i, uint256 min_amount, address receiver) external returns (uint256);
        function calc_withdraw_one_coin(address pool, uint256 token_amount, int128 i) external view returns (uint256);
    }

    interface IMetaZap2 {
        function add_liquidity(address pool, uint256[2] deposit_amounts, uint256 min_mint_amount, address receiver) external returns (uint256);
        function remove_liquidity(address pool, uint256 burn_amount, uint256[2] min_amounts, address receiver) external;
        function remove_liquidity_imbalance(address pool, uint256[2] amounts, uint256 max_burn_amount, address receiver) external returns (uint256);
        function calc_token_amount(address pool, uint256[2] amounts, bool is_deposit) external view returns (uint256);
    }

    interface IMetaZap3 {
        function add_liquidity(address pool, uint256[3] deposit_amounts, uint256 min_mint_amount, address receiver) external returns (uint256);
        function remove_liquidity(address pool, uint256 burn_amount, uint256[3] min_amounts, address receiver) external;
        function remove_liquidity_imbalance(address pool, uint256[3] amounts, uint256 max_burn_amount, address receiver) external returns (uint256);
        function calc_token_amount(address pool, uint256[3] amounts, bool is_deposit) external view returns (uint256);
    }

    interface IMetaZap4 {
        function add_liquidity(address pool, uint256[4] deposit_amounts, uint256 min_mint_amount, address receiver) external returns (uint256);
        function remove_liquidity(address pool, uint256 burn_amount, uint256[4] min_amounts, address receiver) external;
        function remove_liquidity_imbalance(address pool, uint256[4] amounts, uint256 max_burn_amount, address receiver) external returns (uint256);
        function calc_token_amount(address pool, uint256[4] amounts, bool is_deposit) external view returns (uint256);
    }

    interface ICryptoSwap {
        function coins(uint256 i) external view returns (address);
        function exchange(uint256 i, uint256 j, uint256 dx, uint256 min_dy, bool use_eth, address receiver) external payable returns (uint256);
        function get_dy(uint256 i, uint256 j, uint256 dx) external view returns (uint256);
        function remove_liquidity_one_coin(uint256 token_amount, uint256 i, uint256 min_amount, bool use_eth, address receiver) external returns (uint256);
        function calc_withdraw_one_coin(uint256 token_amount, uint256 i) external view returns (uint256);
    }

    interface ICryptoSwap2 {
        function add_liquidity(uint256[2] amounts, uint256 min_mint_amount, bool use_eth, address receiver) external payable returns (uint256);
        function remove_liquidity(uint256 amount, uint256[2] min_amounts, bool use_eth, address receiver) external;
        function calc_token_amount(uint256[2] amounts, bool deposit) external view returns (uint256);
    }

    interface ICryptoSwap3 {
        function add_liquidity(uint256[3] amounts, uint256 min_mint_amount, bool use_eth, address receiver) external payable returns (uint256);
        function remove_liquidity(uint256 amount, uint256[3] min_amounts, bool use_eth, address receiver) external;
        function calc_token_amount(uint256[3] amounts, bool deposit) external view returns (uint256);
    }

    interface ILiquidityGauge {
        function deposit(uint256 value, address addr) external;
        function balanceOf(address account) external view returns (uint256);
    }

    interface IMinter {
        function token() external view returns (address);
        function mint_for(address gauge, address account) external;
        function toggle_approve_mint(address minting_user) external;
    }
}

fn fixed<const N: usize>(values: &[U256]) -> Result<[U256; N], AdapterError> {
    <[U256; N]>::try_from(values).map_err(|_| AdapterError::InvalidAmountsLength)
}

/// Picks the call struct matching `n_coins` and ABI-encodes it.
macro_rules! encode_fixed {
    ($n:expr, $values:expr, { $($count:literal => |$arr:ident| $call:expr),+ $(,)? }) => {
        match $n {
            $($count => {
                let $arr: [U256; $count] = fixed($values)?;
                Ok(Bytes::from($call.abi_encode()))
            })+
            other => Err(AdapterError::UnsupportedCoinCount(other)),
        }
    };
}

pub fn encode<C: SolCall>(call: C) -> Bytes {
    Bytes::from(call.abi_encode())
}

/// Decodes a single `uint256` return value, whatever function produced it.
pub fn decode_uint(output: &[u8]) -> Result<U256, AdapterError> {
    Ok(<sol_data::Uint<256> as SolType>::abi_decode(output)?)
}

pub fn stable_add_liquidity(
    n_coins: usize,
    amounts: &[U256],
    min_mint_amount: U256,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IStableSwap2::add_liquidityCall { amounts: a, min_mint_amount },
        3 => |a| IStableSwap3::add_liquidityCall { amounts: a, min_mint_amount },
        4 => |a| IStableSwap4::add_liquidityCall { amounts: a, min_mint_amount },
    })
}

pub fn stable_remove_liquidity(
    n_coins: usize,
    amount: U256,
    min_amounts: &[U256],
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, min_amounts, {
        2 => |m| IStableSwap2::remove_liquidityCall { amount, min_amounts: m },
        3 => |m| IStableSwap3::remove_liquidityCall { amount, min_amounts: m },
        4 => |m| IStableSwap4::remove_liquidityCall { amount, min_amounts: m },
    })
}

pub fn stable_remove_liquidity_imbalance(
    n_coins: usize,
    amounts: &[U256],
    max_burn_amount: U256,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IStableSwap2::remove_liquidity_imbalanceCall { amounts: a, max_burn_amount },
        3 => |a| IStableSwap3::remove_liquidity_imbalanceCall { amounts: a, max_burn_amount },
        4 => |a| IStableSwap4::remove_liquidity_imbalanceCall { amounts: a, max_burn_amount },
    })
}

pub fn stable_calc_token_amount(
    n_coins: usize,
    amounts: &[U256],
    is_deposit: bool,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IStableSwap2::calc_token_amountCall { amounts: a, is_deposit },
        3 => |a| IStableSwap3::calc_token_amountCall { amounts: a, is_deposit },
        4 => |a| IStableSwap4::calc_token_amountCall { amounts: a, is_deposit },
    })
}

pub fn zap_add_liquidity(
    n_coins: usize,
    pool: Address,
    amounts: &[U256],
    min_mint_amount: U256,
    receiver: Address,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IMetaZap2::add_liquidityCall { pool, deposit_amounts: a, min_mint_amount, receiver },
        3 => |a| IMetaZap3::add_liquidityCall { pool, deposit_amounts: a, min_mint_amount, receiver },
        4 => |a| IMetaZap4::add_liquidityCall { pool, deposit_amounts: a, min_mint_amount, receiver },
    })
}

pub fn zap_remove_liquidity(
    n_coins: usize,
    pool: Address,
    burn_amount: U256,
    min_amounts: &[U256],
    receiver: Address,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, min_amounts, {
        2 => |m| IMetaZap2::remove_liquidityCall { pool, burn_amount, min_amounts: m, receiver },
        3 => |m| IMetaZap3::remove_liquidityCall { pool, burn_amount, min_amounts: m, receiver },
        4 => |m| IMetaZap4::remove_liquidityCall { pool, burn_amount, min_amounts: m, receiver },
    })
}

pub fn zap_remove_liquidity_imbalance(
    n_coins: usize,
    pool: Address,
    amounts: &[U256],
    max_burn_amount: U256,
    receiver: Address,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IMetaZap2::remove_liquidity_imbalanceCall { pool, amounts: a, max_burn_amount, receiver },
        3 => |a| IMetaZap3::remove_liquidity_imbalanceCall { pool, amounts: a, max_burn_amount, receiver },
        4 => |a| IMetaZap4::remove_liquidity_imbalanceCall { pool, amounts: a, max_burn_amount, receiver },
    })
}

pub fn zap_calc_token_amount(
    n_coins: usize,
    pool: Address,
    amounts: &[U256],
    is_deposit: bool,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| IMetaZap2::calc_token_amountCall { pool, amounts: a, is_deposit },
        3 => |a| IMetaZap3::calc_token_amountCall { pool, amounts: a, is_deposit },
        4 => |a| IMetaZap4::calc_token_amountCall { pool, amounts: a, is_deposit },
    })
}

pub fn crypto_add_liquidity(
    n_coins: usize,
    amounts: &[U256],
    min_mint_amount: U256,
    use_eth: bool,
    receiver: Address,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| ICryptoSwap2::add_liquidityCall { amounts: a, min_mint_amount, use_eth, receiver },
        3 => |a| ICryptoSwap3::add_liquidityCall { amounts: a, min_mint_amount, use_eth, receiver },
    })
}

pub fn crypto_remove_liquidity(
    n_coins: usize,
    amount: U256,
    min_amounts: &[U256],
    use_eth: bool,
    receiver: Address,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, min_amounts, {
        2 => |m| ICryptoSwap2::remove_liquidityCall { amount, min_amounts: m, use_eth, receiver },
        3 => |m| ICryptoSwap3::remove_liquidityCall { amount, min_amounts: m, use_eth, receiver },
    })
}

pub fn crypto_calc_token_amount(
    n_coins: usize,
    amounts: &[U256],
    deposit: bool,
) -> Result<Bytes, AdapterError> {
    encode_fixed!(n_coins, amounts, {
        2 => |a| ICryptoSwap2::calc_token_amountCall { amounts: a, deposit },
        3 => |a| ICryptoSwap3::calc_token_amountCall { amounts: a, deposit },
    })
}
