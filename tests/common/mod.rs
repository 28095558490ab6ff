//! In-memory chain used by the integration tests.
//!
//! `MockChain` models just enough of Curve to exercise the adapter: ERC20
//! tokens, stableswap and cryptoswap pools with a flat 0.1% fee, a deposit zap
//! for meta-pools, gauges, the CRV minter and the meta registry. Every
//! `execute` is atomic, and checkpoints behave like anvil snapshots.

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolType, sol_data};
use async_trait::async_trait;
use curve_adapter::constants::{CRV_MINTER, CURVE_META_REGISTRY, WETH_ADDRESS};
use curve_adapter::interfaces::*;
use curve_adapter::{
    AddLiquidityParams, Adapter, AdapterConfig, AdapterError, AdapterFlavor, CallContext, Chain,
    Checkpoint, ExchangeParams, RemoveLiquidityImbalanceParams, RemoveLiquidityOneCoinParams,
    RemoveLiquidityParams,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const OWNER: Address = Address::repeat_byte(0x0a);
pub const ADAPTER: Address = Address::repeat_byte(0xad);
pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);
const LIQUIDITY_PROVIDER: Address = Address::repeat_byte(0xfe);

pub const SEED_RESERVE: u64 = 1_000_000;

pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// Output of every swap-like operation: 0.1% fee, 1:1 otherwise.
pub fn quote(dx: U256) -> U256 {
    dx - dx / U256::from(1000u64)
}

/// LP burned for an imbalanced withdrawal of `total` coins.
pub fn burn_for(total: U256) -> U256 {
    total + total / U256::from(1000u64)
}

pub fn ctx(caller: Address) -> CallContext {
    CallContext::new(caller)
}

fn revert<T>(reason: &str) -> Result<T, AdapterError> {
    Err(AdapterError::Reverted(reason.to_string()))
}

fn decode<T: SolCall>(input: &[u8]) -> Option<T> {
    T::abi_decode(input).ok()
}

fn word_uint(value: U256) -> Bytes {
    Bytes::from(<sol_data::Uint<256> as SolType>::abi_encode(&value))
}

fn word_address(value: Address) -> Bytes {
    Bytes::from(<sol_data::Address as SolType>::abi_encode(&value))
}

fn word_bool(value: bool) -> Bytes {
    Bytes::from(<sol_data::Bool as SolType>::abi_encode(&value))
}

fn index(i: i128) -> usize {
    usize::try_from(i).unwrap_or(usize::MAX)
}

fn sum(values: &[U256]) -> U256 {
    values.iter().fold(U256::ZERO, |acc, v| acc + *v)
}

#[derive(Debug, Clone, Default)]
struct Erc20 {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolKind {
    Stable,
    Crypto,
}

#[derive(Debug, Clone)]
struct Pool {
    kind: PoolKind,
    coins: Vec<Address>,
    lp_token: Address,
}

#[derive(Debug, Clone, Default)]
struct Gauge {
    lp_token: Address,
    stakes: HashMap<Address, U256>,
    pending: HashMap<Address, U256>,
}

#[derive(Debug, Clone, Copy)]
struct RegistryEntry {
    n_coins: usize,
    gauge: Address,
    lp_token: Address,
    is_meta: bool,
}

#[derive(Debug, Clone, Default)]
struct World {
    tokens: HashMap<Address, Erc20>,
    native: HashMap<Address, U256>,
    pools: HashMap<Address, Pool>,
    zaps: HashSet<Address>,
    gauges: HashMap<Address, Gauge>,
    registry: HashMap<Address, RegistryEntry>,
    /// Pools the meta registry reverts `is_meta` for.
    untyped: HashSet<Address>,
    /// (account, minting user) pairs allowed to mint on the account's behalf.
    mint_approvals: HashSet<(Address, Address)>,
    crv: Address,
    next_address: u64,
}

impl World {
    fn alloc(&mut self) -> Address {
        self.next_address += 1;
        Address::left_padding_from(&(0x1000 + self.next_address).to_be_bytes())
    }

    fn deploy_token(&mut self) -> Address {
        let token = self.alloc();
        self.tokens.insert(token, Erc20::default());
        token
    }

    fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.tokens
            .get(&token)
            .and_then(|t| t.balances.get(&account).copied())
            .unwrap_or_default()
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut Erc20, AdapterError> {
        match self.tokens.get_mut(&token) {
            Some(t) => Ok(t),
            None => revert("not a token"),
        }
    }

    fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), AdapterError> {
        let t = self.token_mut(token)?;
        *t.balances.entry(to).or_default() += amount;
        t.total_supply += amount;
        Ok(())
    }

    fn burn(&mut self, token: Address, from: Address, amount: U256) -> Result<(), AdapterError> {
        let t = self.token_mut(token)?;
        let balance = t.balances.entry(from).or_default();
        if *balance < amount {
            return revert("burn amount exceeds balance");
        }
        *balance -= amount;
        t.total_supply -= amount;
        Ok(())
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), AdapterError> {
        let t = self.token_mut(token)?;
        let balance = t.balances.entry(from).or_default();
        if *balance < amount {
            return revert("transfer amount exceeds balance");
        }
        *balance -= amount;
        *t.balances.entry(to).or_default() += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), AdapterError> {
        let t = self.token_mut(token)?;
        let allowance = t.allowances.entry((from, spender)).or_default();
        if *allowance < amount {
            return revert("transfer amount exceeds allowance");
        }
        *allowance -= amount;
        self.transfer(token, from, to, amount)
    }

    fn move_native(&mut self, from: Address, to: Address, amount: U256) -> Result<(), AdapterError> {
        let balance = self.native.entry(from).or_default();
        if *balance < amount {
            return revert("insufficient native balance");
        }
        *balance -= amount;
        *self.native.entry(to).or_default() += amount;
        Ok(())
    }

    fn dispatch(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        input: &[u8],
    ) -> Result<Bytes, AdapterError> {
        if !value.is_zero() {
            self.move_native(from, to, value)?;
        }
        if input.is_empty() {
            return Ok(Bytes::new());
        }
        if to == CURVE_META_REGISTRY {
            return self.registry_call(input);
        }
        if to == CRV_MINTER {
            return self.minter_call(from, input);
        }
        if self.tokens.contains_key(&to) {
            return self.token_call(from, to, input);
        }
        if let Some(pool) = self.pools.get(&to).cloned() {
            return match pool.kind {
                PoolKind::Stable => self.stable_call(from, to, &pool, input),
                PoolKind::Crypto => self.crypto_call(from, to, &pool, value, input),
            };
        }
        if self.zaps.contains(&to) {
            return self.zap_call(from, to, input);
        }
        if self.gauges.contains_key(&to) {
            return self.gauge_call(from, to, input);
        }
        revert("call to non-contract")
    }

    fn registry_call(&mut self, input: &[u8]) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<IMetaRegistry::is_registeredCall>(input) {
            return Ok(word_bool(self.registry.contains_key(&c.pool)));
        }
        let entry = |pool: Address| self.registry.get(&pool).copied();
        if let Some(c) = decode::<IMetaRegistry::get_n_coinsCall>(input) {
            let n = entry(c.pool).map_or(0, |e| e.n_coins);
            return Ok(word_uint(U256::from(n)));
        }
        if let Some(c) = decode::<IMetaRegistry::get_gaugeCall>(input) {
            return Ok(word_address(entry(c.pool).map_or(Address::ZERO, |e| e.gauge)));
        }
        if let Some(c) = decode::<IMetaRegistry::get_lp_tokenCall>(input) {
            return Ok(word_address(entry(c.pool).map_or(Address::ZERO, |e| e.lp_token)));
        }
        if let Some(c) = decode::<IMetaRegistry::is_metaCall>(input) {
            if self.untyped.contains(&c.pool) {
                return revert("is_meta not supported");
            }
            return Ok(word_bool(entry(c.pool).is_some_and(|e| e.is_meta)));
        }
        revert("unknown registry selector")
    }

    fn token_call(&mut self, sender: Address, token: Address, input: &[u8]) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<IERC20::balanceOfCall>(input) {
            return Ok(word_uint(self.balance_of(token, c.owner)));
        }
        if let Some(c) = decode::<IERC20::allowanceCall>(input) {
            let t = self.token_mut(token)?;
            let allowance = t.allowances.get(&(c.owner, c.spender)).copied().unwrap_or_default();
            return Ok(word_uint(allowance));
        }
        if decode::<IERC20::totalSupplyCall>(input).is_some() {
            return Ok(word_uint(self.token_mut(token)?.total_supply));
        }
        if let Some(c) = decode::<IERC20::approveCall>(input) {
            self.token_mut(token)?
                .allowances
                .insert((sender, c.spender), c.amount);
            return Ok(Bytes::new());
        }
        if let Some(c) = decode::<IERC20::transferCall>(input) {
            self.transfer(token, sender, c.to, c.amount)?;
            return Ok(Bytes::new());
        }
        if let Some(c) = decode::<IERC20::transferFromCall>(input) {
            self.transfer_from(token, sender, c.from, c.to, c.amount)?;
            return Ok(Bytes::new());
        }
        revert("unknown token selector")
    }

    fn coin(pool: &Pool, i: usize) -> Result<Address, AdapterError> {
        match pool.coins.get(i) {
            Some(coin) => Ok(*coin),
            None => revert("coin index out of range"),
        }
    }

    fn check_width(pool: &Pool, len: usize) -> Result<(), AdapterError> {
        if pool.coins.len() != len {
            return revert("function not found");
        }
        Ok(())
    }

    fn swap_out(pool: &Pool, i: usize, j: usize, dx: U256) -> Result<U256, AdapterError> {
        Self::coin(pool, i)?;
        Self::coin(pool, j)?;
        if i == j {
            return revert("same coin");
        }
        Ok(quote(dx))
    }

    fn proportional(&self, address: Address, pool: &Pool, amount: U256) -> Result<Vec<U256>, AdapterError> {
        let supply = self.tokens.get(&pool.lp_token).map(|t| t.total_supply).unwrap_or_default();
        if supply.is_zero() || amount > supply {
            return revert("not enough liquidity");
        }
        Ok(pool
            .coins
            .iter()
            .map(|coin| self.balance_of(*coin, address) * amount / supply)
            .collect())
    }

    fn check_min(amount: U256, min: U256) -> Result<(), AdapterError> {
        if amount < min {
            return revert("Exchange resulted in fewer coins than expected");
        }
        Ok(())
    }

    /// Pays `amount` of `coin` out of the pool; wrapped native leaves as native.
    fn pay(
        &mut self,
        address: Address,
        coin: Address,
        to: Address,
        amount: U256,
        as_native: bool,
    ) -> Result<(), AdapterError> {
        if as_native && coin == WETH_ADDRESS {
            self.burn(WETH_ADDRESS, address, amount)?;
            *self.native.entry(to).or_default() += amount;
            Ok(())
        } else {
            self.transfer(coin, address, to, amount)
        }
    }

    /// Takes `amount` of `coin` into the pool, either as attached native value
    /// (wrapped on arrival) or through an allowance.
    fn take(
        &mut self,
        address: Address,
        coin: Address,
        sender: Address,
        amount: U256,
        use_eth: bool,
        value: U256,
    ) -> Result<(), AdapterError> {
        if use_eth && coin == WETH_ADDRESS {
            if value != amount {
                return revert("wrong native value");
            }
            let held = self.native.entry(address).or_default();
            *held -= amount;
            self.mint(WETH_ADDRESS, address, amount)
        } else {
            self.transfer_from(coin, address, sender, address, amount)
        }
    }

    fn stable_call(
        &mut self,
        sender: Address,
        address: Address,
        pool: &Pool,
        input: &[u8],
    ) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<IStableSwap::coinsCall>(input) {
            return Ok(word_address(Self::coin(pool, c.i.saturating_to())?));
        }
        if let Some(c) = decode::<IStableSwap::get_dyCall>(input) {
            return Ok(word_uint(Self::swap_out(pool, index(c.i), index(c.j), c.dx)?));
        }
        if let Some(c) = decode::<IStableSwap::exchangeCall>(input) {
            let (i, j) = (index(c.i), index(c.j));
            let out = Self::swap_out(pool, i, j, c.dx)?;
            Self::check_min(out, c.min_dy)?;
            self.transfer_from(pool.coins[i], address, sender, address, c.dx)?;
            self.transfer(pool.coins[j], address, sender, out)?;
            return Ok(Bytes::new());
        }
        if let Some(c) = decode::<IStableSwap::calc_withdraw_one_coinCall>(input) {
            Self::coin(pool, index(c.i))?;
            return Ok(word_uint(quote(c.token_amount)));
        }
        if let Some(c) = decode::<IStableSwap::remove_liquidity_one_coinCall>(input) {
            let coin = Self::coin(pool, index(c.i))?;
            let out = quote(c.token_amount);
            Self::check_min(out, c.min_amount)?;
            self.burn(pool.lp_token, sender, c.token_amount)?;
            self.transfer(coin, address, sender, out)?;
            return Ok(Bytes::new());
        }

        macro_rules! sized {
            ($($iface:ident),+) => {$(
                if let Some(c) = decode::<$iface::add_liquidityCall>(input) {
                    let minted = self.deposit(address, pool, sender, &c.amounts, false, U256::ZERO)?;
                    Self::check_min(minted, c.min_mint_amount)?;
                    self.mint(pool.lp_token, sender, minted)?;
                    return Ok(Bytes::new());
                }
                if let Some(c) = decode::<$iface::remove_liquidityCall>(input) {
                    self.withdraw(address, pool, sender, sender, c.amount, &c.min_amounts, false)?;
                    return Ok(Bytes::new());
                }
                if let Some(c) = decode::<$iface::remove_liquidity_imbalanceCall>(input) {
                    self.withdraw_imbalance(address, pool, sender, sender, &c.amounts, c.max_burn_amount)?;
                    return Ok(Bytes::new());
                }
                if let Some(c) = decode::<$iface::calc_token_amountCall>(input) {
                    Self::check_width(pool, c.amounts.len())?;
                    return Ok(word_uint(calc_token_amount(&c.amounts, c.is_deposit)));
                }
            )+};
        }
        sized!(IStableSwap2, IStableSwap3, IStableSwap4);
        revert("unknown stableswap selector")
    }

    fn crypto_call(
        &mut self,
        sender: Address,
        address: Address,
        pool: &Pool,
        value: U256,
        input: &[u8],
    ) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<ICryptoSwap::coinsCall>(input) {
            return Ok(word_address(Self::coin(pool, c.i.saturating_to())?));
        }
        if let Some(c) = decode::<ICryptoSwap::get_dyCall>(input) {
            let out = Self::swap_out(pool, c.i.saturating_to(), c.j.saturating_to(), c.dx)?;
            return Ok(word_uint(out));
        }
        if let Some(c) = decode::<ICryptoSwap::exchangeCall>(input) {
            let (i, j) = (c.i.saturating_to::<usize>(), c.j.saturating_to::<usize>());
            let out = Self::swap_out(pool, i, j, c.dx)?;
            Self::check_min(out, c.min_dy)?;
            let pays_native = c.use_eth && pool.coins[i] == WETH_ADDRESS;
            if !pays_native && !value.is_zero() {
                return revert("unexpected native value");
            }
            self.take(address, pool.coins[i], sender, c.dx, c.use_eth, value)?;
            self.pay(address, pool.coins[j], c.receiver, out, c.use_eth)?;
            return Ok(word_uint(out));
        }
        if let Some(c) = decode::<ICryptoSwap::calc_withdraw_one_coinCall>(input) {
            Self::coin(pool, c.i.saturating_to())?;
            return Ok(word_uint(quote(c.token_amount)));
        }
        if let Some(c) = decode::<ICryptoSwap::remove_liquidity_one_coinCall>(input) {
            let coin = Self::coin(pool, c.i.saturating_to())?;
            let out = quote(c.token_amount);
            Self::check_min(out, c.min_amount)?;
            self.burn(pool.lp_token, sender, c.token_amount)?;
            self.pay(address, coin, c.receiver, out, c.use_eth)?;
            return Ok(word_uint(out));
        }

        macro_rules! sized {
            ($($iface:ident),+) => {$(
                if let Some(c) = decode::<$iface::add_liquidityCall>(input) {
                    let minted = self.deposit(address, pool, sender, &c.amounts, c.use_eth, value)?;
                    Self::check_min(minted, c.min_mint_amount)?;
                    self.mint(pool.lp_token, c.receiver, minted)?;
                    return Ok(word_uint(minted));
                }
                if let Some(c) = decode::<$iface::remove_liquidityCall>(input) {
                    self.withdraw(address, pool, sender, c.receiver, c.amount, &c.min_amounts, c.use_eth)?;
                    return Ok(Bytes::new());
                }
                if let Some(c) = decode::<$iface::calc_token_amountCall>(input) {
                    Self::check_width(pool, c.amounts.len())?;
                    return Ok(word_uint(calc_token_amount(&c.amounts, c.deposit)));
                }
            )+};
        }
        sized!(ICryptoSwap2, ICryptoSwap3);
        revert("unknown cryptoswap selector")
    }

    /// Pulls every deposited coin from `payer` (allowance granted to the pool)
    /// and returns the LP amount to mint.
    fn deposit(
        &mut self,
        address: Address,
        pool: &Pool,
        payer: Address,
        amounts: &[U256],
        use_eth: bool,
        value: U256,
    ) -> Result<U256, AdapterError> {
        Self::check_width(pool, amounts.len())?;
        let native_value = pool
            .coins
            .iter()
            .zip(amounts)
            .filter(|(coin, _)| use_eth && **coin == WETH_ADDRESS)
            .fold(U256::ZERO, |acc, (_, amount)| acc + *amount);
        if native_value != value {
            return revert("wrong native value");
        }
        for (coin, amount) in pool.coins.iter().zip(amounts) {
            if amount.is_zero() {
                continue;
            }
            self.take(address, *coin, payer, *amount, use_eth, *amount)?;
        }
        Ok(sum(amounts))
    }

    #[allow(clippy::too_many_arguments)]
    fn withdraw(
        &mut self,
        address: Address,
        pool: &Pool,
        burner: Address,
        receiver: Address,
        amount: U256,
        min_amounts: &[U256],
        use_eth: bool,
    ) -> Result<(), AdapterError> {
        Self::check_width(pool, min_amounts.len())?;
        let outs = self.proportional(address, pool, amount)?;
        for (out, min) in outs.iter().zip(min_amounts) {
            if out < min {
                return revert("Withdrawal resulted in fewer coins than expected");
            }
        }
        self.burn(pool.lp_token, burner, amount)?;
        for (coin, out) in pool.coins.iter().zip(outs) {
            self.pay(address, *coin, receiver, out, use_eth)?;
        }
        Ok(())
    }

    fn withdraw_imbalance(
        &mut self,
        address: Address,
        pool: &Pool,
        burner: Address,
        receiver: Address,
        amounts: &[U256],
        max_burn_amount: U256,
    ) -> Result<U256, AdapterError> {
        Self::check_width(pool, amounts.len())?;
        let burned = burn_for(sum(amounts));
        if burned > max_burn_amount {
            return revert("Slippage screwed you");
        }
        self.burn(pool.lp_token, burner, burned)?;
        for (coin, amount) in pool.coins.iter().zip(amounts) {
            self.transfer(*coin, address, receiver, *amount)?;
        }
        Ok(burned)
    }

    fn meta_pool(&self, address: Address) -> Result<Pool, AdapterError> {
        match self.pools.get(&address) {
            Some(pool) if pool.kind == PoolKind::Stable => Ok(pool.clone()),
            _ => revert("zap: unknown pool"),
        }
    }

    fn zap_call(&mut self, sender: Address, zap: Address, input: &[u8]) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<IMetaZap::get_dy_underlyingCall>(input) {
            let pool = self.meta_pool(c.pool)?;
            return Ok(word_uint(Self::swap_out(&pool, index(c.i), index(c.j), c.dx)?));
        }
        if let Some(c) = decode::<IMetaZap::exchange_underlyingCall>(input) {
            let pool = self.meta_pool(c.pool)?;
            let (i, j) = (index(c.i), index(c.j));
            let out = Self::swap_out(&pool, i, j, c.dx)?;
            Self::check_min(out, c.min_dy)?;
            self.transfer_from(pool.coins[i], zap, sender, c.pool, c.dx)?;
            self.transfer(pool.coins[j], c.pool, c.receiver, out)?;
            return Ok(word_uint(out));
        }
        if let Some(c) = decode::<IMetaZap::calc_withdraw_one_coinCall>(input) {
            let pool = self.meta_pool(c.pool)?;
            Self::coin(&pool, index(c.i))?;
            return Ok(word_uint(quote(c.token_amount)));
        }
        if let Some(c) = decode::<IMetaZap::remove_liquidity_one_coinCall>(input) {
            let pool = self.meta_pool(c.pool)?;
            let coin = Self::coin(&pool, index(c.i))?;
            let out = quote(c.burn_amount);
            Self::check_min(out, c.min_amount)?;
            self.transfer_from(pool.lp_token, zap, sender, zap, c.burn_amount)?;
            self.burn(pool.lp_token, zap, c.burn_amount)?;
            self.transfer(coin, c.pool, c.receiver, out)?;
            return Ok(word_uint(out));
        }

        macro_rules! sized {
            ($($iface:ident),+) => {$(
                if let Some(c) = decode::<$iface::add_liquidityCall>(input) {
                    let pool = self.meta_pool(c.pool)?;
                    Self::check_width(&pool, c.deposit_amounts.len())?;
                    for (coin, amount) in pool.coins.iter().zip(&c.deposit_amounts) {
                        self.transfer_from(*coin, zap, sender, c.pool, *amount)?;
                    }
                    let minted = sum(&c.deposit_amounts);
                    Self::check_min(minted, c.min_mint_amount)?;
                    self.mint(pool.lp_token, c.receiver, minted)?;
                    return Ok(word_uint(minted));
                }
                if let Some(c) = decode::<$iface::remove_liquidityCall>(input) {
                    let pool = self.meta_pool(c.pool)?;
                    self.transfer_from(pool.lp_token, zap, sender, zap, c.burn_amount)?;
                    self.withdraw(c.pool, &pool, zap, c.receiver, c.burn_amount, &c.min_amounts, false)?;
                    return Ok(Bytes::new());
                }
                if let Some(c) = decode::<$iface::remove_liquidity_imbalanceCall>(input) {
                    let pool = self.meta_pool(c.pool)?;
                    self.transfer_from(pool.lp_token, zap, sender, zap, c.max_burn_amount)?;
                    let burned = self.withdraw_imbalance(c.pool, &pool, zap, c.receiver, &c.amounts, c.max_burn_amount)?;
                    self.transfer(pool.lp_token, zap, sender, c.max_burn_amount - burned)?;
                    return Ok(word_uint(burned));
                }
                if let Some(c) = decode::<$iface::calc_token_amountCall>(input) {
                    let pool = self.meta_pool(c.pool)?;
                    Self::check_width(&pool, c.amounts.len())?;
                    return Ok(word_uint(calc_token_amount(&c.amounts, c.is_deposit)));
                }
            )+};
        }
        sized!(IMetaZap2, IMetaZap3, IMetaZap4);
        revert("unknown zap selector")
    }

    fn gauge_call(&mut self, sender: Address, gauge: Address, input: &[u8]) -> Result<Bytes, AdapterError> {
        if let Some(c) = decode::<ILiquidityGauge::balanceOfCall>(input) {
            let stake = self.gauges[&gauge].stakes.get(&c.account).copied().unwrap_or_default();
            return Ok(word_uint(stake));
        }
        if let Some(c) = decode::<ILiquidityGauge::depositCall>(input) {
            let lp_token = self.gauges[&gauge].lp_token;
            self.transfer_from(lp_token, gauge, sender, gauge, c.value)?;
            if let Some(g) = self.gauges.get_mut(&gauge) {
                *g.stakes.entry(c.addr).or_default() += c.value;
            }
            return Ok(Bytes::new());
        }
        revert("unknown gauge selector")
    }

    fn minter_call(&mut self, sender: Address, input: &[u8]) -> Result<Bytes, AdapterError> {
        if decode::<IMinter::tokenCall>(input).is_some() {
            return Ok(word_address(self.crv));
        }
        if let Some(c) = decode::<IMinter::toggle_approve_mintCall>(input) {
            let key = (sender, c.minting_user);
            if !self.mint_approvals.remove(&key) {
                self.mint_approvals.insert(key);
            }
            return Ok(Bytes::new());
        }
        if let Some(c) = decode::<IMinter::mint_forCall>(input) {
            if sender != c.account && !self.mint_approvals.contains(&(c.account, sender)) {
                return revert("minting not approved");
            }
            let Some(gauge) = self.gauges.get_mut(&c.gauge) else {
                return revert("gauge is not added");
            };
            let pending = gauge.pending.remove(&c.account).unwrap_or_default();
            let crv = self.crv;
            self.mint(crv, c.account, pending)?;
            return Ok(Bytes::new());
        }
        revert("unknown minter selector")
    }
}

fn calc_token_amount(amounts: &[U256], is_deposit: bool) -> U256 {
    if is_deposit {
        sum(amounts)
    } else {
        burn_for(sum(amounts))
    }
}

/// A state-changing call the adapter issued, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub selector: Option<[u8; 4]>,
}

/// Addresses of a pool deployed on the mock chain.
#[derive(Debug, Clone)]
pub struct PoolFixture {
    pub pool: Address,
    pub coins: Vec<Address>,
    pub lp_token: Address,
    pub gauge: Address,
    pub zapper: Option<Address>,
}

#[derive(Default)]
pub struct MockChain {
    world: Mutex<World>,
    snapshots: Mutex<Vec<World>>,
    calls: Mutex<Vec<CallRecord>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        let mut world = World::default();
        world.tokens.insert(WETH_ADDRESS, Erc20::default());
        world.crv = world.deploy_token();
        Arc::new(Self {
            world: Mutex::new(world),
            ..Default::default()
        })
    }

    fn with_world<T>(&self, f: impl FnOnce(&mut World) -> T) -> T {
        let mut world = self.world.lock().unwrap();
        f(&mut world)
    }

    pub fn deploy_token(&self) -> Address {
        self.with_world(|w| w.deploy_token())
    }

    pub fn crv(&self) -> Address {
        self.with_world(|w| w.crv)
    }

    pub fn mint(&self, token: Address, to: Address, amount: U256) {
        self.with_world(|w| w.mint(token, to, amount)).unwrap();
    }

    pub fn balance(&self, token: Address, account: Address) -> U256 {
        self.with_world(|w| w.balance_of(token, account))
    }

    pub fn set_native(&self, account: Address, amount: U256) {
        self.with_world(|w| w.native.insert(account, amount));
    }

    pub fn native(&self, account: Address) -> U256 {
        self.with_world(|w| w.native.get(&account).copied().unwrap_or_default())
    }

    /// `owner` approves `spender` for `amount` of `token`.
    pub fn approve(&self, owner: Address, token: Address, spender: Address, amount: U256) {
        self.with_world(|w| {
            w.token_mut(token)
                .unwrap()
                .allowances
                .insert((owner, spender), amount)
        });
    }

    /// Mints `amount` of `token` to `user` and lets the adapter spend it.
    pub fn fund(&self, user: Address, token: Address, amount: U256) {
        self.mint(token, user, amount);
        self.approve(user, token, ADAPTER, amount);
    }

    pub fn stake(&self, gauge: Address, account: Address) -> U256 {
        self.with_world(|w| w.gauges[&gauge].stakes.get(&account).copied().unwrap_or_default())
    }

    pub fn accrue_crv(&self, gauge: Address, account: Address, amount: U256) {
        self.with_world(|w| {
            *w.gauges
                .get_mut(&gauge)
                .unwrap()
                .pending
                .entry(account)
                .or_default() += amount
        });
    }

    /// `account` lets `minting_user` mint CRV on its behalf.
    pub fn approve_mint(&self, account: Address, minting_user: Address) {
        self.with_world(|w| w.mint_approvals.insert((account, minting_user)));
    }

    /// Lists a pool in the meta registry without deploying anything.
    pub fn list_in_registry(&self, pool: Address, n_coins: usize, is_meta: bool) {
        self.with_world(|w| {
            w.registry.insert(
                pool,
                RegistryEntry {
                    n_coins,
                    gauge: Address::ZERO,
                    lp_token: Address::ZERO,
                    is_meta,
                },
            )
        });
    }

    /// Makes the meta registry revert `is_meta` for `pool`.
    pub fn revert_is_meta(&self, pool: Address) {
        self.with_world(|w| w.untyped.insert(pool));
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    fn deploy_pool(&self, kind: PoolKind, coins: Vec<Address>, is_meta: bool, with_gauge: bool) -> PoolFixture {
        self.with_world(|w| {
            let pool = w.alloc();
            let lp_token = w.deploy_token();
            let gauge = if with_gauge {
                let gauge = w.alloc();
                w.gauges.insert(
                    gauge,
                    Gauge {
                        lp_token,
                        ..Default::default()
                    },
                );
                gauge
            } else {
                Address::ZERO
            };
            let zapper = is_meta.then(|| {
                let zap = w.alloc();
                w.zaps.insert(zap);
                zap
            });

            for coin in &coins {
                w.mint(*coin, pool, units(SEED_RESERVE)).unwrap();
            }
            w.mint(lp_token, LIQUIDITY_PROVIDER, units(SEED_RESERVE) * U256::from(coins.len()))
                .unwrap();

            w.pools.insert(
                pool,
                Pool {
                    kind,
                    coins: coins.clone(),
                    lp_token,
                },
            );
            w.registry.insert(
                pool,
                RegistryEntry {
                    n_coins: coins.len(),
                    gauge,
                    lp_token,
                    is_meta,
                },
            );
            PoolFixture {
                pool,
                coins,
                lp_token,
                gauge,
                zapper,
            }
        })
    }

    pub fn add_stable_pool(&self, n_coins: usize) -> PoolFixture {
        let coins = (0..n_coins).map(|_| self.deploy_token()).collect();
        self.deploy_pool(PoolKind::Stable, coins, false, true)
    }

    pub fn add_meta_pool(&self, n_coins: usize) -> PoolFixture {
        let coins = (0..n_coins).map(|_| self.deploy_token()).collect();
        self.deploy_pool(PoolKind::Stable, coins, true, true)
    }

    /// Cryptoswap pool whose last coin is WETH when `with_weth` is set.
    pub fn add_crypto_pool(&self, n_coins: usize, with_weth: bool) -> PoolFixture {
        let mut coins: Vec<Address> = (0..n_coins).map(|_| self.deploy_token()).collect();
        if with_weth {
            if let Some(last) = coins.last_mut() {
                *last = WETH_ADDRESS;
            }
        }
        self.deploy_pool(PoolKind::Crypto, coins, false, true)
    }

    pub fn add_pool_without_gauge(&self, n_coins: usize) -> PoolFixture {
        let coins = (0..n_coins).map(|_| self.deploy_token()).collect();
        self.deploy_pool(PoolKind::Stable, coins, false, false)
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn view(&self, to: Address, input: Bytes) -> Result<Bytes, AdapterError> {
        let mut scratch = self.world.lock().unwrap().clone();
        scratch.dispatch(Address::ZERO, to, U256::ZERO, &input)
    }

    async fn execute(
        &self,
        from: Address,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> Result<Bytes, AdapterError> {
        self.calls.lock().unwrap().push(CallRecord {
            from,
            to,
            value,
            selector: input.get(..4).map(|s| [s[0], s[1], s[2], s[3]]),
        });
        let mut world = self.world.lock().unwrap();
        let mut next = world.clone();
        let output = next.dispatch(from, to, value, &input)?;
        *world = next;
        Ok(output)
    }

    async fn native_balance(&self, account: Address) -> Result<U256, AdapterError> {
        Ok(self.native(account))
    }

    async fn checkpoint(&self) -> Result<Checkpoint, AdapterError> {
        let world = self.world.lock().unwrap().clone();
        let mut snapshots = self.snapshots.lock().unwrap();
        snapshots.push(world);
        Ok(Checkpoint(U256::from(snapshots.len() - 1)))
    }

    async fn rollback(&self, checkpoint: Checkpoint) -> Result<(), AdapterError> {
        let id = checkpoint.0.saturating_to::<usize>();
        let mut snapshots = self.snapshots.lock().unwrap();
        if id >= snapshots.len() {
            return Err(AdapterError::ProviderError(format!("unknown snapshot {id}")));
        }
        let saved = snapshots.swap_remove(id);
        snapshots.truncate(id);
        *self.world.lock().unwrap() = saved;
        Ok(())
    }

    async fn release(&self, checkpoint: Checkpoint) -> Result<(), AdapterError> {
        let id = checkpoint.0.saturating_to::<usize>();
        let mut snapshots = self.snapshots.lock().unwrap();
        if id >= snapshots.len() {
            return Err(AdapterError::ProviderError(format!("unknown snapshot {id}")));
        }
        snapshots.truncate(id);
        Ok(())
    }
}

pub fn stableswap_adapter(chain: &Arc<MockChain>) -> Adapter<MockChain> {
    Adapter::new(
        AdapterConfig::mainnet(AdapterFlavor::Stableswap, ADAPTER, OWNER),
        chain.clone(),
    )
}

pub fn cryptoswap_adapter(chain: &Arc<MockChain>) -> Adapter<MockChain> {
    Adapter::new(
        AdapterConfig::mainnet(AdapterFlavor::Cryptoswap, ADAPTER, OWNER),
        chain.clone(),
    )
}

/// Registers `fixture` on `adapter` as the owner.
pub async fn register(adapter: &mut Adapter<MockChain>, fixture: &PoolFixture) {
    adapter
        .register_pool(ctx(OWNER), fixture.pool, fixture.zapper)
        .await
        .unwrap();
}

/// Runs every routing entry point of `adapter` against `pool` as ALICE and
/// returns each outcome by operation name.
pub async fn route_everything(
    adapter: &mut Adapter<MockChain>,
    pool: Address,
    n_coins: usize,
) -> Vec<(&'static str, Result<(), AdapterError>)> {
    let amounts = vec![units(1); n_coins];
    let lp = units(1);
    vec![
        (
            "exchange",
            adapter
                .exchange(
                    ctx(ALICE),
                    ExchangeParams {
                        pool,
                        index_in: 0,
                        index_out: 1,
                        amount_in: units(1),
                        min_amount_out: U256::ZERO,
                        use_native: false,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "get_exchange_amount_out",
            adapter
                .get_exchange_amount_out(pool, 0, 1, units(1))
                .await
                .map(drop),
        ),
        (
            "add_liquidity",
            adapter
                .add_liquidity(
                    ctx(ALICE),
                    AddLiquidityParams {
                        pool,
                        amounts: amounts.clone(),
                        min_mint_amount: U256::ZERO,
                        use_native: false,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "add_liquidity_empty",
            adapter
                .add_liquidity(
                    ctx(ALICE),
                    AddLiquidityParams {
                        pool,
                        amounts: Vec::new(),
                        min_mint_amount: U256::ZERO,
                        use_native: false,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "get_lp_amount_after_deposit",
            adapter
                .get_lp_amount_after_deposit(pool, &amounts)
                .await
                .map(drop),
        ),
        (
            "get_lp_amount_after_withdraw",
            adapter
                .get_lp_amount_after_withdraw(pool, &amounts)
                .await
                .map(drop),
        ),
        (
            "remove_liquidity",
            adapter
                .remove_liquidity(
                    ctx(ALICE),
                    RemoveLiquidityParams {
                        pool,
                        lp_amount: lp,
                        min_amounts: vec![U256::ZERO; n_coins],
                        use_native: false,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "remove_liquidity_imbalance",
            adapter
                .remove_liquidity_imbalance(
                    ctx(ALICE),
                    RemoveLiquidityImbalanceParams {
                        pool,
                        amounts: amounts.clone(),
                        max_burn_amount: lp,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "remove_liquidity_one_coin",
            adapter
                .remove_liquidity_one_coin(
                    ctx(ALICE),
                    RemoveLiquidityOneCoinParams {
                        pool,
                        coin_index: 0,
                        lp_amount: lp,
                        min_amount: U256::ZERO,
                        use_native: false,
                    },
                )
                .await
                .map(drop),
        ),
        (
            "get_lp_amount_after_remove_one_coin",
            adapter
                .get_lp_amount_after_remove_one_coin(pool, 0, lp)
                .await
                .map(drop),
        ),
        (
            "deposit_lp_for_crv",
            adapter
                .deposit_lp_for_crv(ctx(ALICE), pool, lp)
                .await
                .map(drop),
        ),
        (
            "claim_crv_rewards",
            adapter.claim_crv_rewards(ctx(ALICE), pool).await.map(drop),
        ),
    ]
}
