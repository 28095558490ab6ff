use alloy_primitives::{Address, address};

// Mainnet deployments
pub const CURVE_META_REGISTRY: Address = address!("F98B45FA17DE75FB1aD0e7aFD971b0ca00e379fC");
pub const CRV_MINTER: Address = address!("d061D61a4d941c39E5453435B6345Dc261C2fcE0");
pub const WETH_ADDRESS: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

pub const MAX_CRYPTOSWAP_COINS: usize = 3;
pub const MAX_STABLESWAP_COINS: usize = 4;
pub const MIN_COINS: usize = 2;
