use std::{collections::HashMap, time::Duration};

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::classify::FailureKind;

#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EthConfig {
    /// Url for rpc commands
    pub rpc: Url,
}

impl std::fmt::Debug for EthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Hide potentially sensitive query parameters
        f.debug_struct("EthConfig")
            .field("rpc", &self.rpc.host_str().unwrap_or("missing rpc host"))
            .finish()
    }
}

impl Default for EthConfig {
    fn default() -> Self {
        Self {
            rpc: "https://rpc.sepolia.ethpandaops.io".parse().unwrap(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ClaimConfig {
    /// Faucet contract to call
    pub contract: Address,
    /// Legacy gas price, in gwei
    pub gas_price_gwei: u64,
    pub gas_limit: u64,
    /// Time to wait between automatic claims
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Provider specific JSON-RPC error codes, checked before message matching
    pub error_codes: HashMap<String, FailureKind>,
}

impl ClaimConfig {
    /// Intervals below this need explicit confirmation before the loop starts
    pub const MIN_INTERVAL: Duration = Duration::from_secs(60);

    /// Gas price in wei
    pub fn gas_price_wei(&self) -> u128 {
        u128::from(self.gas_price_gwei.max(1)) * 1_000_000_000
    }

    pub fn is_short_interval(&self) -> bool {
        self.interval < Self::MIN_INTERVAL
    }
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            contract: address!("0x3edf60dd017ace33a0220f78741b5581c385a1ba"),
            gas_price_gwei: 20,
            gas_limit: 100_000,
            interval: Duration::from_secs(5 * 60),
            error_codes: HashMap::new(),
        }
    }
}
