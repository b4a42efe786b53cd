use std::{path::PathBuf, time::Duration};

use alloy::primitives::Address;
use clap::{ArgAction, Parser};
use url::Url;

use claimer_node::config::Config;

use crate::commands::Command;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Path to the config file
    #[arg(short, long, global = true, env("CLAIMER_CONFIG"))]
    pub config: Option<PathBuf>,
    /// Private key of the claiming wallet. Never written to the config file.
    #[arg(long, global = true, env("PRIVATE_KEY"), hide_env_values = true)]
    pub private_key: Option<String>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

/// Claim settings that can be overridden per invocation
#[derive(Parser, Clone, Debug, Default)]
pub(crate) struct ClaimOverrides {
    /// HTTP RPC URL of a Sepolia node
    #[arg(long, env("HTTP_RPC"))]
    pub rpc: Option<Url>,
    /// Faucet contract address
    #[arg(long)]
    pub contract: Option<Address>,
    /// Gas price in gwei
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub gas_price: Option<u64>,
    /// Gas limit for claim transactions
    #[arg(long)]
    pub gas_limit: Option<u64>,
    /// Time between automatic claims, e.g. "300s" or "5m"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

impl ClaimOverrides {
    /// Apply argument overrides to configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(rpc) = self.rpc.clone() {
            config.eth.rpc = rpc;
        }
        if let Some(contract) = self.contract {
            config.claim.contract = contract;
        }
        if let Some(gas_price) = self.gas_price {
            config.claim.gas_price_gwei = gas_price;
        }
        if let Some(gas_limit) = self.gas_limit {
            config.claim.gas_limit = gas_limit;
        }
        if let Some(interval) = self.interval {
            config.claim.interval = interval;
        }
    }
}
