use std::path::PathBuf;

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use zeroize::Zeroizing;

use claimer_node::{config::Config, log::SessionLog, Claimer};

mod balance;
mod calldata;
mod claim;
mod config;
pub mod run;

#[derive(Subcommand)]
pub enum Command {
    /// Claim automatically on the configured interval until interrupted.
    Run(Box<run::RunArgs>),
    /// Make a single manual claim.
    Claim(claim::ClaimArgs),
    /// Query the wallet's ETH balance.
    Balance(balance::BalanceArgs),
    /// Print the claim call data for the wallet next to a known-good example.
    Calldata(calldata::CalldataArgs),
    /// Show the effective configuration, optionally saving overrides to disk.
    Config(config::ConfigArgs),
}

/// Everything a command needs from the top level
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub private_key: Option<Zeroizing<String>>,
}

impl Context {
    /// Connect to the rpc and unlock the wallet
    pub async fn connect(self) -> Result<Claimer> {
        let private_key = self
            .private_key
            .ok_or_else(|| eyre!("No private key provided; pass --private-key or set PRIVATE_KEY"))?;
        let claimer = Claimer::init(self.config, private_key, SessionLog::new()).await?;
        Ok(claimer)
    }
}

impl Command {
    /// Run the given command
    pub fn execute(self, ctx: Context) -> Result<()> {
        tokio::runtime::Runtime::new()?.block_on(async move {
            match self {
                Command::Run(args) => args.execute(ctx).await,
                Command::Claim(args) => args.execute(ctx).await,
                Command::Balance(args) => args.execute(ctx).await,
                Command::Calldata(args) => args.execute(ctx).await,
                Command::Config(args) => args.execute(ctx).await,
            }
        })
    }
}
