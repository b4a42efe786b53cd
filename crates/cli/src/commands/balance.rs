use clap::Parser;
use color_eyre::Result;
use url::Url;

use super::Context;

#[derive(Parser)]
pub struct BalanceArgs {
    /// HTTP RPC URL of a Sepolia node
    #[arg(long, env("HTTP_RPC"))]
    pub rpc: Option<Url>,
}

impl BalanceArgs {
    /// Query the wallet balance. A failed query is logged, not fatal.
    pub async fn execute(self, mut ctx: Context) -> Result<()> {
        if let Some(rpc) = self.rpc {
            ctx.config.eth.rpc = rpc;
        }
        let claimer = ctx.connect().await?;
        claimer.session().check_balance().await;
        claimer.disconnect();
        Ok(())
    }
}
