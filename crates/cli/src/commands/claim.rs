use clap::Parser;
use color_eyre::Result;
use tracing::{info, warn};

use super::Context;
use crate::cli::ClaimOverrides;

#[derive(Parser)]
pub struct ClaimArgs {
    #[command(flatten)]
    pub overrides: ClaimOverrides,
}

impl ClaimArgs {
    /// Make one claim attempt; failures are reported in the log, not as an error exit
    pub async fn execute(self, mut ctx: Context) -> Result<()> {
        self.overrides.apply(&mut ctx.config);
        let mut claimer = ctx.connect().await?;

        // Details are already in the session log; an unsuccessful claim is not an error exit
        match claimer.claim_once().await {
            Ok(result) if result.success => {
                info!(tx = ?result.tx_hash, gas_used = ?result.gas_used, "Claim mined")
            }
            Ok(result) => warn!(tx = ?result.tx_hash, "Claim was not successful"),
            Err(e) => warn!(%e, "Claim attempt failed"),
        }
        let tally = claimer.tally();
        info!(success = tally.success, failed = tally.fail, "Manual claim finished");

        claimer.disconnect();
        Ok(())
    }
}
