use std::io::{BufRead, Write};

use clap::Parser;
use color_eyre::eyre::{Context as _, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use claimer_node::auto::LoopEvent;

use super::Context;
use crate::cli::ClaimOverrides;

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: ClaimOverrides,
    /// Start even if the interval is below 60 seconds, without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl RunArgs {
    /// Run the auto-claim loop until ctrl-c
    pub async fn execute(self, mut ctx: Context) -> Result<()> {
        self.overrides.apply(&mut ctx.config);
        let short_interval = ctx.config.claim.is_short_interval();
        let interval = ctx.config.claim.interval;

        let claimer = ctx.connect().await?;

        let confirmed = !short_interval || self.yes || confirm_short_interval(interval.as_secs())?;
        let Ok(handle) = claimer.start_auto(confirmed) else {
            claimer.disconnect();
            return Ok(());
        };

        // Countdown on a single line of stdout, rewritten every second
        let mut events = handle.subscribe();
        let progress = tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            loop {
                match events.recv().await {
                    Ok(LoopEvent::Countdown(remaining)) => {
                        let _ = write!(stdout, "\r{}", countdown_line(remaining));
                        let _ = stdout.flush();
                    }
                    Ok(LoopEvent::AttemptStarted { .. }) => {
                        let _ = writeln!(stdout);
                    }
                    Ok(LoopEvent::Stopped(_)) | Err(RecvError::Closed) => {
                        let _ = writeln!(stdout);
                        break;
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                }
            }
        });

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for ctrl-c")?;
        info!("Received ctrl-c, stopping after any in-flight claim settles");
        handle.stop();

        let status = handle.join().await?;
        progress.abort();
        info!(%status, "Auto claim stopped");

        claimer.disconnect();
        Ok(())
    }
}

/// Fixed width so a shorter count fully overwrites the previous one
fn countdown_line(remaining: u64) -> String {
    format!("Next claim in {remaining:>6}s")
}

/// Ask on stdin before claiming more often than once a minute
fn confirm_short_interval(secs: u64) -> Result<bool> {
    warn!("Claim interval of {secs}s is below 60s and may be rate limited by the faucet");
    print!("Continue anyway? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
