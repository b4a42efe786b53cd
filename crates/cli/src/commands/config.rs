use clap::Parser;
use color_eyre::Result;
use tracing::info;

use super::Context;
use crate::cli::ClaimOverrides;

#[derive(Parser)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: ClaimOverrides,
    /// Write the overridden values back to the config file
    #[arg(long)]
    pub save: bool,
}

impl ConfigArgs {
    /// Print the effective configuration. The private key is never part of it.
    pub async fn execute(self, mut ctx: Context) -> Result<()> {
        self.overrides.apply(&mut ctx.config);
        print!("{}", toml::to_string_pretty(&ctx.config)?);

        if self.save {
            ctx.config.save(&ctx.config_path)?;
            info!(path = ?ctx.config_path, "Configuration saved");
        }
        Ok(())
    }
}
