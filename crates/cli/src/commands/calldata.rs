use alloy::primitives::Address;
use clap::Parser;
use color_eyre::{eyre::bail, Result};
use tracing::info;

use claimer_ethereum::parse_private_key;
use claimer_types::selectors::{claim_calldata_hex, CLAIM_CALLDATA_HEX_LEN};

use super::Context;

#[derive(Parser)]
pub struct CalldataArgs {
    /// Encode for this address instead of the wallet. Works offline.
    #[arg(long)]
    pub address: Option<Address>,
    /// Connect to the rpc and run the self-test against the live session
    #[arg(long, conflicts_with = "address")]
    pub online: bool,
}

impl CalldataArgs {
    pub async fn execute(self, ctx: Context) -> Result<()> {
        if self.online {
            let claimer = ctx.connect().await?;
            let matches = claimer.session().calldata_self_test();
            claimer.disconnect();
            if !matches {
                bail!("Call data does not match the known-good format");
            }
            return Ok(());
        }

        let address = match (self.address, ctx.private_key) {
            (Some(address), _) => address,
            (None, Some(key)) => parse_private_key(&key)?.address(),
            (None, None) => bail!("Pass --address, or provide a private key"),
        };

        let call_data = claim_calldata_hex(address);
        info!(%address, len = call_data.len(), "Claim call data");
        println!("{call_data}");

        if call_data.len() != CLAIM_CALLDATA_HEX_LEN {
            bail!("Call data does not match the known-good format");
        }
        Ok(())
    }
}
