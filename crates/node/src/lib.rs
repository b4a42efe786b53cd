use std::sync::Arc;

use tracing::instrument;
use zeroize::Zeroizing;

pub mod auto;
pub mod config;
pub mod executor;
pub mod log;
pub mod session;

use auto::{AutoClaimHandle, AutoClaimer, LoopError};
use config::Config;
use executor::{ClaimAttemptResult, ClaimError, ClaimExecutor, ClaimMode, ClaimTally};
use log::SessionLog;
use session::{Session, SessionError};

/// A connected claiming session: one wallet, one rpc, one log
pub struct Claimer {
    config: Config,
    session: Arc<Session>,
    log: SessionLog,
    tally: ClaimTally,
}

impl Claimer {
    /// Connect and unlock the wallet. The key is only held by the resulting session.
    #[instrument(skip_all)]
    pub async fn init(
        config: Config,
        private_key: Zeroizing<String>,
        log: SessionLog,
    ) -> Result<Self, SessionError> {
        log.info("Welcome to the Sepolia faucet claimer");
        let session = Session::open(&config.eth, &private_key, log.clone()).await?;
        Ok(Self::from_session(config, session))
    }

    pub fn from_session(config: Config, session: Session) -> Self {
        let log = session.log().clone();
        Self {
            config,
            session: Arc::new(session),
            log,
            tally: ClaimTally::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Totals for manual claims made through [`Claimer::claim_once`]
    pub fn tally(&self) -> ClaimTally {
        self.tally
    }

    pub fn executor(&self) -> ClaimExecutor {
        ClaimExecutor::new(self.session.clone(), self.config.claim.clone())
    }

    /// Make a single manual claim attempt
    pub async fn claim_once(&mut self) -> Result<ClaimAttemptResult, ClaimError> {
        self.log.info("Manual claim: attempting to claim tokens...");
        let outcome = self.executor().execute().await;
        self.tally.record(&self.log, ClaimMode::Manual, &outcome);
        outcome
    }

    /// Start claiming on the configured interval
    pub fn start_auto(&self, confirm_short_interval: bool) -> Result<AutoClaimHandle, LoopError> {
        self.auto_claimer().start(confirm_short_interval)
    }

    pub fn auto_claimer(&self) -> AutoClaimer<ClaimExecutor> {
        AutoClaimer::new(
            self.executor(),
            self.config.claim.interval,
            self.log.clone(),
        )
    }

    /// Clear the session log and reset the manual claim totals
    pub fn clear_log(&mut self) {
        self.tally = ClaimTally::default();
        self.log.clear();
    }

    /// Drop the connection and wallet
    pub fn disconnect(self) {
        match Arc::try_unwrap(self.session) {
            Ok(session) => session.disconnect(),
            // Still referenced by a running executor; released once that finishes
            Err(_) => self.log.info("Disconnected"),
        }
    }
}
