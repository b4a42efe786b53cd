use alloy::primitives::Address;
use tokio::sync::watch;
use tracing::instrument;

use claimer_ethereum::{
    parse_private_key, Account, ClientError, ConnectionInfo, EthClient, EthConfig, KeyError,
};
use claimer_types::{
    selectors::{claim_calldata_hex, FAUCET_MINT, KNOWN_GOOD_CALLDATA},
    Severity,
};

use crate::log::SessionLog;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("No private key provided")]
    MissingKey,
}

/// A connected client paired with the wallet that signs claims.
///
/// The session is the only owner of the account's key material. Dropping the session
/// (or calling [`Session::disconnect`]) releases the connection and zeroizes the key.
pub struct Session {
    client: EthClient,
    account: Account,
    log: SessionLog,
    /// Latest known balance in ether, `None` until the first successful query
    balance: watch::Sender<Option<String>>,
}

impl Session {
    /// Connect to the configured rpc and validate the private key
    #[instrument(skip_all)]
    pub async fn open(
        config: &EthConfig,
        private_key: &str,
        log: SessionLog,
    ) -> Result<Self, SessionError> {
        log.push(Severity::Network, "Connecting to the Sepolia test network...");
        let client = match EthClient::connect(config).await {
            Ok(client) => client,
            Err(e) => {
                log.error(format!("Network connection failed: {e}"));
                return Err(e.into());
            }
        };
        log.success("Connected to the Sepolia test network");

        Self::with_client(client, private_key, log).await
    }

    /// Validate the private key for an already connected client
    pub async fn with_client(
        client: EthClient,
        private_key: &str,
        log: SessionLog,
    ) -> Result<Self, SessionError> {
        if private_key.trim().is_empty() {
            log.warning("Enter a private key");
            return Err(SessionError::MissingKey);
        }

        log.info("Validating private key...");
        let account = match parse_private_key(private_key) {
            Ok(account) => account,
            Err(e) => {
                log.error(format!("Private key validation failed: {e}"));
                return Err(e.into());
            }
        };
        log.push(
            Severity::Wallet,
            format!("Wallet address: {}", account.address()),
        );
        log.success("Private key validated");

        let session = Self {
            client,
            account,
            log,
            balance: watch::Sender::new(None),
        };

        // Best-effort; a failure is already in the log
        session.refresh_balance().await;
        Ok(session)
    }

    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn client(&self) -> &EthClient {
        &self.client
    }

    pub fn connection(&self) -> &ConnectionInfo {
        self.client.connection()
    }

    /// Latest known balance in ether
    pub fn balance(&self) -> Option<String> {
        self.balance.borrow().clone()
    }

    /// Observe balance updates
    pub fn watch_balance(&self) -> watch::Receiver<Option<String>> {
        self.balance.subscribe()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Best-effort balance query. A new balance is published to watchers and the log;
    /// failures are logged and never escalated.
    pub async fn refresh_balance(&self) -> Option<String> {
        match self.client.get_balance(self.address()).await {
            Ok(balance) => {
                self.log
                    .push(Severity::Wallet, format!("Balance: {balance} ETH"));
                self.balance.send_replace(Some(balance.clone()));
                Some(balance)
            }
            Err(e) => {
                self.log.warning(format!("Failed to refresh balance: {e}"));
                None
            }
        }
    }

    /// Query and report the account balance
    pub async fn check_balance(&self) -> Option<String> {
        self.log.info("Querying balance...");
        let balance = self.refresh_balance().await;
        if let Some(balance) = &balance {
            self.log
                .success(format!("Balance query succeeded! Current balance: {balance} ETH"));
        }
        balance
    }

    /// Log the claim calldata for this wallet next to a known-good example.
    /// Returns whether the encodings have the same shape.
    pub fn calldata_self_test(&self) -> bool {
        let call_data = claim_calldata_hex(self.address());
        let matches = call_data.len() == KNOWN_GOOD_CALLDATA.len();

        self.log.info("Call data self-test:");
        self.log.info(format!("  Wallet address: {}", self.address()));
        self.log.info(format!("  Method id: {FAUCET_MINT}"));
        self.log
            .info(format!("  Address parameter: {}", &call_data[10..]));
        self.log.info(format!("  Full call data: {call_data}"));
        self.log
            .info(format!("  Length: {} characters", call_data.len()));
        self.log
            .info(format!("  Known good example: {KNOWN_GOOD_CALLDATA}"));
        self.log.info(format!(
            "  Format matches: {}",
            if matches { "yes" } else { "no" }
        ));

        matches
    }

    /// Tear down the session, releasing the connection and key
    pub fn disconnect(self) {
        self.log.info("Disconnected; wallet cleared from memory");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connection", self.client.connection())
            .field("account", &self.account)
            .finish()
    }
}
