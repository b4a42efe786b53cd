use std::{future::Future, sync::Arc};

use alloy::primitives::TxHash;
use opentelemetry::{global::meter_provider, metrics::Counter, KeyValue};
use tracing::{debug, instrument};

use claimer_ethereum::{
    classify::{ClassifiedFailure, ClassifierChain, CodeClassifier},
    ClaimConfig, ClaimTx, ClientError,
};
use claimer_types::{tx_url, Severity};

use crate::{log::SessionLog, session::Session};

/// Outcome of a single claim attempt that reached the network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimAttemptResult {
    /// Receipt status; false for reverted or rejected transactions
    pub success: bool,
    pub tx_hash: Option<TxHash>,
    pub gas_used: Option<u64>,
    /// Why the node rejected the transaction, if it did
    pub failure: Option<ClassifiedFailure>,
}

impl ClaimAttemptResult {
    pub fn rejected(failure: ClassifiedFailure) -> Self {
        Self {
            success: false,
            tx_hash: None,
            gas_used: None,
            failure: Some(failure),
        }
    }
}

/// Errors that prevent an attempt from reaching submission at all
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// One discrete claim attempt. Implementations never retry internally.
pub trait Claim: Send + Sync {
    fn claim(&self) -> impl Future<Output = Result<ClaimAttemptResult, ClaimError>> + Send;
}

/// Label for where an attempt came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimMode {
    Manual,
    Auto,
}

impl std::fmt::Display for ClaimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimMode::Manual => f.write_str("Manual"),
            ClaimMode::Auto => f.write_str("Auto"),
        }
    }
}

/// Builds, signs, and submits faucet claims for a session
pub struct ClaimExecutor {
    session: Arc<Session>,
    config: ClaimConfig,
    classifier: ClassifierChain,
    success: Counter<u64>,
    failure: Counter<u64>,
}

impl ClaimExecutor {
    pub fn new(session: Arc<Session>, config: ClaimConfig) -> Self {
        let classifier = ClassifierChain::new(CodeClassifier::from_config(&config.error_codes));

        let meter = meter_provider().meter("claimer");
        let success = meter
            .u64_counter("claim_success")
            .with_description("Number of successful faucet claims")
            .build();
        let failure = meter
            .u64_counter("claim_failure")
            .with_description("Number of failed faucet claims")
            .build();

        Self {
            session,
            config,
            classifier,
            success,
            failure,
        }
    }

    /// Replace the default classification rules
    pub fn with_classifier(mut self, classifier: ClassifierChain) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    /// Perform exactly one claim attempt
    #[instrument(skip(self), fields(contract = %self.config.contract))]
    pub async fn execute(&self) -> Result<ClaimAttemptResult, ClaimError> {
        let res = self.attempt().await;
        match &res {
            Ok(result) if result.success => self.success.add(1, &[]),
            Ok(result) => {
                let kind = result
                    .failure
                    .as_ref()
                    .map(|f| format!("{:?}", f.kind))
                    .unwrap_or_else(|| "Reverted".into());
                self.failure.add(1, &[KeyValue::new("error", kind)]);
            }
            Err(_) => self.failure.add(1, &[KeyValue::new("error", "Client")]),
        }
        res
    }

    async fn attempt(&self) -> Result<ClaimAttemptResult, ClaimError> {
        let account = self.session.account();
        let client = self.session.client();

        let nonce = client.get_nonce(account.address()).await?;
        debug!(nonce, "Building claim transaction");

        let tx = ClaimTx {
            contract: self.config.contract,
            from: account.address(),
            nonce,
            gas_limit: self.config.gas_limit,
            gas_price_wei: self.config.gas_price_wei(),
        }
        .into_request();

        match client.sign_and_send(tx, account).await {
            Ok(receipt) => {
                // Publishes the new balance; a failed refresh is logged, not escalated
                self.session.refresh_balance().await;
                Ok(ClaimAttemptResult {
                    success: receipt.status(),
                    tx_hash: Some(receipt.transaction_hash),
                    gas_used: Some(receipt.gas_used),
                    failure: None,
                })
            }
            Err(ClientError::SubmissionFailed(failure)) => {
                debug!(%failure, "Submission rejected");
                Ok(ClaimAttemptResult::rejected(
                    self.classifier.classify(&failure),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Claim for ClaimExecutor {
    fn claim(&self) -> impl Future<Output = Result<ClaimAttemptResult, ClaimError>> + Send {
        self.execute()
    }
}

/// Running success and failure totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimTally {
    pub success: u64,
    pub fail: u64,
}

impl ClaimTally {
    pub fn completed(&self) -> u64 {
        self.success + self.fail
    }

    /// Count an attempt's outcome and report it to the session log
    pub fn record(
        &mut self,
        log: &SessionLog,
        mode: ClaimMode,
        outcome: &Result<ClaimAttemptResult, ClaimError>,
    ) {
        match outcome {
            Ok(result) if result.success => {
                self.success += 1;
                let gas = result
                    .gas_used
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| "unknown".into());
                log.success(format!("{mode} claim succeeded! Gas used: {gas}"));
                if let Some(hash) = &result.tx_hash {
                    log.push(Severity::Tx, format!("Transaction: {}", tx_url(hash)));
                }
                log.success(format!("Total successful claims: {}", self.success));
            }
            Ok(result) => {
                self.fail += 1;
                match &result.failure {
                    Some(failure) => log.error(format!("{mode} claim failed: {failure}")),
                    None => log.error(format!("{mode} claim failed: transaction reverted")),
                }
                if let Some(hash) = &result.tx_hash {
                    log.push(Severity::Tx, format!("Transaction: {}", tx_url(hash)));
                }
                log.error(format!("Total failed claims: {}", self.fail));
            }
            Err(e) => {
                self.fail += 1;
                log.error(format!("{mode} claim error: {e}"));
                log.error(format!("Total failed claims: {}", self.fail));
            }
        }
    }
}
