use std::time::Duration;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{utils::format_ether, Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportErrorKind},
};
use tracing::{debug, info, instrument};
use url::Url;

use claimer_types::{selectors::claim_calldata, SEPOLIA_CHAIN_ID};

pub mod classify;
mod config;
pub mod keys;

pub use config::*;
pub use keys::{parse_private_key, Account, KeyError};

/// Raw failure reported by the node when submitting a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionFailure {
    /// JSON-RPC error code, when the node returned a structured error
    pub code: Option<i64>,
    pub message: String,
}

impl SubmissionFailure {
    fn from_rpc(err: &RpcError<TransportErrorKind>) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self {
                code: Some(payload.code),
                message: payload.message.to_string(),
            },
            None => Self {
                code: None,
                message: err.to_string(),
            },
        }
    }
}

impl std::fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network unreachable: {_0}")]
    NetworkUnreachable(String),
    #[error("Wrong network id {actual}, expected {expected} (Sepolia)")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("RPC query failed: {_0}")]
    QueryFailed(#[from] RpcError<TransportErrorKind>),
    #[error("Failed to sign transaction: {_0}")]
    Signing(String),
    #[error("Transaction submission failed: {_0}")]
    SubmissionFailed(SubmissionFailure),
}

/// Gas settings for a faucet claim transaction
#[derive(Clone, Copy, Debug)]
pub struct ClaimTx {
    pub contract: Address,
    pub from: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price_wei: u128,
}

impl ClaimTx {
    /// Legacy transaction calling the faucet on behalf of `from`
    pub fn into_request(self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.contract)
            .with_value(U256::ZERO)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price_wei)
            .with_nonce(self.nonce)
            .with_chain_id(SEPOLIA_CHAIN_ID)
            .with_input(claim_calldata(self.from))
    }
}

/// Time between receipt polls while a claim transaction is pending
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Snapshot of an established rpc connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub endpoint: Url,
    pub chain_id: u64,
    pub connected: bool,
}

impl std::fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Endpoint paths and queries often carry api keys
        f.debug_struct("ConnectionInfo")
            .field("endpoint", &self.endpoint.host_str().unwrap_or("missing rpc host"))
            .field("chain_id", &self.chain_id)
            .field("connected", &self.connected)
            .finish()
    }
}

/// Connection to a Sepolia rpc node
pub struct EthClient {
    provider: DynProvider,
    info: ConnectionInfo,
}

impl EthClient {
    /// Connect to the configured rpc and verify it serves the Sepolia network
    #[instrument(skip_all, fields(rpc = config.rpc.host_str().unwrap_or_default()))]
    pub async fn connect(config: &EthConfig) -> Result<Self, ClientError> {
        debug!(?config);
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(config.rpc.clone())
            .erased();
        Self::connect_with(provider, config.rpc.clone()).await
    }

    /// Verify an already built provider for `endpoint`: it must be listening and report
    /// the Sepolia chain id
    pub async fn connect_with(provider: DynProvider, endpoint: Url) -> Result<Self, ClientError> {
        let listening = provider
            .client()
            .request_noparams::<bool>("net_listening")
            .await
            .map_err(|e| ClientError::NetworkUnreachable(e.to_string()))?;
        if !listening {
            return Err(ClientError::NetworkUnreachable(
                "node is not listening".into(),
            ));
        }

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ClientError::NetworkUnreachable(e.to_string()))?;
        if chain_id != SEPOLIA_CHAIN_ID {
            return Err(ClientError::WrongNetwork {
                expected: SEPOLIA_CHAIN_ID,
                actual: chain_id,
            });
        }

        info!(chain_id, "Connected to Sepolia");
        Ok(Self {
            provider,
            info: ConnectionInfo {
                endpoint,
                chain_id,
                connected: true,
            },
        })
    }

    pub fn connection(&self) -> &ConnectionInfo {
        &self.info
    }

    pub fn chain_id(&self) -> u64 {
        self.info.chain_id
    }

    /// Balance of an account, formatted in ether
    pub async fn get_balance(&self, address: Address) -> Result<String, ClientError> {
        let balance = self.provider.get_balance(address).await?;
        Ok(format_ether(balance))
    }

    /// Next transaction count for an account
    pub async fn get_nonce(&self, address: Address) -> Result<u64, ClientError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    /// Sign a transaction locally with the account key, submit it, and wait for the receipt
    #[instrument(skip_all, fields(from = %account.address()))]
    pub async fn sign_and_send(
        &self,
        tx: TransactionRequest,
        account: &Account,
    ) -> Result<TransactionReceipt, ClientError> {
        let wallet = EthereumWallet::from(account.signer().clone());
        let envelope = tx
            .build(&wallet)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(|e| ClientError::SubmissionFailed(SubmissionFailure::from_rpc(&e)))?;
        let tx_hash = *pending.tx_hash();
        debug!(tx = %tx_hash, "Transaction submitted, waiting for receipt");

        self.wait_for_receipt(tx_hash).await
    }

    /// Poll until the transaction is mined. No timeout; a claim waits as long as the node does.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ClientError> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ClientError::SubmissionFailed(SubmissionFailure::from_rpc(&e)))?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
