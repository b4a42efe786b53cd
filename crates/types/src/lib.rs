use alloy_primitives::TxHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod selectors;

pub use alloy_primitives as primitives;

/// Sepolia test network chain id
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Block explorer used for transaction links
pub const SEPOLIA_EXPLORER: &str = "https://sepolia.etherscan.io";

/// Explorer link for a transaction hash
pub fn tx_url(hash: &TxHash) -> String {
    format!("{SEPOLIA_EXPLORER}/tx/{hash}")
}

/// Kind of a session log entry
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Network,
    Wallet,
    Tx,
    Time,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Network => "network",
            Severity::Wallet => "wallet",
            Severity::Tx => "tx",
            Severity::Time => "time",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the in-memory session log
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {:>7}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.severity,
            self.message
        )
    }
}

/// Phase of the auto-claim loop
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoopPhase {
    #[default]
    Idle,
    /// Started, first attempt not yet under way
    Running,
    Attempting,
    Waiting,
    Stopped,
}

/// Snapshot of the auto-claim loop, published after every state change
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopStatus {
    pub phase: LoopPhase,
    pub running: bool,
    /// When the next attempt fires, while waiting
    pub next_fire_at: Option<DateTime<Utc>>,
    /// Seconds left before the next attempt
    pub countdown: u64,
    pub success_count: u64,
    pub fail_count: u64,
}

impl LoopStatus {
    /// Number of attempts that have completed
    pub fn completed(&self) -> u64 {
        self.success_count + self.fail_count
    }
}

impl std::fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} (running: {}, success: {}, failed: {}",
            self.phase, self.running, self.success_count, self.fail_count
        )?;
        if self.phase == LoopPhase::Waiting {
            write!(f, ", next in {}s", self.countdown)?;
        }
        f.write_str(")")
    }
}
