//! Classification of failed claim submissions.
//!
//! Nodes report most submission failures with the same generic JSON-RPC code, so
//! classification runs a chain of rules: structured error codes first (when a code table
//! is configured for the provider in use), then substring rules over the raw message.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::SubmissionFailure;

const WEI_PER_GWEI: u128 = 1_000_000_000;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientFunds,
    NonceTooLow,
    Underpriced,
    GasBelowBaseFee,
    Unclassified,
}

/// Gas price advice parsed from a "max fee per gas less than block base fee" rejection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseFeeHint {
    pub base_fee_gwei: u128,
    pub max_fee_gwei: u128,
    /// Heuristic: first two digits of the base fee plus one. Not a guarantee of inclusion.
    pub suggested_gwei: u128,
}

impl BaseFeeHint {
    /// Parse `baseFee: <wei>` and `maxFeePerGas: <wei>` out of a node message
    pub fn parse(message: &str) -> Option<Self> {
        let base_fee = wei_field(message, "baseFee: ")?;
        let max_fee = wei_field(message, "maxFeePerGas: ")?;

        let base_fee_gwei = base_fee.div_ceil(WEI_PER_GWEI);
        let max_fee_gwei = max_fee.div_ceil(WEI_PER_GWEI);

        Some(Self {
            base_fee_gwei,
            max_fee_gwei,
            suggested_gwei: suggest_gwei(base_fee_gwei),
        })
    }
}

fn suggest_gwei(base_fee_gwei: u128) -> u128 {
    let digits = base_fee_gwei.to_string();
    match digits.get(..2).and_then(|d| d.parse::<u128>().ok()) {
        Some(first_two) if digits.len() >= 2 => first_two + 1,
        _ => base_fee_gwei + 1,
    }
}

/// Decimal value following the first occurrence of `label`
fn wei_field(message: &str, label: &str) -> Option<u128> {
    let rest = &message[message.find(label)? + label.len()..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// A submission failure along with its classification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub hint: Option<BaseFeeHint>,
    /// Raw node message
    pub raw: String,
}

impl ClassifiedFailure {
    /// Human readable explanation of the failure
    pub fn message(&self) -> String {
        match (self.kind, self.hint) {
            (FailureKind::InsufficientFunds, _) => {
                "Insufficient ETH balance to pay for gas".to_string()
            }
            (FailureKind::NonceTooLow, _) => "Nonce too low, try again later".to_string(),
            (FailureKind::Underpriced, _) => {
                "Transaction fee too low, raise the gas price".to_string()
            }
            (FailureKind::GasBelowBaseFee, Some(hint)) => format!(
                "Gas price too low: configured {} Gwei, network base fee is {} Gwei, raise it to at least {} Gwei",
                hint.max_fee_gwei, hint.base_fee_gwei, hint.suggested_gwei
            ),
            (FailureKind::GasBelowBaseFee, None) => {
                "Gas price too low, raise the gas price setting".to_string()
            }
            (FailureKind::Unclassified, _) => self.raw.clone(),
        }
    }
}

impl std::fmt::Display for ClassifiedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// A single classification rule
pub trait Classify: Send + Sync {
    fn classify(&self, failure: &SubmissionFailure) -> Option<FailureKind>;
}

/// Maps structured JSON-RPC error codes to failure kinds
#[derive(Clone, Debug, Default)]
pub struct CodeClassifier {
    codes: HashMap<i64, FailureKind>,
}

impl CodeClassifier {
    pub fn new(codes: HashMap<i64, FailureKind>) -> Self {
        Self { codes }
    }

    /// Build from a config table keyed by stringified codes, skipping keys that don't parse
    pub fn from_config(table: &HashMap<String, FailureKind>) -> Self {
        let codes = table
            .iter()
            .filter_map(|(code, kind)| match code.trim().parse::<i64>() {
                Ok(code) => Some((code, *kind)),
                Err(_) => {
                    warn!(code, "Ignoring non-numeric error code in classifier table");
                    None
                }
            })
            .collect();
        Self { codes }
    }
}

impl Classify for CodeClassifier {
    fn classify(&self, failure: &SubmissionFailure) -> Option<FailureKind> {
        failure.code.and_then(|code| self.codes.get(&code).copied())
    }
}

/// Case-insensitive substring rules over the node's message
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageClassifier;

impl MessageClassifier {
    const RULES: [(&'static str, FailureKind); 4] = [
        ("insufficient funds", FailureKind::InsufficientFunds),
        ("nonce too low", FailureKind::NonceTooLow),
        (
            "replacement transaction underpriced",
            FailureKind::Underpriced,
        ),
        (
            "max fee per gas less than block base fee",
            FailureKind::GasBelowBaseFee,
        ),
    ];
}

impl Classify for MessageClassifier {
    fn classify(&self, failure: &SubmissionFailure) -> Option<FailureKind> {
        let message = failure.message.to_lowercase();
        Self::RULES
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, kind)| *kind)
    }
}

/// Ordered list of rules; the first rule to match wins
pub struct ClassifierChain {
    rules: Vec<Box<dyn Classify>>,
}

impl ClassifierChain {
    /// Structured codes first, message matching as the fallback
    pub fn new(codes: CodeClassifier) -> Self {
        Self {
            rules: vec![Box::new(codes), Box::new(MessageClassifier)],
        }
    }

    /// Chain with no rules; everything is unclassified
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl Classify + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn classify(&self, failure: &SubmissionFailure) -> ClassifiedFailure {
        let kind = self
            .rules
            .iter()
            .find_map(|rule| rule.classify(failure))
            .unwrap_or(FailureKind::Unclassified);
        trace!(?kind, code = ?failure.code, "classified submission failure");

        let hint = match kind {
            FailureKind::GasBelowBaseFee => BaseFeeHint::parse(&failure.message),
            _ => None,
        };

        ClassifiedFailure {
            kind,
            hint,
            raw: failure.message.clone(),
        }
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::new(CodeClassifier::default())
    }
}
