//! Domain models for the chainexport pipeline.
//!
//! Records are transient: the source builds them for one fetch, the
//! projector reads them once, and nothing is kept afterwards.
//!
//! - [`TransactionRecord`] - One explorer `txlist` entry
//! - [`AttestationRecord`] - One attestation from the GraphQL indexer
//! - [`RecordShape`] - Which of the two a record set contains
//! - [`PriceQuote`] - One asset price for the ticker

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Transactions
// =============================================================================

/// A transaction as returned by the explorer's `txlist` endpoint.
///
/// Field names follow the explorer JSON. `value` is kept as the raw decimal
/// string because it may not fit in 64 bits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: String,

    /// Hex-encoded call data. Plain transfers carry `"0x"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Sender address.
    #[serde(default)]
    pub from: String,

    /// Receiver address; empty for contract creation.
    #[serde(default)]
    pub to: String,

    /// Amount in the chain's smallest unit (wei).
    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,

    /// Unix timestamp as the explorer sends it (decimal string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
}

impl TransactionRecord {
    /// Create a record from the fields used by the CSV export.
    pub fn new(
        hash: impl Into<String>,
        input: Option<&str>,
        from: impl Into<String>,
        to: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            input: input.map(str::to_string),
            from: from.into(),
            to: to.into(),
            value: value.into(),
            block_number: None,
            time_stamp: None,
        }
    }
}

// =============================================================================
// Attestations
// =============================================================================

/// An attestation as returned by the attestation indexer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AttestationRecord {
    /// Address the attestation was made about.
    pub recipient: String,
    /// Transaction that created the attestation.
    pub txid: String,
}

impl AttestationRecord {
    pub fn new(recipient: impl Into<String>, txid: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            txid: txid.into(),
        }
    }
}

// =============================================================================
// Prices
// =============================================================================

/// USD price of one asset, as shown in the price ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    /// Price API asset id (`ethereum`)
    pub id: String,
    /// Ticker symbol (`ETH`)
    pub symbol: String,
    pub usd: f64,
}

impl PriceQuote {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, usd: f64) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            usd,
        }
    }
}

// =============================================================================
// Record Shape
// =============================================================================

/// The declared shape of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordShape {
    Transactions,
    Attestations,
}

impl RecordShape {
    /// Lowercase plural name, also used as the export filename suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordShape::Transactions => "transactions",
            RecordShape::Attestations => "attestations",
        }
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transactions" | "transaction" | "tx" => Ok(RecordShape::Transactions),
            "attestations" | "attestation" => Ok(RecordShape::Attestations),
            other => Err(format!("Unknown record shape: {}", other)),
        }
    }
}
