//! Block explorer client (Etherscan-compatible `txlist`).

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::logs::{log_info_indent, log_warning_indent};
use crate::config::{Config, ENV_API_KEY};
use crate::error::{SourceError, SourceResult};
use crate::models::TransactionRecord;

/// Order in which the explorer returns transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Most recent first
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Explorer response envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

/// Explorer API client
///
/// Built once at startup and shared; the inner `reqwest::Client` pools
/// connections across calls.
#[derive(Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ExplorerClient {
    /// Create a client with an explicit endpoint and key
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    /// Create a client from configuration
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, &config.explorer_url, config.explorer_api_key.clone())
    }

    /// Fetch the normal transactions of an account
    ///
    /// Not retried: a failed call surfaces immediately.
    pub async fn fetch_transactions(&self, address: &str, sort: SortOrder) -> SourceResult<Vec<TransactionRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingApiKey(ENV_API_KEY))?;

        log_info_indent(format!("Fetching transactions for {} ({})", address, sort), 1);

        let response = self
            .http
            .get(&self.base_url)
            .query(&txlist_query(address, sort, api_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log_warning_indent(format!("Explorer answered HTTP {}", status), 1);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        let records = parse_txlist_response(&body)?;
        log_info_indent(format!("Received {} transactions", records.len()), 1);
        Ok(records)
    }
}

/// Query parameters for the `txlist` request, covering the whole chain
pub fn txlist_query<'a>(address: &'a str, sort: SortOrder, api_key: &'a str) -> [(&'static str, &'a str); 7] {
    [
        ("module", "account"),
        ("action", "txlist"),
        ("address", address),
        ("startblock", "0"),
        ("endblock", "99999999"),
        ("sort", sort.as_str()),
        ("apikey", api_key),
    ]
}

/// Parse a `txlist` response body
///
/// - `status == "1"`: `result` is the transaction array
/// - `status == "0"` with an empty array: the account has no transactions
/// - anything else is an API error (bad key, rate limit, bad address)
pub fn parse_txlist_response(body: &str) -> SourceResult<Vec<TransactionRecord>> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

    match (envelope.status.as_str(), envelope.result) {
        ("1", result @ Value::Array(_)) => serde_json::from_value(result)
            .map_err(|e| SourceError::InvalidResponse(format!("transaction list: {}", e))),
        ("0", Value::Array(items)) if items.is_empty() => Ok(Vec::new()),
        (_, Value::String(detail)) => Err(SourceError::Api(format!("{}: {}", envelope.message, detail))),
        (status, _) => Err(SourceError::Api(format!(
            "status {}: {}",
            status, envelope.message
        ))),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
