//! REST API types.
//!
//! The JSON view carries the same header and rows as the CSV download,
//! so a client can preview an export before saving it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::encoder::Quoting;
use crate::models::{PriceQuote, RecordShape};
use crate::source::SortOrder;
use crate::transform::pipeline::{ExportOptions, ExportResult};

/// Query parameters accepted by the export endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    /// Record cap; `0` removes it
    pub limit: Option<usize>,
    /// Quote cells containing delimiters
    pub quote: bool,
    /// `asc` or `desc` (transactions only)
    pub sort: Option<String>,
}

impl ExportQuery {
    /// Merge the query into the server defaults
    pub fn options(&self, defaults: &ExportOptions) -> ExportOptions {
        let mut options = defaults.clone();
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        if self.quote {
            options = options.with_quoting(Quoting::Rfc4180);
        }
        options
    }

    pub fn sort_order(&self) -> Result<SortOrder, String> {
        self.sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// JSON view of an export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    /// Unique export identifier
    pub export_id: String,

    /// Status: "ready"
    pub status: String,

    pub address: String,
    pub shape: RecordShape,

    /// Suggested download name
    pub filename: String,

    pub generated_at: DateTime<Utc>,

    /// Body rows returned
    pub count: usize,

    /// Records available before the cap
    pub total_available: usize,

    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<ExportResult> for ProjectionResponse {
    fn from(export: ExportResult) -> Self {
        Self {
            export_id: export.export_id,
            status: "ready".to_string(),
            address: export.address,
            shape: export.shape,
            filename: export.filename,
            generated_at: export.generated_at,
            count: export.record_count,
            total_available: export.total_available,
            headers: export.document.headers().to_vec(),
            rows: export.document.rows().to_vec(),
        }
    }
}

/// Price ticker response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesResponse {
    pub status: String,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
    pub prices: Vec<PriceQuote>,
}

impl PricesResponse {
    pub fn new(prices: Vec<PriceQuote>) -> Self {
        Self {
            status: "ok".to_string(),
            currency: "usd".to_string(),
            fetched_at: Utc::now(),
            prices,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
        "count": 0,
        "headers": [],
        "rows": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::build_export;

    #[test]
    fn test_response_from_export() {
        let records = vec![
            json!({"recipient": "0xAB", "txid": "0xCD"}),
            json!({"recipient": "0xEF", "txid": "0x01"}),
        ];
        let export = build_export("0xme", RecordShape::Attestations, &records, &ExportOptions::default()).unwrap();
        let response = ProjectionResponse::from(export);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["shape"], "attestations");
        assert_eq!(json["count"], 2);
        assert_eq!(json["headers"], json!(["Recipient", "Transaction ID"]));
        assert_eq!(json["rows"][1], json!(["0xEF", "0x01"]));
        assert_eq!(json["filename"], "0xme_attestations.csv");
        assert!(json["exportId"].is_string());
    }

    #[test]
    fn test_query_options() {
        let defaults = ExportOptions::default();

        let query = ExportQuery::default();
        assert_eq!(query.options(&defaults), defaults);

        let query = ExportQuery { limit: Some(5), quote: true, sort: None };
        let options = query.options(&defaults);
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.quoting, Quoting::Rfc4180);

        let query = ExportQuery { limit: Some(0), ..Default::default() };
        assert_eq!(query.options(&defaults).limit, None);
    }

    #[test]
    fn test_query_sort_order() {
        assert_eq!(ExportQuery::default().sort_order().unwrap(), SortOrder::Desc);
        let query = ExportQuery { sort: Some("asc".into()), ..Default::default() };
        assert_eq!(query.sort_order().unwrap(), SortOrder::Asc);
        let query = ExportQuery { sort: Some("up".into()), ..Default::default() };
        assert!(query.sort_order().is_err());
    }

    #[test]
    fn test_prices_response() {
        let response = PricesResponse::new(vec![PriceQuote::new("ethereum", "ETH", 3500.25)]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["prices"][0]["symbol"], "ETH");
        assert_eq!(json["prices"][0]["usd"], 3500.25);
        assert!(json["fetchedAt"].is_string());
    }

    #[test]
    fn test_error_response() {
        let json = error_response("No attestations found for this address");
        assert_eq!(json["status"], "error");
        assert_eq!(json["rows"], json!([]));
    }
}
