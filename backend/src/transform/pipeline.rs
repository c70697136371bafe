//! High-level pipeline API: fetch, select, project, encode.
//!
//! # Example
//!
//! ```rust,ignore
//! use chainexport::config::Config;
//! use chainexport::transform::pipeline::{export_transactions, ExportOptions};
//! use chainexport::source::{Sources, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let sources = Sources::from_config(&config)?;
//!     let export = export_transactions(
//!         &sources.explorer,
//!         "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
//!         SortOrder::Desc,
//!         &ExportOptions::from_config(&config),
//!     ).await?;
//!
//!     println!("{} rows -> {}", export.record_count, export.filename);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::config::Config;
use crate::encoder::{CsvDocument, Quoting};
use crate::error::{PipelineError, PipelineResult, TransformError};
use crate::export::export_filename;
use crate::models::RecordShape;
use crate::source::{AttestationClient, ExplorerClient, SortOrder};
use crate::transform::dsl::{project, Projection};

/// Options for an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Keep only the first `limit` records in source order (`None` keeps all)
    pub limit: Option<usize>,

    /// Cell quoting policy
    pub quoting: Quoting,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            limit: Some(crate::config::DEFAULT_RECORD_LIMIT),
            quoting: Quoting::Literal,
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self::default().with_limit(config.record_limit)
    }

    /// Override the record cap; `0` removes it
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    pub fn with_quoting(mut self, quoting: Quoting) -> Self {
        self.quoting = quoting;
        self
    }
}

/// Result of an export
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub export_id: String,
    pub address: String,
    pub shape: RecordShape,
    /// Suggested file name, `<address>_<shape>.csv`
    pub filename: String,
    /// Encoded CSV text
    pub csv: String,
    /// Body rows written
    pub record_count: usize,
    /// Records the source returned before the cap
    pub total_available: usize,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub document: CsvDocument,
}

/// Keep the first `limit` records, in the order given
///
/// The source already sorts (most recent first by default); nothing is
/// reordered here.
pub fn select_recent<T>(records: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(limit) => &records[..records.len().min(limit)],
        None => records,
    }
}

/// Build an export from records with the built-in projection for `shape`.
///
/// An empty record set is reported as [`PipelineError::NoRecords`] instead
/// of producing a header-only file.
pub fn build_export(
    address: &str,
    shape: RecordShape,
    records: &[Value],
    options: &ExportOptions,
) -> PipelineResult<ExportResult> {
    build_export_with_projection(address, shape, records, &Projection::for_shape(shape), options)
}

/// Build an export with an explicit projection
pub fn build_export_with_projection(
    address: &str,
    shape: RecordShape,
    records: &[Value],
    projection: &Projection,
    options: &ExportOptions,
) -> PipelineResult<ExportResult> {
    if records.is_empty() {
        log_warning(format!("No {} found for {}", shape, address));
        return Err(PipelineError::NoRecords { shape });
    }

    let selected = select_recent(records, options.limit);
    if selected.len() < records.len() {
        log_info(format!(
            "Keeping {} of {} {}",
            selected.len(),
            records.len(),
            shape
        ));
    }

    log_info(format!("Projecting {} columns", projection.columns.len()));
    let document = project(selected, projection)?;
    let csv = document.encode(options.quoting)?;

    let filename = export_filename(address, shape);
    log_success(format!("{} rows ready as {}", document.len(), filename));

    Ok(ExportResult {
        export_id: Uuid::new_v4().to_string(),
        address: address.to_string(),
        shape,
        filename,
        csv,
        record_count: document.len(),
        total_available: records.len(),
        generated_at: Utc::now(),
        document,
    })
}

/// Fetch an account's transactions and build the export
pub async fn export_transactions(
    explorer: &ExplorerClient,
    address: &str,
    sort: SortOrder,
    options: &ExportOptions,
) -> PipelineResult<ExportResult> {
    log_info(format!("Exporting transactions of {}", address));
    let records = explorer.fetch_transactions(address, sort).await?;
    let values = to_values(&records)?;
    build_export(address, RecordShape::Transactions, &values, options)
}

/// Fetch the attestations made by an account and build the export
pub async fn export_attestations(
    attestations: &AttestationClient,
    address: &str,
    options: &ExportOptions,
) -> PipelineResult<ExportResult> {
    log_info(format!("Exporting attestations of {}", address));
    let records = attestations.fetch_attestations(address).await?;
    let values = to_values(&records)?;
    build_export(address, RecordShape::Attestations, &values, options)
}

fn to_values<T: Serialize>(records: &[T]) -> Result<Vec<Value>, TransformError> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(TransformError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttestationRecord, TransactionRecord};
    use serde_json::json;

    fn transactions(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                serde_json::to_value(TransactionRecord::new(
                    format!("0x{:02x}", i),
                    Some("0xa9059cbb00000000"),
                    "0xfrom",
                    "0xto",
                    (i * 1_000_000_000_000_000).to_string(),
                ))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_default_options() {
        let opts = ExportOptions::default();
        assert_eq!(opts.limit, Some(100));
        assert_eq!(opts.quoting, Quoting::Literal);
        assert_eq!(ExportOptions::default().with_limit(0).limit, None);
    }

    #[test]
    fn test_select_recent_keeps_prefix() {
        let items = [5, 4, 3, 2, 1];
        assert_eq!(select_recent(&items, Some(3)), &[5, 4, 3]);
        assert_eq!(select_recent(&items, Some(10)), &items);
        assert_eq!(select_recent(&items, None), &items);
    }

    #[test]
    fn test_build_export_truncates() {
        let records = transactions(150);
        let export = build_export("0xabc", RecordShape::Transactions, &records, &ExportOptions::default()).unwrap();

        assert_eq!(export.record_count, 100);
        assert_eq!(export.total_available, 150);
        assert_eq!(export.filename, "0xabc_transactions.csv");

        let lines: Vec<&str> = export.csv.split('\n').collect();
        assert_eq!(lines.len(), 101);
        assert_eq!(lines[0], "Transaction Hash,Method ID,From,To,Value (ETH)");
        assert!(lines[1].starts_with("0x00,0xa9059cbb,"));
        assert!(lines[100].starts_with("0x63,"));
        assert!(!export.csv.ends_with('\n'));
    }

    #[test]
    fn test_build_export_empty() {
        let err = build_export("0xabc", RecordShape::Attestations, &[], &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::NoRecords { shape: RecordShape::Attestations }));
    }

    #[test]
    fn test_build_export_attestations() {
        let records = vec![serde_json::to_value(AttestationRecord::new("0xAB", "0xCD")).unwrap()];
        let export = build_export("0xme", RecordShape::Attestations, &records, &ExportOptions::default()).unwrap();
        assert_eq!(export.csv, "Recipient,Transaction ID\n0xAB,0xCD");
        assert_eq!(export.filename, "0xme_attestations.csv");
    }

    #[test]
    fn test_build_export_quoted() {
        let records = vec![json!({"recipient": "0xAB,0xEF", "txid": "0xCD"})];
        let options = ExportOptions::default().with_quoting(Quoting::Rfc4180);
        let export = build_export("0xme", RecordShape::Attestations, &records, &options).unwrap();
        assert_eq!(export.csv, "Recipient,Transaction ID\n\"0xAB,0xEF\",0xCD");
    }

    #[test]
    fn test_build_export_propagates_format_error() {
        let records = vec![json!({"hash": "0x1", "value": "1.5"})];
        let err = build_export("0xabc", RecordShape::Transactions, &records, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::Format { row: 0, .. })));
    }

    #[test]
    fn test_export_result_json_skips_document() {
        let records = transactions(1);
        let export = build_export("0xabc", RecordShape::Transactions, &records, &ExportOptions::default()).unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["recordCount"], 1);
        assert_eq!(json["shape"], "transactions");
        assert!(json.get("document").is_none());
    }
}
