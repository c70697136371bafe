//! # chainexport - On-chain history to CSV
//!
//! chainexport fetches an account's transactions (from an Etherscan-compatible
//! explorer) or the attestations it made (from a GraphQL indexer) and projects
//! them into CSV files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Selection  │────▶│  Projection │────▶│  CSV text   │
//! │ (HTTP APIs) │     │ (first N)   │     │ (columns)   │     │ (+ file)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chainexport::{build_export, ExportOptions, RecordShape};
//! use serde_json::json;
//!
//! let records = vec![json!({"recipient": "0xAB", "txid": "0xCD"})];
//! let export = build_export("0xme", RecordShape::Attestations, &records, &ExportOptions::default()).unwrap();
//!
//! assert_eq!(export.filename, "0xme_attestations.csv");
//! assert_eq!(export.csv, "Recipient,Transaction ID\n0xAB,0xCD");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Record types and shapes
//! - [`units`] - Selector extraction and exact unit conversion
//! - [`encoder`] - CSV document and encoding
//! - [`transform`] - Projection DSL and export pipeline
//! - [`source`] - Explorer, attestation and price clients
//! - [`config`] - Environment configuration
//! - [`export`] - File names and saving
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod units;

// Encoding
pub mod encoder;

// Transformation
pub mod transform;

// Record sources
pub mod source;

// Configuration
pub mod config;

// Export sink
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    FormatError,
    PipelineError,
    PipelineResult,
    ServerError,
    SourceError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AttestationRecord, PriceQuote, RecordShape, TransactionRecord};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use units::{from_minor_units, method_selector};

// =============================================================================
// Re-exports - CSV
// =============================================================================

pub use encoder::{encode_rows, CsvDocument, Quoting};

// =============================================================================
// Re-exports - DSL
// =============================================================================

pub use transform::dsl::{
    attestation_projection,
    operations_description,
    project,
    project_records,
    transaction_projection,
    ColumnSpec,
    Operation,
    Projection,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_export,
    build_export_with_projection,
    export_attestations,
    export_transactions,
    select_recent,
    ExportOptions,
    ExportResult,
};

// =============================================================================
// Re-exports - Sources, Config, Sink
// =============================================================================

pub use config::Config;
pub use export::{export_filename, write_export};
pub use source::{AttestationClient, ExplorerClient, PriceClient, SortOrder, Sources};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ExportQuery, PricesResponse, ProjectionResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
