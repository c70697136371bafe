//! Error types for the chainexport pipeline.
//!
//! One enum per layer, from the innermost value conversion up to the HTTP
//! server:
//!
//! - [`FormatError`] - value normalization errors (minor units, selectors)
//! - [`TransformError`] - projection errors
//! - [`CsvError`] - CSV encoding errors
//! - [`SourceError`] - explorer / GraphQL fetch errors
//! - [`ConfigError`] - environment configuration errors
//! - [`PipelineError`] - top-level export orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::RecordShape;

// =============================================================================
// Value Normalization Errors
// =============================================================================

/// Errors while normalizing a single field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The value is not a non-negative decimal integer.
    #[error("'{0}' is not a non-negative decimal integer")]
    NotAnInteger(String),

    /// The value has a JSON type the operation cannot read.
    #[error("expected a string or number, found {0}")]
    UnsupportedType(String),
}

// =============================================================================
// Projection Errors
// =============================================================================

/// Errors while projecting records into a CSV document.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The projection itself is unusable.
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// A record is not a JSON object.
    #[error("Record {row} is not a JSON object")]
    NotAnObject { row: usize },

    /// A column value could not be normalized.
    #[error("Record {row}, column '{column}': {source}")]
    Format {
        row: usize,
        column: String,
        #[source]
        source: FormatError,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// CSV Encoding Errors
// =============================================================================

/// Errors from the quoted CSV writer.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Writer failure.
    #[error("CSV writer error: {0}")]
    Writer(#[from] csv::Error),

    /// The writer could not be flushed into its buffer.
    #[error("CSV flush error: {0}")]
    Flush(String),

    /// Encoded output is not UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Record Source Errors
// =============================================================================

/// Errors from the explorer and attestation clients.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No API key configured for the explorer.
    #[error("Missing {0} environment variable")]
    MissingApiKey(&'static str),

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with an error payload.
    #[error("API error: {0}")]
    Api(String),

    /// The payload does not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level export orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::build_export`] and
/// the fetching wrappers around it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetch error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Projection error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// The source returned nothing for this address.
    #[error("No {shape} found for this address")]
    NoRecords { shape: RecordShape },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Socket error.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for value normalization.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for projection operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for CSV encoding.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for fetch operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SourceError -> PipelineError
        let source_err = SourceError::Api("NOTOK".into());
        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("NOTOK"));

        // TransformError -> PipelineError -> ServerError
        let transform_err = TransformError::NotAnObject { row: 3 };
        let pipeline_err: PipelineError = transform_err.into();
        let server_err: ServerError = pipeline_err.into();
        assert!(server_err.to_string().contains("Record 3"));
    }

    #[test]
    fn test_format_error_in_transform_error() {
        let err = TransformError::Format {
            row: 7,
            column: "Value (ETH)".into(),
            source: FormatError::NotAnInteger("abc".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("Record 7"));
        assert!(msg.contains("Value (ETH)"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_no_records_names_shape() {
        let err = PipelineError::NoRecords {
            shape: RecordShape::Attestations,
        };
        assert_eq!(err.to_string(), "No attestations found for this address");
    }
}
