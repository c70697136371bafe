//! Projection definition
//!
//! A projection is the ordered list of CSV columns produced from one record shape.

use serde::{Deserialize, Serialize};

use super::operations::Operation;
use crate::error::{TransformError, TransformResult};
use crate::models::RecordShape;
use crate::units::WEI_DECIMALS;

/// A complete projection: one [`ColumnSpec`] per output column, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Version of the projection format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Output columns, left to right
    pub columns: Vec<ColumnSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// How one CSV column is computed from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Header cell
    pub header: String,

    /// Record field to read
    pub source: String,

    /// Ordered list of operations to apply
    #[serde(default)]
    pub operations: Vec<Operation>,

    /// Cell written when the field is absent and no operation produced a value
    #[serde(default)]
    pub default: Option<String>,
}

impl Projection {
    /// Create a projection from a column list
    pub fn new(description: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            version: default_version(),
            description: description.to_string(),
            columns,
        }
    }

    /// Built-in projection for a record shape
    pub fn for_shape(shape: RecordShape) -> Self {
        match shape {
            RecordShape::Transactions => transaction_projection(),
            RecordShape::Attestations => attestation_projection(),
        }
    }

    /// Parse a projection from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Header row
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header.clone()).collect()
    }

    /// Check the projection can produce a well-formed header row
    pub fn validate(&self) -> TransformResult<()> {
        if self.columns.is_empty() {
            return Err(TransformError::InvalidProjection("no columns".to_string()));
        }
        if let Some(idx) = self.columns.iter().position(|c| c.header.trim().is_empty()) {
            return Err(TransformError::InvalidProjection(format!(
                "column {} has an empty header",
                idx
            )));
        }
        Ok(())
    }
}

impl ColumnSpec {
    /// Create a column copying a record field unchanged
    pub fn from_source(header: &str, source: &str) -> Self {
        Self {
            header: header.to_string(),
            source: source.to_string(),
            operations: Vec::new(),
            default: None,
        }
    }

    /// Add an operation to the chain
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Set the default cell
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// Projection of explorer transactions
///
/// `Transaction Hash, Method ID, From, To, Value (ETH)`
pub fn transaction_projection() -> Projection {
    Projection::new(
        "Account transactions with method selector and value in ETH",
        vec![
            ColumnSpec::from_source("Transaction Hash", "hash"),
            ColumnSpec::from_source("Method ID", "input").with_operation(Operation::method_selector()),
            ColumnSpec::from_source("From", "from"),
            ColumnSpec::from_source("To", "to"),
            ColumnSpec::from_source("Value (ETH)", "value")
                .with_operation(Operation::from_minor_units(WEI_DECIMALS)),
        ],
    )
}

/// Projection of attestations
///
/// `Recipient, Transaction ID`
pub fn attestation_projection() -> Projection {
    Projection::new(
        "Attestations made by an account",
        vec![
            ColumnSpec::from_source("Recipient", "recipient"),
            ColumnSpec::from_source("Transaction ID", "txid"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_serialization() {
        let projection = transaction_projection();
        let json = projection.to_json().unwrap();
        let parsed = Projection::from_json(&json).unwrap();
        assert_eq!(parsed, projection);
    }

    #[test]
    fn test_builtin_headers() {
        assert_eq!(
            transaction_projection().headers(),
            vec!["Transaction Hash", "Method ID", "From", "To", "Value (ETH)"]
        );
        assert_eq!(
            Projection::for_shape(RecordShape::Attestations).headers(),
            vec!["Recipient", "Transaction ID"]
        );
    }

    #[test]
    fn test_minimal_json() {
        let projection = Projection::from_json(
            r#"{"columns": [{"header": "Hash", "source": "hash"}]}"#,
        )
        .unwrap();
        assert_eq!(projection.version, "1.0");
        assert!(projection.columns[0].operations.is_empty());
        assert!(projection.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let empty = Projection::new("empty", Vec::new());
        assert!(matches!(empty.validate(), Err(TransformError::InvalidProjection(_))));

        let blank_header = Projection::new("blank", vec![ColumnSpec::from_source(" ", "hash")]);
        assert!(blank_header.validate().is_err());
    }
}
