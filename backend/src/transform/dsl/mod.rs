//! DSL (Domain Specific Language) for record to CSV projection
//!
//! This module provides:
//! - `projection`: Column list definition (built-in or loaded from JSON)
//! - `operations`: Available value operations
//! - `executor`: Execute projections on records
//!
//! ## Usage Flow
//!
//! ```text
//! Records (JSON) → executor::project(Projection) → CsvDocument → encode
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chainexport::transform::dsl::{project_records, transaction_projection};
//! use chainexport::models::TransactionRecord;
//!
//! let records = vec![TransactionRecord::new(
//!     "0xabc",
//!     Some("0xa9059cbb0000000000000000"),
//!     "0xfrom",
//!     "0xto",
//!     "1000000000000000000",
//! )];
//!
//! let doc = project_records(&records, &transaction_projection()).unwrap();
//! assert_eq!(
//!     doc.to_literal_csv(),
//!     "Transaction Hash,Method ID,From,To,Value (ETH)\n0xabc,0xa9059cbb,0xfrom,0xto,1.000000000000000000"
//! );
//! ```

pub mod executor;
pub mod operations;
pub mod projection;

// Re-exports for convenience
pub use executor::{project, project_records};
pub use operations::{operations_description, Operation};
pub use projection::{attestation_projection, transaction_projection, ColumnSpec, Projection};
