//! Transformation module.
//!
//! This module turns raw records into CSV:
//! - DSL: Column specs, operations and the projector
//! - Pipeline: Fetch, cap, project and encode an export

pub mod dsl;
pub mod pipeline;

pub use dsl::*;
pub use pipeline::*;
