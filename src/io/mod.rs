//! Input/output helpers.
//!
//! - training-log CSV ingest + validation (`ingest`)
//! - model-state and training-log exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
