//! Domain types used throughout the search.
//!
//! This module defines:
//!
//! - workout-log observations (`DataPoint`, `TrainingLog`)
//! - units of work and store queries (`MissingTarget`, `DataPointQuery`)
//! - the search result (`ModelState`)
//! - run configuration (`FitConfig`)

pub mod types;

pub use types::*;
