//! Intensity model implementations.
//!
//! Models are implemented as small, pure functions so that the accumulator and
//! the evaluator can stay generic over the design row.

pub mod model;

pub use model::*;
