//! Mathematical utilities: incremental least squares and error metrics.

pub mod ols;
pub mod residuals;

pub use ols::*;
pub use residuals::*;
