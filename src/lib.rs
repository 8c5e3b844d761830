//! `lift-model` library crate.
//!
//! The binary (`lift`) is a thin wrapper around this library so that:
//!
//! - the search engine is testable without spawning processes
//! - other front-ends can plug in their own `store::Store`
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod store;
