//! Data sources that feed the engine outside of a real store.

pub mod sample;

pub use sample::*;
