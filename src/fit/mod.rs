//! Sliding-window model search.
//!
//! Responsibilities:
//!
//! - validate time-frame/window limits (`limits`)
//! - scan one target's history day by day (`scanner`, `window`)
//! - score the regression against the window (`evaluator`)
//! - discover missing targets and run searches in parallel (`coordinator`)

pub mod coordinator;
pub mod evaluator;
pub mod limits;
pub mod scanner;
pub mod window;

pub use coordinator::*;
pub use evaluator::*;
pub use limits::*;
pub use scanner::*;
pub use window::*;
