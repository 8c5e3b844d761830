//! The query/stream/persist contract the engine consumes.
//!
//! The engine never decides how rows are stored. It asks for:
//! - the id of a named search method
//! - the targets that still lack a model state
//! - an ascending-date stream of data points for one target
//!
//! and hands back finished model states for insertion. `MemoryStore` is the
//! in-process implementation used by the CLI and the tests.

pub mod memory;

pub use memory::*;

use crate::domain::{ClientId, DataPoint, DataPointQuery, MethodId, MissingTarget, ModelState};
use crate::error::StoreError;

/// A finite stream of rows; an `Err` item aborts whoever is consuming it.
pub type RowStream<'a, T> = Box<dyn Iterator<Item = Result<T, StoreError>> + 'a>;

/// Data-access collaborator.
///
/// Every method may be called from several worker threads at once, and every
/// stream is independent of any other stream returned earlier.
pub trait Store: Sync {
    /// Look up a registered search method by name.
    fn resolve_method_id(&self, name: &str) -> Result<MethodId, StoreError>;

    /// Targets of `client_id` that have no model state under `method_id`.
    fn missing_targets(
        &self,
        client_id: ClientId,
        method_id: MethodId,
    ) -> Result<RowStream<'_, MissingTarget>, StoreError>;

    /// Data points inside `query`, in ascending date order.
    fn data_points(&self, query: &DataPointQuery) -> Result<RowStream<'_, DataPoint>, StoreError>;

    /// Insert a model state and return its new id.
    fn persist_model_state(&self, state: &ModelState) -> Result<i64, StoreError>;
}
