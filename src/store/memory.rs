//! In-memory store backed by plain vectors.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::domain::{
    ClientId, DataPoint, DataPointQuery, MethodId, MissingTarget, ModelState, TrainingLog,
};
use crate::error::StoreError;
use crate::store::{RowStream, Store};

#[derive(Debug, Default)]
pub struct MemoryStore {
    methods: HashMap<String, MethodId>,
    logs: Vec<TrainingLog>,
    states: Mutex<Vec<ModelState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a search method, returning its id. Re-registering is a no-op.
    pub fn register_method(&mut self, name: &str) -> MethodId {
        let next = self.methods.len() as MethodId + 1;
        *self.methods.entry(name.to_string()).or_insert(next)
    }

    pub fn insert_logs(&mut self, rows: impl IntoIterator<Item = TrainingLog>) {
        self.logs.extend(rows);
    }

    /// Snapshot of every persisted model state, in insertion order.
    pub fn model_states(&self) -> Result<Vec<ModelState>, StoreError> {
        let states = self
            .states
            .lock()
            .map_err(|_| StoreError::Query("model state table lock poisoned".to_string()))?;
        Ok(states.clone())
    }
}

impl Store for MemoryStore {
    fn resolve_method_id(&self, name: &str) -> Result<MethodId, StoreError> {
        self.methods
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownMethod(name.to_string()))
    }

    fn missing_targets(
        &self,
        client_id: ClientId,
        method_id: MethodId,
    ) -> Result<RowStream<'_, MissingTarget>, StoreError> {
        let existing: BTreeSet<MissingTarget> = self
            .model_states()?
            .iter()
            .filter(|ms| ms.method_id == method_id)
            .map(ModelState::target)
            .collect();

        let targets: BTreeSet<MissingTarget> = self
            .logs
            .iter()
            .filter(|row| row.client_id == client_id)
            .map(|row| MissingTarget {
                client_id: row.client_id,
                exercise_id: row.exercise_id,
                date: row.point.date,
            })
            .filter(|t| !existing.contains(t))
            .collect();

        Ok(Box::new(targets.into_iter().map(Ok)))
    }

    fn data_points(&self, query: &DataPointQuery) -> Result<RowStream<'_, DataPoint>, StoreError> {
        if query.start > query.end {
            return Err(StoreError::Query(format!(
                "empty date range {}..{}",
                query.start, query.end
            )));
        }
        let mut points: Vec<DataPoint> = self
            .logs
            .iter()
            .filter(|row| {
                row.client_id == query.client_id
                    && row.exercise_id == query.exercise_id
                    && query.contains(row.point.date)
            })
            .map(|row| row.point)
            .collect();
        // Stable: rows logged on the same day keep their insertion order.
        points.sort_by_key(|p| p.date);

        Ok(Box::new(points.into_iter().map(Ok)))
    }

    fn persist_model_state(&self, state: &ModelState) -> Result<i64, StoreError> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| StoreError::Persist("model state table lock poisoned".to_string()))?;
        let id = states.len() as i64 + 1;
        let mut row = state.clone();
        row.id = Some(id);
        states.push(row);
        Ok(id)
    }
}
