//! Sliding-window search for a single target.
//!
//! A search walks one client's exercise history, oldest first, across the
//! configured time frame:
//!
//! - every point is folded into the regression sums
//! - points dated inside the window are also kept, bucketed by day
//! - whenever the date changes and the window holds data, the evaluator
//!   re-solves and scores every bucket kept so far
//!
//! The end of the stream is not a day boundary: whatever state was best at
//! the last date change is the result.
//!
//! The window never drops a bucket, so later evaluations score a longer and
//! longer stretch of history.

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::domain::{DataPoint, DataPointQuery, MethodId, MissingTarget, ModelState};
use crate::error::ModelError;
use crate::fit::evaluator::evaluate;
use crate::fit::limits::Limits;
use crate::fit::window::WindowBuffer;
use crate::math::RegressionAccumulator;
use crate::store::Store;

/// Reusable engine configuration. Holds no per-search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindow {
    limits: Limits,
    workers: usize,
}

impl SlidingWindow {
    /// Build an engine from raw `(far, near)` day pairs.
    ///
    /// `workers` is clamped to at least one.
    pub fn new(
        time_frame: (i64, i64),
        window: (i64, i64),
        workers: usize,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            limits: Limits::new(time_frame, window)?,
            workers: workers.max(1),
        })
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run one search and return the best model state found for `target`.
    pub fn generate_model_state<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: MethodId,
        target: &MissingTarget,
    ) -> Result<ModelState, ModelError> {
        let (start, end) = self.limits.time_frame().dates(target.date)?;
        let query = DataPointQuery {
            client_id: target.client_id,
            exercise_id: target.exercise_id,
            start,
            end,
        };

        let mut scan = WindowScan::new(&self.limits, target, method_id)?;
        for point in store.data_points(&query)? {
            if scan.feed(point?)? == Step::Stop {
                break;
            }
        }
        scan.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Per-search state. Created fresh for every target and never shared.
struct WindowScan<'a> {
    limits: &'a Limits,
    target: MissingTarget,
    window_start: NaiveDate,
    window_end: NaiveDate,
    cursor: Option<NaiveDate>,
    window: WindowBuffer,
    lr: RegressionAccumulator,
    best: ModelState,
}

impl<'a> WindowScan<'a> {
    fn new(
        limits: &'a Limits,
        target: &MissingTarget,
        method_id: MethodId,
    ) -> Result<Self, ModelError> {
        let (window_start, window_end) = limits.window().dates(target.date)?;
        Ok(Self {
            limits,
            target: *target,
            window_start,
            window_end,
            cursor: None,
            window: WindowBuffer::new(),
            lr: RegressionAccumulator::new(),
            best: ModelState::unfitted(target, method_id),
        })
    }

    fn feed(&mut self, point: DataPoint) -> Result<Step, ModelError> {
        if self.cursor != Some(point.date) {
            if !self.window.is_empty() {
                let replaced = evaluate(&self.lr, &self.window, point.date, &mut self.best)?;
                debug!(
                    date = %self.target.date,
                    closed = ?self.cursor,
                    buckets = self.window.buckets().len(),
                    window_points = self.window.point_count(),
                    observations = self.lr.observations(),
                    replaced,
                    "day closed"
                );
            }
            self.cursor = Some(point.date);
        }

        if self.window_start <= point.date && point.date <= self.window_end {
            self.window.push(point);
            trace!(date = %point.date, intensity = point.intensity, "window point");
        }
        // Time-frame membership is guaranteed by the query.
        self.lr.update(&point);

        // Past the window's last day with nothing in it: no later point can help.
        if self.window.is_empty() && point.date > self.window_end {
            return Ok(Step::Stop);
        }
        Ok(Step::Continue)
    }

    /// Only day boundaries trigger an evaluation, so the newest bucket is
    /// never scored on its own. A window holding just that bucket yields the
    /// unfitted state.
    fn finish(self) -> Result<ModelState, ModelError> {
        if self.window.is_empty() {
            let window = self.limits.window();
            return Err(ModelError::InsufficientData {
                target: self.target.date,
                window_far: window.far,
                window_near: window.near,
            });
        }
        Ok(self.best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::synthetic_point;
    use crate::domain::{COEFFICIENT_COUNT, TrainingLog};
    use crate::error::{ErrorKind, StoreError};
    use crate::store::{MemoryStore, RowStream};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const C: [f64; COEFFICIENT_COUNT] = [0.92, 0.07, 0.04, 0.003, 0.006, 0.015, 0.002];

    fn target_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
    }

    fn target() -> MissingTarget {
        MissingTarget {
            client_id: 1,
            exercise_id: 3,
            date: target_date(),
        }
    }

    fn days_before(days: i64) -> NaiveDate {
        target_date() - chrono::Duration::days(days)
    }

    fn store_with(days: &[i64], per_day: usize, noise: f64, seed: u64) -> MemoryStore {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = MemoryStore::new();
        store.register_method("Sliding Window");
        for &d in days {
            store.insert_logs((0..per_day).map(|_| TrainingLog {
                client_id: 1,
                exercise_id: 3,
                point: synthetic_point(&mut rng, days_before(d), &C, noise),
            }));
        }
        store
    }

    #[test]
    fn two_noise_free_days_recover_coefficients() {
        let engine = SlidingWindow::new((10, 1), (10, 1), 1).unwrap();
        let store = store_with(&[5, 4], 12, 0.0, 21);

        let ms = engine.generate_model_state(&store, 1, &target()).unwrap();
        assert!(ms.mse < 1e-9, "mse={}", ms.mse);
        for (got, want) in ms.coefficients.iter().zip(C.iter()) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
        assert!(ms.rcond > 0.0);
        assert_eq!(ms.time_frame, 4);
        assert!(ms.window == 0 || ms.window == 1);
    }

    #[test]
    fn points_outside_the_window_are_insufficient() {
        // Time frame reaches back 60 days; the window only covers days 10..7.
        let engine = SlidingWindow::new((60, 7), (10, 7), 1).unwrap();
        let store = store_with(&[40, 30, 20, 12], 10, 0.01, 5);

        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert_eq!(
            err,
            ModelError::InsufficientData {
                target: target_date(),
                window_far: -10,
                window_near: -7,
            }
        );
    }

    #[test]
    fn empty_stream_is_insufficient() {
        let engine = SlidingWindow::new((60, 7), (10, 7), 1).unwrap();
        let store = store_with(&[], 0, 0.0, 0);
        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { .. }));
    }

    #[test]
    fn stops_once_past_an_empty_window() {
        // Window covers days 20..15; data only before and after it. Reading
        // past day 10 would hit the failing tail.
        let engine = SlidingWindow::new((60, 1), (20, 15), 1).unwrap();
        let store = BrokenStore {
            inner: store_with(&[30, 25, 10, 5], 10, 0.01, 9),
            good_points: usize::MAX,
        };
        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData, "{err:?}");
    }

    #[test]
    fn failing_tail_is_read_when_window_has_data() {
        let engine = SlidingWindow::new((60, 1), (20, 15), 1).unwrap();
        let store = BrokenStore {
            inner: store_with(&[30, 18, 10], 10, 0.01, 9),
            good_points: usize::MAX,
        };
        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataAccess, "{err:?}");
    }

    #[test]
    fn newest_day_alone_is_never_scored() {
        // The only window day is the last day streamed, so no date change
        // ever closes it.
        let engine = SlidingWindow::new((10, 1), (2, 1), 1).unwrap();
        let store = store_with(&[8, 7, 6, 5, 1], 12, 0.0, 17);

        let ms = engine.generate_model_state(&store, 1, &target()).unwrap();
        assert!(!ms.is_fitted());
        assert_eq!(ms, ModelState::unfitted(&target(), 1));
    }

    #[test]
    fn search_is_deterministic() {
        let engine = SlidingWindow::new((60, 7), (20, 7), 1).unwrap();
        let store = store_with(&[50, 45, 40, 35, 30, 25, 19, 16, 12, 9, 8], 6, 0.02, 13);

        let a = engine.generate_model_state(&store, 1, &target()).unwrap();
        let b = engine.generate_model_state(&store, 1, &target()).unwrap();
        assert!(a.approx_eq(&b, 1e-12));
        assert!(a.is_fitted());
        assert!(a.window <= 13);
        assert!((7..=60).contains(&a.time_frame));
    }

    #[test]
    fn too_little_history_is_unstable() {
        // First boundary inside the window comes after a single 3-point day.
        let engine = SlidingWindow::new((10, 1), (10, 1), 1).unwrap();
        let store = store_with(&[5, 4], 3, 0.0, 2);
        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert!(matches!(err, ModelError::NumericInstability { .. }), "{err:?}");
    }

    /// Yields `good_points` real points and then fails.
    struct BrokenStore {
        inner: MemoryStore,
        good_points: usize,
    }

    impl Store for BrokenStore {
        fn resolve_method_id(&self, name: &str) -> Result<MethodId, StoreError> {
            self.inner.resolve_method_id(name)
        }

        fn missing_targets(
            &self,
            client_id: i64,
            method_id: MethodId,
        ) -> Result<RowStream<'_, MissingTarget>, StoreError> {
            self.inner.missing_targets(client_id, method_id)
        }

        fn data_points(
            &self,
            query: &DataPointQuery,
        ) -> Result<RowStream<'_, DataPoint>, StoreError> {
            let good = self.inner.data_points(query)?.take(self.good_points);
            let bad = std::iter::once(Err(StoreError::Query("connection reset".to_string())));
            Ok(Box::new(good.chain(bad)))
        }

        fn persist_model_state(&self, state: &ModelState) -> Result<i64, StoreError> {
            self.inner.persist_model_state(state)
        }
    }

    #[test]
    fn stream_errors_pass_through() {
        let engine = SlidingWindow::new((10, 1), (10, 1), 1).unwrap();
        let store = BrokenStore {
            inner: store_with(&[5, 4], 12, 0.0, 3),
            good_points: 3,
        };
        let err = engine.generate_model_state(&store, 1, &target()).unwrap_err();
        assert_eq!(
            err,
            ModelError::DataAccess(StoreError::Query("connection reset".to_string()))
        );
    }

    #[test]
    fn workers_are_clamped_to_one() {
        let engine = SlidingWindow::new((60, 7), (10, 7), 0).unwrap();
        assert_eq!(engine.workers(), 1);
    }

    #[test]
    fn accepts_and_rejects_the_documented_configurations() {
        assert!(SlidingWindow::new((60, 7), (10, 7), 4).is_ok());
        let err = SlidingWindow::new((60, 7), (70, 7), 4).unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }
}
