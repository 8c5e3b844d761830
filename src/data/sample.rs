//! Synthetic training-log generation from known model coefficients.
//!
//! Intensity is produced by the fatigue-aware model itself, optionally with
//! Gaussian noise, so a search over the generated log should recover the
//! coefficients it was built from.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::domain::{COEFFICIENT_COUNT, ClientId, DataPoint, ExerciseId, TrainingLog};
use crate::error::AppError;
use crate::models::predict;

/// Coefficients used when the caller does not supply any.
pub const DEFAULT_COEFFICIENTS: [f64; COEFFICIENT_COUNT] =
    [0.95, 0.08, 0.05, 0.004, 0.006, 0.01, 0.003];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub client_id: ClientId,
    pub exercise_ids: Vec<ExerciseId>,
    pub start: NaiveDate,
    /// Calendar days covered by the log.
    pub days: u32,
    /// Train every `session_interval` days.
    pub session_interval: u32,
    pub points_per_session: usize,
    pub coefficients: [f64; COEFFICIENT_COUNT],
    /// Standard deviation of the noise added to intensity.
    pub noise_sd: f64,
    pub seed: u64,
}

/// Generate a deterministic training log for every configured exercise.
pub fn generate_training_log(config: &SampleConfig) -> Result<Vec<TrainingLog>, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Sample days must be > 0."));
    }
    if config.session_interval == 0 {
        return Err(AppError::new(2, "Session interval must be > 0."));
    }
    if config.points_per_session == 0 {
        return Err(AppError::new(2, "Points per session must be > 0."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }
    if config.exercise_ids.is_empty() {
        return Err(AppError::new(2, "At least one exercise id is required."));
    }

    let mut rows = Vec::new();
    for &exercise_id in &config.exercise_ids {
        // One RNG per exercise so adding an exercise leaves the others unchanged.
        let mut rng = StdRng::seed_from_u64(sample_seed(config, exercise_id));
        for offset in (0..config.days).step_by(config.session_interval as usize) {
            let date = config
                .start
                .checked_add_signed(Duration::days(offset as i64))
                .ok_or_else(|| AppError::new(2, "Sample date range overflows the calendar."))?;
            for _ in 0..config.points_per_session {
                rows.push(TrainingLog {
                    client_id: config.client_id,
                    exercise_id,
                    point: synthetic_point(&mut rng, date, &config.coefficients, config.noise_sd),
                });
            }
        }
    }
    Ok(rows)
}

/// Draw one plausible workout and label it with the model's intensity.
pub fn synthetic_point<R: Rng + ?Sized>(
    rng: &mut R,
    date: NaiveDate,
    coefficients: &[f64; COEFFICIENT_COUNT],
    noise_sd: f64,
) -> DataPoint {
    let mut point = DataPoint {
        date,
        intensity: 0.0,
        reps: rng.gen_range(1..=10) as f64,
        effort: (rng.gen_range(6.0..=10.0_f64) * 2.0).round() / 2.0,
        sets: rng.gen_range(1..=6) as f64,
        inter_workout_fatigue: rng.gen_range(0.0..1.0),
        inter_exercise_fatigue: rng.gen_range(0.0..1.0),
    };
    let noise = if noise_sd > 0.0 {
        let z: f64 = rng.sample(StandardNormal);
        z * noise_sd
    } else {
        0.0
    };
    point.intensity = predict(coefficients, &point).unwrap_or(0.0) + noise;
    point
}

fn sample_seed(config: &SampleConfig, exercise_id: ExerciseId) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.client_id.hash(&mut hasher);
    exercise_id.hash(&mut hasher);
    config.start.hash(&mut hasher);
    hasher.finish()
}
