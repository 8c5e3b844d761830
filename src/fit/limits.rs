//! Time-frame and window limits.
//!
//! Both limits are pairs of day offsets relative to a target date. Callers may
//! pass magnitudes with either sign; we always store backward-looking
//! (non-positive) offsets, first the farther bound, then the nearer one.
//!
//! `(60, 7)` therefore means "from 60 days before the target up to 7 days
//! before it", stored as `far = -60, near = -7`.

use chrono::{NaiveDate, TimeDelta};

use crate::error::ModelError;

/// An inclusive range of day offsets, `far <= near <= 0` once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub far: i64,
    pub near: i64,
}

impl DayRange {
    /// Normalize a raw, sign-agnostic pair to negative offsets.
    pub fn from_raw(far: i64, near: i64) -> Self {
        Self {
            far: -far.saturating_abs(),
            near: -near.saturating_abs(),
        }
    }

    /// Absolute inclusive date bounds `(start, end)` around `target`.
    pub fn dates(&self, target: NaiveDate) -> Result<(NaiveDate, NaiveDate), ModelError> {
        Ok((shift(target, self.far)?, shift(target, self.near)?))
    }
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, ModelError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| {
            ModelError::Configuration(format!("offset of {days} days from {date} is out of range"))
        })
}

/// Validated time-frame and window limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    time_frame: DayRange,
    window: DayRange,
}

impl Limits {
    /// Normalize and validate raw `(far, near)` pairs.
    ///
    /// The window must nest inside the time frame. The four relations are
    /// checked in order and the first violation is reported.
    pub fn new(time_frame: (i64, i64), window: (i64, i64)) -> Result<Self, ModelError> {
        let tf = DayRange::from_raw(time_frame.0, time_frame.1);
        let win = DayRange::from_raw(window.0, window.1);

        if tf.far > tf.near {
            return Err(ModelError::Configuration(format!(
                "time frame far bound {} is nearer than its near bound {}",
                tf.far, tf.near
            )));
        }
        if win.far > win.near {
            return Err(ModelError::Configuration(format!(
                "window far bound {} is nearer than its near bound {}",
                win.far, win.near
            )));
        }
        if win.near > tf.near {
            return Err(ModelError::Configuration(format!(
                "window near bound {} exceeds time frame near bound {}",
                win.near, tf.near
            )));
        }
        if win.far < tf.far {
            return Err(ModelError::Configuration(format!(
                "window far bound {} reaches past time frame far bound {}",
                win.far, tf.far
            )));
        }

        Ok(Self {
            time_frame: tf,
            window: win,
        })
    }

    pub fn time_frame(&self) -> DayRange {
        self.time_frame
    }

    pub fn window(&self) -> DayRange {
        self.window
    }
}
