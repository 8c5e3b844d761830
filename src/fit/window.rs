//! Day-bucketed window buffer.
//!
//! Buckets are only ever appended. Every evaluation re-scores all of them, so
//! the MSE it reports is cumulative over the whole window seen so far.

use chrono::NaiveDate;

use crate::domain::DataPoint;

/// Data points that share one calendar date, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBucket {
    pub date: NaiveDate,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowBuffer {
    buckets: Vec<WindowBucket>,
}

impl WindowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the newest bucket if `point` shares its date, else open a new one.
    pub fn push(&mut self, point: DataPoint) {
        match self.buckets.last_mut() {
            Some(bucket) if bucket.date == point.date => bucket.points.push(point),
            _ => self.buckets.push(WindowBucket {
                date: point.date,
                points: vec![point],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> &[WindowBucket] {
        &self.buckets
    }

    /// Date of the oldest bucket.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.buckets.first().map(|b| b.date)
    }

    pub fn point_count(&self) -> usize {
        self.buckets.iter().map(|b| b.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, intensity: f64) -> DataPoint {
        DataPoint {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            intensity,
            reps: 3.0,
            effort: 8.0,
            sets: 2.0,
            inter_workout_fatigue: 0.1,
            inter_exercise_fatigue: 0.2,
        }
    }

    #[test]
    fn groups_consecutive_points_by_date() {
        let mut buf = WindowBuffer::new();
        assert!(buf.is_empty());

        buf.push(point(1, 0.1));
        buf.push(point(1, 0.2));
        buf.push(point(3, 0.3));

        assert_eq!(buf.buckets().len(), 2);
        assert_eq!(buf.buckets()[0].points.len(), 2);
        assert_eq!(buf.buckets()[1].date, point(3, 0.0).date);
        assert_eq!(buf.first_date(), Some(point(1, 0.0).date));
        assert_eq!(buf.point_count(), 3);
    }
}
