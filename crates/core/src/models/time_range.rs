use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{SchedulingError, SchedulingResult};
use crate::rules::duration::validate_duration;

/// Half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SchedulingResult<Self> {
        if end <= start {
            return Err(SchedulingError::Validation(format!(
                "End time {} must be after start time {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from a start time and a slot duration, rejecting
    /// durations that are not a positive multiple of 15 minutes.
    pub fn from_duration(start: DateTime<Utc>, duration_minutes: i32) -> SchedulingResult<Self> {
        validate_duration(duration_minutes)?;
        Ok(Self {
            start,
            end: start + Duration::minutes(i64::from(duration_minutes)),
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `true` when the two ranges share any instant. Touching ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        other.start < self.end && other.end > self.start
    }
}
