use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::conflict::classify;
use super::duration::{SLOT_GRANULARITY_MINUTES, validate_duration};
use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::requests::SlotSuggestion;
use crate::models::{InterviewSlot, TimeRange};

/// UTC bounds of `date` in `tz`: local midnight up to the next local midnight.
pub fn day_window(date: NaiveDate, tz: Tz) -> SchedulingResult<TimeRange> {
    let next = date
        .succ_opt()
        .ok_or_else(|| SchedulingError::Validation(format!("Date {} is out of range", date)))?;
    let start = local_midnight(date, tz)?;
    let end = local_midnight(next, tz)?;
    TimeRange::new(start, end)
}

fn local_midnight(date: NaiveDate, tz: Tz) -> SchedulingResult<DateTime<Utc>> {
    let naive: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SchedulingError::Validation(format!("Invalid date {}", date)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            SchedulingError::Validation(format!("Midnight of {} does not exist in {}", date, tz.name()))
        })
}

/// Candidate slots of one duration across a day, stepping by the slot
/// granularity. Consumed once; build a new one to start over.
pub struct SuggestionIter<'a> {
    cursor: DateTime<Utc>,
    day_end: DateTime<Utc>,
    duration: Duration,
    duration_minutes: i32,
    slots: &'a [InterviewSlot],
}

impl<'a> SuggestionIter<'a> {
    pub fn new(
        day: TimeRange,
        duration_minutes: i32,
        slots: &'a [InterviewSlot],
    ) -> SchedulingResult<Self> {
        validate_duration(duration_minutes)?;
        Ok(Self {
            cursor: day.start,
            day_end: day.end,
            duration: Duration::minutes(i64::from(duration_minutes)),
            duration_minutes,
            slots,
        })
    }
}

impl Iterator for SuggestionIter<'_> {
    type Item = SlotSuggestion;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor;
        let end = start + self.duration;
        if end > self.day_end {
            return None;
        }
        self.cursor = start + Duration::minutes(i64::from(SLOT_GRANULARITY_MINUTES));

        let candidate = TimeRange { start, end };
        let reason = classify(self.slots, &candidate);
        Some(SlotSuggestion {
            start,
            end,
            duration_minutes: self.duration_minutes,
            is_available: reason.is_none(),
            conflict_reason: reason.map(|r| r.message().to_string()),
        })
    }
}
