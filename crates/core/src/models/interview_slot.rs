use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_range::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Requested,
    Booked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Requested => "REQUESTED",
            SlotStatus::Booked => "BOOKED",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(SlotStatus::Available),
            "REQUESTED" => Ok(SlotStatus::Requested),
            "BOOKED" => Ok(SlotStatus::Booked),
            other => Err(format!("unknown slot status: {}", other)),
        }
    }
}

/// A bookable interview window. Slots are never removed; cancelling or
/// superseding one sets `deleted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSlot {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: SlotStatus,
    pub application_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl InterviewSlot {
    pub fn new(
        range: TimeRange,
        status: SlotStatus,
        application_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: range.start,
            end_time: range.end,
            duration_minutes: range.duration_minutes() as i32,
            status,
            application_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Live booked slot, the only kind that blocks other bookings.
    pub fn is_booked(&self) -> bool {
        self.status == SlotStatus::Booked && !self.is_deleted()
    }

    pub fn belongs_to(&self, application_id: Uuid) -> bool {
        self.application_id == Some(application_id)
    }
}
