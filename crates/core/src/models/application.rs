use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow status of an examiner application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    UnderReview,
    InterviewRequested,
    InterviewScheduled,
    InterviewCompleted,
    Approved,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::InterviewRequested => "INTERVIEW_REQUESTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::InterviewCompleted => "INTERVIEW_COMPLETED",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    /// Status after one of the application's slots became BOOKED.
    pub fn after_booking(self) -> Option<Self> {
        match self {
            ApplicationStatus::InterviewRequested => Some(ApplicationStatus::InterviewScheduled),
            _ => None,
        }
    }

    /// Status after the examiner proposed interview slots.
    pub fn after_slot_request(self) -> Option<Self> {
        match self {
            ApplicationStatus::Pending | ApplicationStatus::UnderReview => {
                Some(ApplicationStatus::InterviewRequested)
            }
            _ => None,
        }
    }

    /// Status after the application's booked slot was cancelled.
    pub fn after_booking_cancelled(self) -> Option<Self> {
        match self {
            ApplicationStatus::InterviewScheduled => Some(ApplicationStatus::InterviewRequested),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "UNDER_REVIEW" => Ok(ApplicationStatus::UnderReview),
            "INTERVIEW_REQUESTED" => Ok(ApplicationStatus::InterviewRequested),
            "INTERVIEW_SCHEDULED" => Ok(ApplicationStatus::InterviewScheduled),
            "INTERVIEW_COMPLETED" => Ok(ApplicationStatus::InterviewCompleted),
            "APPROVED" => Ok(ApplicationStatus::Approved),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            "WITHDRAWN" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(status: ApplicationStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            created_at: now,
            updated_at: now,
        }
    }
}
