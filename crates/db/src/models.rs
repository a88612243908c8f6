use chrono::{DateTime, Utc};
use eyre::{Report, eyre};
use serde::{Deserialize, Serialize};
use slotbook_core::models::{Application, ApplicationStatus, InterviewSlot, SlotStatus};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbInterviewSlot {
    pub id: Uuid,
    pub application_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbApplication {
    pub id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbInterviewSlot> for InterviewSlot {
    type Error = Report;

    fn try_from(row: DbInterviewSlot) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<SlotStatus>()
            .map_err(|e| eyre!("interview slot {}: {}", row.id, e))?;
        Ok(InterviewSlot {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_minutes: row.duration_minutes,
            status,
            application_id: row.application_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

impl TryFrom<DbApplication> for Application {
    type Error = Report;

    fn try_from(row: DbApplication) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(|e| eyre!("application {}: {}", row.id, e))?;
        Ok(Application {
            id: row.id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> DbInterviewSlot {
        let now = Utc::now();
        DbInterviewSlot {
            id: Uuid::new_v4(),
            application_id: None,
            start_time: now,
            end_time: now + chrono::Duration::minutes(15),
            duration_minutes: 15,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn converts_slot_rows() {
        let slot = InterviewSlot::try_from(row("REQUESTED")).unwrap();
        assert_eq!(slot.status, SlotStatus::Requested);
        assert_eq!(slot.duration_minutes, 15);
    }

    #[test]
    fn rejects_unknown_slot_status() {
        let err = InterviewSlot::try_from(row("HELD")).unwrap_err();
        assert!(err.to_string().contains("unknown slot status"));
    }

    #[test]
    fn converts_application_rows() {
        let now = Utc::now();
        let application = Application::try_from(DbApplication {
            id: Uuid::new_v4(),
            status: "INTERVIEW_REQUESTED".to_string(),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
        assert_eq!(application.status, ApplicationStatus::InterviewRequested);
    }
}
