use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Report;
use slotbook_core::errors::{SchedulingError, SchedulingResult};
use slotbook_core::models::{Application, ApplicationStatus, InterviewSlot, TimeRange};
use slotbook_core::store::{SlotStore, SlotTransaction};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{application, interview_slot};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Maps a repository failure to the scheduler's error taxonomy. Constraint
/// violations raised by the booking guards become conflicts; everything else
/// is a database error.
pub fn into_scheduling_error(report: Report) -> SchedulingError {
    if let Some(sqlx::Error::Database(db_err)) = report.downcast_ref::<sqlx::Error>() {
        match db_err.code().as_deref() {
            Some(EXCLUSION_VIOLATION) => {
                return SchedulingError::Conflict(
                    "Time range overlaps an existing booking".to_string(),
                );
            }
            Some(UNIQUE_VIOLATION) => {
                return SchedulingError::Conflict(
                    "Application already has a booked interview slot".to_string(),
                );
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return SchedulingError::NotFound(
                    "Referenced application does not exist".to_string(),
                );
            }
            _ => {}
        }
    }
    SchedulingError::Database(report)
}

fn slot_from_row(row: crate::models::DbInterviewSlot) -> SchedulingResult<InterviewSlot> {
    InterviewSlot::try_from(row).map_err(SchedulingError::Database)
}

fn slots_from_rows(rows: Vec<crate::models::DbInterviewSlot>) -> SchedulingResult<Vec<InterviewSlot>> {
    rows.into_iter().map(slot_from_row).collect()
}

fn application_from_row(row: crate::models::DbApplication) -> SchedulingResult<Application> {
    Application::try_from(row).map_err(SchedulingError::Database)
}

/// [`SlotStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgSlotStore {
    pool: DbPool,
}

impl PgSlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SlotStore for PgSlotStore {
    async fn begin(&self) -> SchedulingResult<Box<dyn SlotTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SchedulingError::Database(e.into()))?;
        Ok(Box::new(PgSlotTransaction { tx }))
    }
}

/// One PostgreSQL transaction. Dropping it without `commit` rolls back.
pub struct PgSlotTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SlotTransaction for PgSlotTransaction {
    async fn lock_schedule(&mut self) -> SchedulingResult<()> {
        interview_slot::lock_schedule(&mut self.tx)
            .await
            .map_err(into_scheduling_error)
    }

    async fn find_slot(&mut self, id: Uuid) -> SchedulingResult<Option<InterviewSlot>> {
        interview_slot::find_slot_by_id(&mut self.tx, id)
            .await
            .map_err(into_scheduling_error)?
            .map(slot_from_row)
            .transpose()
    }

    async fn find_booked_overlapping(
        &mut self,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let rows = interview_slot::find_booked_overlapping(&mut self.tx, range.start, range.end, exclude)
            .await
            .map_err(into_scheduling_error)?;
        slots_from_rows(rows)
    }

    async fn find_exact_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>> {
        let rows = interview_slot::find_exact_slots(&mut self.tx, range.start, range.end)
            .await
            .map_err(into_scheduling_error)?;
        slots_from_rows(rows)
    }

    async fn find_booked_for_application(
        &mut self,
        application_id: Uuid,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Option<InterviewSlot>> {
        interview_slot::find_booked_for_application(&mut self.tx, application_id, exclude)
            .await
            .map_err(into_scheduling_error)?
            .map(slot_from_row)
            .transpose()
    }

    async fn list_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>> {
        let rows = interview_slot::get_slots_in_range(&mut self.tx, range.start, range.end)
            .await
            .map_err(into_scheduling_error)?;
        slots_from_rows(rows)
    }

    async fn list_application_slots(
        &mut self,
        application_id: Uuid,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let rows = interview_slot::get_slots_by_application_id(&mut self.tx, application_id)
            .await
            .map_err(into_scheduling_error)?;
        slots_from_rows(rows)
    }

    async fn insert_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot> {
        let row = interview_slot::create_slot(&mut self.tx, slot)
            .await
            .map_err(into_scheduling_error)?;
        slot_from_row(row)
    }

    async fn save_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot> {
        let row = interview_slot::update_slot(&mut self.tx, slot)
            .await
            .map_err(into_scheduling_error)?
            .ok_or_else(|| {
                SchedulingError::NotFound(format!("Interview slot {} not found", slot.id))
            })?;
        slot_from_row(row)
    }

    async fn soft_delete_requested_slots(
        &mut self,
        application_id: Uuid,
        keep: Uuid,
        at: DateTime<Utc>,
    ) -> SchedulingResult<u64> {
        interview_slot::soft_delete_requested_slots(&mut self.tx, application_id, keep, at)
            .await
            .map_err(into_scheduling_error)
    }

    async fn find_application(&mut self, id: Uuid) -> SchedulingResult<Option<Application>> {
        application::get_application_by_id(&mut self.tx, id)
            .await
            .map_err(into_scheduling_error)?
            .map(application_from_row)
            .transpose()
    }

    async fn insert_application(
        &mut self,
        application: &Application,
    ) -> SchedulingResult<Application> {
        let row = application::create_application(&mut self.tx, application)
            .await
            .map_err(into_scheduling_error)?;
        application_from_row(row)
    }

    async fn update_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> SchedulingResult<Application> {
        let row = application::update_application_status(&mut self.tx, id, status, at)
            .await
            .map_err(into_scheduling_error)?
            .ok_or_else(|| SchedulingError::NotFound(format!("Application {} not found", id)))?;
        application_from_row(row)
    }

    async fn commit(self: Box<Self>) -> SchedulingResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| into_scheduling_error(e.into()))
    }
}
