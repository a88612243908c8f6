//! # Slot store
//!
//! Persistence seam of the scheduler. A [`SlotStore`] hands out
//! [`SlotTransaction`]s; every read and write of one scheduling operation
//! goes through a single transaction, which is either committed explicitly
//! or rolled back when dropped.
//!
//! Implementations:
//!
//! - `slotbook_db::PgSlotStore` on PostgreSQL
//! - [`crate::memory::MemoryStore`] in process
//! - `slotbook_db::mock::MockSlotStore` for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::SchedulingResult;
use crate::models::{Application, ApplicationStatus, InterviewSlot, TimeRange};

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Opens a unit of work.
    async fn begin(&self) -> SchedulingResult<Box<dyn SlotTransaction>>;
}

#[async_trait]
pub trait SlotTransaction: Send {
    /// Serialises this transaction against every other booking transaction
    /// until commit or rollback. Must be called before reading the conflict
    /// set in any operation that writes slots.
    async fn lock_schedule(&mut self) -> SchedulingResult<()>;

    /// Slot by id, including soft-deleted ones.
    async fn find_slot(&mut self, id: Uuid) -> SchedulingResult<Option<InterviewSlot>>;

    /// Live BOOKED slots overlapping `range`, except `exclude`.
    async fn find_booked_overlapping(
        &mut self,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Vec<InterviewSlot>>;

    /// Live slots whose bounds equal `range` exactly.
    async fn find_exact_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>>;

    /// The application's live BOOKED slot other than `exclude`, if any.
    async fn find_booked_for_application(
        &mut self,
        application_id: Uuid,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Option<InterviewSlot>>;

    /// Live slots overlapping `range`, ordered by start time.
    async fn list_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>>;

    /// Live slots owned by the application, ordered by start time.
    async fn list_application_slots(
        &mut self,
        application_id: Uuid,
    ) -> SchedulingResult<Vec<InterviewSlot>>;

    async fn insert_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot>;

    /// Writes status, owner, `updated_at` and `deleted_at` of an existing slot.
    async fn save_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot>;

    /// Soft-deletes the application's live REQUESTED slots except `keep`.
    /// Returns how many were deleted.
    async fn soft_delete_requested_slots(
        &mut self,
        application_id: Uuid,
        keep: Uuid,
        at: DateTime<Utc>,
    ) -> SchedulingResult<u64>;

    async fn find_application(&mut self, id: Uuid) -> SchedulingResult<Option<Application>>;

    async fn insert_application(
        &mut self,
        application: &Application,
    ) -> SchedulingResult<Application>;

    async fn update_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> SchedulingResult<Application>;

    async fn commit(self: Box<Self>) -> SchedulingResult<()>;
}
