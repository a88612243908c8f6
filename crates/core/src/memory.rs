//! In-process [`SlotStore`]. A transaction holds the store's lock for its
//! whole lifetime and works on a copy of the state that replaces the shared
//! state on commit, so transactions are fully serialised.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::{Application, ApplicationStatus, InterviewSlot, SlotStatus, TimeRange};
use crate::rules::conflict::find_conflict;
use crate::store::{SlotStore, SlotTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    slots: Vec<InterviewSlot>,
    applications: HashMap<Uuid, Application>,
}

impl MemoryState {
    fn live_slots(&self) -> impl Iterator<Item = &InterviewSlot> {
        self.slots.iter().filter(|slot| !slot.is_deleted())
    }

    fn slot_mut(&mut self, id: Uuid) -> SchedulingResult<&mut InterviewSlot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or_else(|| SchedulingError::NotFound(format!("Interview slot {} not found", id)))
    }

    /// Same guarantees the PostgreSQL schema enforces with its exclusion
    /// constraint and partial unique index.
    fn check_booking_constraints(&self, slot: &InterviewSlot) -> SchedulingResult<()> {
        if !slot.is_booked() {
            return Ok(());
        }
        if find_conflict(self.live_slots(), &slot.range(), Some(slot.id)).is_some() {
            return Err(SchedulingError::Conflict(
                "Time range overlaps an existing booking".to_string(),
            ));
        }
        if let Some(application_id) = slot.application_id {
            let double_booked = self
                .live_slots()
                .any(|other| other.id != slot.id && other.is_booked() && other.belongs_to(application_id));
            if double_booked {
                return Err(SchedulingError::Conflict(
                    "Application already has a booked interview slot".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a slot as-is, bypassing every scheduling rule.
    pub async fn seed_slot(&self, slot: InterviewSlot) {
        self.state.lock().await.slots.push(slot);
    }

    pub async fn seed_application(&self, application: Application) {
        self.state
            .lock()
            .await
            .applications
            .insert(application.id, application);
    }

    /// Every slot ever stored, soft-deleted ones included.
    pub async fn all_slots(&self) -> Vec<InterviewSlot> {
        self.state.lock().await.slots.clone()
    }

    pub async fn slot(&self, id: Uuid) -> Option<InterviewSlot> {
        self.state
            .lock()
            .await
            .slots
            .iter()
            .find(|slot| slot.id == id)
            .cloned()
    }

    pub async fn application(&self, id: Uuid) -> Option<Application> {
        self.state.lock().await.applications.get(&id).cloned()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn begin(&self) -> SchedulingResult<Box<dyn SlotTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

fn sorted(mut slots: Vec<InterviewSlot>) -> Vec<InterviewSlot> {
    slots.sort_by_key(|slot| slot.start_time);
    slots
}

#[async_trait]
impl SlotTransaction for MemoryTransaction {
    async fn lock_schedule(&mut self) -> SchedulingResult<()> {
        // The store lock is already held.
        Ok(())
    }

    async fn find_slot(&mut self, id: Uuid) -> SchedulingResult<Option<InterviewSlot>> {
        Ok(self.working.slots.iter().find(|slot| slot.id == id).cloned())
    }

    async fn find_booked_overlapping(
        &mut self,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let slots = self
            .working
            .live_slots()
            .filter(|slot| slot.is_booked() && Some(slot.id) != exclude && slot.range().overlaps(&range))
            .cloned()
            .collect();
        Ok(sorted(slots))
    }

    async fn find_exact_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>> {
        Ok(self
            .working
            .live_slots()
            .filter(|slot| slot.range() == range)
            .cloned()
            .collect())
    }

    async fn find_booked_for_application(
        &mut self,
        application_id: Uuid,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<Option<InterviewSlot>> {
        Ok(self
            .working
            .live_slots()
            .find(|slot| slot.is_booked() && slot.belongs_to(application_id) && Some(slot.id) != exclude)
            .cloned())
    }

    async fn list_slots(&mut self, range: TimeRange) -> SchedulingResult<Vec<InterviewSlot>> {
        let slots = self
            .working
            .live_slots()
            .filter(|slot| slot.range().overlaps(&range))
            .cloned()
            .collect();
        Ok(sorted(slots))
    }

    async fn list_application_slots(
        &mut self,
        application_id: Uuid,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let slots = self
            .working
            .live_slots()
            .filter(|slot| slot.belongs_to(application_id))
            .cloned()
            .collect();
        Ok(sorted(slots))
    }

    async fn insert_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot> {
        if let Some(application_id) = slot.application_id {
            if !self.working.applications.contains_key(&application_id) {
                return Err(SchedulingError::NotFound(format!(
                    "Application {} not found",
                    application_id
                )));
            }
        }
        self.working.check_booking_constraints(slot)?;
        self.working.slots.push(slot.clone());
        Ok(slot.clone())
    }

    async fn save_slot(&mut self, slot: &InterviewSlot) -> SchedulingResult<InterviewSlot> {
        self.working.check_booking_constraints(slot)?;
        let stored = self.working.slot_mut(slot.id)?;
        stored.status = slot.status;
        stored.application_id = slot.application_id;
        stored.updated_at = slot.updated_at;
        stored.deleted_at = slot.deleted_at;
        Ok(stored.clone())
    }

    async fn soft_delete_requested_slots(
        &mut self,
        application_id: Uuid,
        keep: Uuid,
        at: DateTime<Utc>,
    ) -> SchedulingResult<u64> {
        let mut deleted = 0;
        for slot in self.working.slots.iter_mut().filter(|slot| {
            slot.id != keep
                && slot.belongs_to(application_id)
                && slot.status == SlotStatus::Requested
                && !slot.is_deleted()
        }) {
            slot.deleted_at = Some(at);
            slot.updated_at = at;
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn find_application(&mut self, id: Uuid) -> SchedulingResult<Option<Application>> {
        Ok(self.working.applications.get(&id).cloned())
    }

    async fn insert_application(
        &mut self,
        application: &Application,
    ) -> SchedulingResult<Application> {
        self.working
            .applications
            .insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn update_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> SchedulingResult<Application> {
        let application = self
            .working
            .applications
            .get_mut(&id)
            .ok_or_else(|| SchedulingError::NotFound(format!("Application {} not found", id)))?;
        application.status = status;
        application.updated_at = at;
        Ok(application.clone())
    }

    async fn commit(self: Box<Self>) -> SchedulingResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
