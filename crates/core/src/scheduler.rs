//! # Interview slot scheduler
//!
//! Entry points for every scheduling operation. A [`Scheduler`] holds only a
//! store handle and the timezone used to cut calendar days; construct one per
//! process and clone it freely.
//!
//! Each mutating operation runs inside one [`SlotTransaction`]: it takes the
//! schedule lock, re-reads the conflict set, writes, and commits. An early
//! return via `?` drops the transaction, which rolls every write back.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::requests::{CreateSlotRequest, DaySuggestions, SlotProposal};
use crate::models::{Application, ApplicationStatus, InterviewSlot, SlotStatus, TimeRange};
use crate::rules::conflict::ConflictReason;
use crate::rules::duration::{DEFAULT_SLOT_DURATION_MINUTES, validate_duration};
use crate::rules::suggestions::{SuggestionIter, day_window};
use crate::store::{SlotStore, SlotTransaction};

#[derive(Clone)]
pub struct Scheduler {
    store: Arc<dyn SlotStore>,
    timezone: Tz,
}

impl Scheduler {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            timezone: Tz::UTC,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Round-trips a transaction to check the store is reachable.
    pub async fn ping(&self) -> SchedulingResult<()> {
        let tx = self.store.begin().await?;
        drop(tx);
        Ok(())
    }

    /// `true` when a live BOOKED slot other than `exclude` overlaps `range`.
    pub async fn has_conflict(
        &self,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<bool> {
        let mut tx = self.store.begin().await?;
        let conflicts = tx.find_booked_overlapping(range, exclude).await?;
        debug!(start = %range.start, end = %range.end, conflicts = conflicts.len(), "Checked slot conflicts");
        Ok(!conflicts.is_empty())
    }

    /// Creates a slot, or reuses an open AVAILABLE one with the same bounds,
    /// and books it for the application when one is given. Without an
    /// application the slot is left AVAILABLE. An application's own REQUESTED
    /// slot at the same time must be confirmed instead.
    pub async fn create_slot(&self, request: CreateSlotRequest) -> SchedulingResult<InterviewSlot> {
        let range = TimeRange::from_duration(request.start, request.duration_minutes)?;
        let now = Utc::now();

        let mut tx = self.store.begin().await?;
        tx.lock_schedule().await?;

        let application = match request.application_id {
            Some(id) => Some(require_application(tx.as_mut(), id).await?),
            None => None,
        };

        let exact = tx.find_exact_slots(range).await?;
        if exact.iter().any(InterviewSlot::is_booked) {
            warn!(start = %range.start, end = %range.end, "Rejected booking of an already booked slot");
            return Err(SchedulingError::Conflict(
                ConflictReason::AlreadyBooked.message().to_string(),
            ));
        }
        ensure_no_overlap(tx.as_mut(), range, None).await?;

        // Only an open AVAILABLE slot is reused
        let reusable = exact
            .iter()
            .find(|slot| slot.status == SlotStatus::Available && slot.application_id.is_none())
            .cloned();

        let slot = match &application {
            Some(application) => {
                if let Some(requested) = exact
                    .iter()
                    .find(|slot| slot.status == SlotStatus::Requested && slot.belongs_to(application.id))
                {
                    return Err(SchedulingError::InvalidState(format!(
                        "Interview slot {} is REQUESTED; confirm it instead of booking it",
                        requested.id
                    )));
                }
                ensure_not_booked(tx.as_mut(), application.id, None).await?;
                let slot = match reusable {
                    Some(mut slot) => {
                        slot.status = SlotStatus::Booked;
                        slot.application_id = Some(application.id);
                        slot.updated_at = now;
                        tx.save_slot(&slot).await?
                    }
                    None => {
                        let slot = InterviewSlot::new(range, SlotStatus::Booked, Some(application.id), now);
                        tx.insert_slot(&slot).await?
                    }
                };
                advance_application(tx.as_mut(), application, ApplicationStatus::after_booking, now)
                    .await?;
                slot
            }
            None => match reusable {
                Some(slot) => slot,
                None => {
                    let slot = InterviewSlot::new(range, SlotStatus::Available, None, now);
                    tx.insert_slot(&slot).await?
                }
            },
        };

        tx.commit().await?;
        info!(slot_id = %slot.id, status = %slot.status, application_id = ?slot.application_id, "Created interview slot");
        Ok(slot)
    }

    /// Books an existing AVAILABLE slot for an application.
    pub async fn book_slot(
        &self,
        slot_id: Uuid,
        application_id: Uuid,
    ) -> SchedulingResult<InterviewSlot> {
        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        tx.lock_schedule().await?;

        let mut slot = require_live_slot(tx.as_mut(), slot_id).await?;
        match slot.status {
            SlotStatus::Available => {}
            SlotStatus::Booked => {
                return Err(SchedulingError::Conflict(
                    ConflictReason::AlreadyBooked.message().to_string(),
                ));
            }
            SlotStatus::Requested => {
                return Err(SchedulingError::InvalidState(format!(
                    "Interview slot {} is REQUESTED; confirm it instead of booking it",
                    slot_id
                )));
            }
        }

        let application = require_application(tx.as_mut(), application_id).await?;
        ensure_not_booked(tx.as_mut(), application_id, Some(slot_id)).await?;
        ensure_no_overlap(tx.as_mut(), slot.range(), Some(slot_id)).await?;

        slot.status = SlotStatus::Booked;
        slot.application_id = Some(application_id);
        slot.updated_at = now;
        let booked = tx.save_slot(&slot).await?;
        advance_application(tx.as_mut(), &application, ApplicationStatus::after_booking, now).await?;

        tx.commit().await?;
        info!(slot_id = %booked.id, application_id = %application_id, "Booked interview slot");
        Ok(booked)
    }

    /// Records the examiner's proposed interview times as REQUESTED slots.
    /// Either every proposal is stored or none is.
    pub async fn request_slots(
        &self,
        application_id: Uuid,
        proposals: &[SlotProposal],
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        if proposals.is_empty() {
            return Err(SchedulingError::Validation(
                "At least one proposed slot is required".to_string(),
            ));
        }
        let ranges = proposals
            .iter()
            .map(|proposal| TimeRange::from_duration(proposal.start, proposal.duration_minutes))
            .collect::<SchedulingResult<Vec<_>>>()?;
        for (i, a) in ranges.iter().enumerate() {
            if ranges[i + 1..].iter().any(|b| a.overlaps(b)) {
                return Err(SchedulingError::Validation(format!(
                    "Proposed slots overlap each other at {}",
                    a.start
                )));
            }
        }

        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        tx.lock_schedule().await?;

        let application = require_application(tx.as_mut(), application_id).await?;
        ensure_not_booked(tx.as_mut(), application_id, None).await?;

        let mut created = Vec::with_capacity(ranges.len());
        for range in ranges {
            ensure_no_overlap(tx.as_mut(), range, None).await?;
            let slot = InterviewSlot::new(range, SlotStatus::Requested, Some(application_id), now);
            created.push(tx.insert_slot(&slot).await?);
        }
        advance_application(tx.as_mut(), &application, ApplicationStatus::after_slot_request, now)
            .await?;

        tx.commit().await?;
        info!(application_id = %application_id, count = created.len(), "Requested interview slots");
        Ok(created)
    }

    /// Confirms one of the examiner's REQUESTED slots: the slot becomes
    /// BOOKED, its sibling requests are soft-deleted and the application moves
    /// to INTERVIEW_SCHEDULED, all in one transaction.
    pub async fn confirm_requested_slot(
        &self,
        slot_id: Uuid,
        application_id: Uuid,
    ) -> SchedulingResult<InterviewSlot> {
        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        tx.lock_schedule().await?;

        let mut slot = require_live_slot(tx.as_mut(), slot_id).await?;
        if slot.status != SlotStatus::Requested {
            warn!(slot_id = %slot_id, status = %slot.status, "Rejected confirmation of non-requested slot");
            return Err(SchedulingError::InvalidState(format!(
                "Interview slot {} is {}, expected REQUESTED",
                slot_id, slot.status
            )));
        }
        if !slot.belongs_to(application_id) {
            return Err(SchedulingError::Ownership(format!(
                "Interview slot {} does not belong to application {}",
                slot_id, application_id
            )));
        }
        ensure_no_overlap(tx.as_mut(), slot.range(), Some(slot_id)).await?;
        ensure_not_booked(tx.as_mut(), application_id, Some(slot_id)).await?;
        let application = require_application(tx.as_mut(), application_id).await?;

        slot.status = SlotStatus::Booked;
        slot.updated_at = now;
        let booked = tx.save_slot(&slot).await?;
        let withdrawn = tx
            .soft_delete_requested_slots(application_id, slot_id, now)
            .await?;
        advance_application(tx.as_mut(), &application, ApplicationStatus::after_booking, now).await?;

        tx.commit().await?;
        info!(
            slot_id = %slot_id,
            application_id = %application_id,
            withdrawn,
            "Confirmed requested interview slot"
        );
        Ok(booked)
    }

    /// Soft-deletes a slot. Cancelling a booking sends the application back
    /// to INTERVIEW_REQUESTED.
    pub async fn cancel_slot(&self, slot_id: Uuid) -> SchedulingResult<InterviewSlot> {
        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        tx.lock_schedule().await?;

        let mut slot = require_live_slot(tx.as_mut(), slot_id).await?;
        let was_booked = slot.is_booked();
        slot.deleted_at = Some(now);
        slot.updated_at = now;
        let cancelled = tx.save_slot(&slot).await?;

        if let (true, Some(application_id)) = (was_booked, slot.application_id) {
            if let Some(application) = tx.find_application(application_id).await? {
                advance_application(
                    tx.as_mut(),
                    &application,
                    ApplicationStatus::after_booking_cancelled,
                    now,
                )
                .await?;
            }
        }

        tx.commit().await?;
        info!(slot_id = %slot_id, was_booked, "Cancelled interview slot");
        Ok(cancelled)
    }

    /// Quarter-hour suggestions of `duration` minutes (30 by default) across
    /// `date`, plus the live slots touching that day.
    pub async fn suggest_slots(
        &self,
        date: NaiveDate,
        duration: Option<i32>,
    ) -> SchedulingResult<DaySuggestions> {
        let duration_minutes = duration.unwrap_or(DEFAULT_SLOT_DURATION_MINUTES);
        validate_duration(duration_minutes)?;
        let day = day_window(date, self.timezone)?;

        let mut tx = self.store.begin().await?;
        let existing_slots = tx.list_slots(day).await?;
        drop(tx);

        let suggestions: Vec<_> = SuggestionIter::new(day, duration_minutes, &existing_slots)?.collect();
        debug!(
            %date,
            duration_minutes,
            available = suggestions.iter().filter(|s| s.is_available).count(),
            "Generated slot suggestions"
        );
        Ok(DaySuggestions {
            date,
            duration_minutes,
            suggestions,
            existing_slots,
        })
    }

    pub async fn slots_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let range = TimeRange::new(start, end)?;
        let mut tx = self.store.begin().await?;
        let slots = tx.list_slots(range).await?;
        Ok(slots)
    }

    pub async fn application_slots(
        &self,
        application_id: Uuid,
    ) -> SchedulingResult<Vec<InterviewSlot>> {
        let mut tx = self.store.begin().await?;
        require_application(tx.as_mut(), application_id).await?;
        let slots = tx.list_application_slots(application_id).await?;
        Ok(slots)
    }

    pub async fn register_application(
        &self,
        status: Option<ApplicationStatus>,
    ) -> SchedulingResult<Application> {
        let application = Application::new(status.unwrap_or_default(), Utc::now());
        let mut tx = self.store.begin().await?;
        let application = tx.insert_application(&application).await?;
        tx.commit().await?;
        info!(application_id = %application.id, status = %application.status, "Registered application");
        Ok(application)
    }

    pub async fn application(&self, id: Uuid) -> SchedulingResult<Application> {
        let mut tx = self.store.begin().await?;
        let application = require_application(tx.as_mut(), id).await?;
        Ok(application)
    }
}

async fn require_live_slot(
    tx: &mut dyn SlotTransaction,
    slot_id: Uuid,
) -> SchedulingResult<InterviewSlot> {
    tx.find_slot(slot_id)
        .await?
        .filter(|slot| !slot.is_deleted())
        .ok_or_else(|| SchedulingError::NotFound(format!("Interview slot {} not found", slot_id)))
}

async fn require_application(
    tx: &mut dyn SlotTransaction,
    application_id: Uuid,
) -> SchedulingResult<Application> {
    tx.find_application(application_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound(format!("Application {} not found", application_id)))
}

async fn ensure_no_overlap(
    tx: &mut dyn SlotTransaction,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> SchedulingResult<()> {
    let conflicts = tx.find_booked_overlapping(range, exclude).await?;
    if let Some(existing) = conflicts.first() {
        warn!(
            start = %range.start,
            end = %range.end,
            existing = %existing.id,
            "Rejected overlapping booking"
        );
        return Err(SchedulingError::Conflict(format!(
            "{} ({} to {})",
            ConflictReason::OverlapsBooking.message(),
            existing.start_time,
            existing.end_time
        )));
    }
    Ok(())
}

async fn ensure_not_booked(
    tx: &mut dyn SlotTransaction,
    application_id: Uuid,
    exclude: Option<Uuid>,
) -> SchedulingResult<()> {
    if let Some(existing) = tx.find_booked_for_application(application_id, exclude).await? {
        return Err(SchedulingError::Conflict(format!(
            "Application {} already has booked interview slot {}",
            application_id, existing.id
        )));
    }
    Ok(())
}

async fn advance_application(
    tx: &mut dyn SlotTransaction,
    application: &Application,
    transition: fn(ApplicationStatus) -> Option<ApplicationStatus>,
    now: DateTime<Utc>,
) -> SchedulingResult<()> {
    if let Some(next) = transition(application.status) {
        tx.update_application_status(application.id, next, now).await?;
        info!(
            application_id = %application.id,
            from = %application.status,
            to = %next,
            "Advanced application status"
        );
    }
    Ok(())
}
