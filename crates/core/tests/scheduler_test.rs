use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use slotbook_core::{
    Scheduler, SchedulingError,
    memory::MemoryStore,
    models::{
        Application, ApplicationStatus, InterviewSlot, SlotStatus, TimeRange,
        requests::{CreateSlotRequest, SlotProposal},
    },
};
use uuid::Uuid;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0).unwrap()
}

fn setup() -> (MemoryStore, Scheduler) {
    let store = MemoryStore::new();
    let scheduler = Scheduler::new(Arc::new(store.clone()));
    (store, scheduler)
}

async fn seed_application(store: &MemoryStore, status: ApplicationStatus) -> Uuid {
    let application = Application::new(status, Utc::now());
    let id = application.id;
    store.seed_application(application).await;
    id
}

async fn seed_requested(store: &MemoryStore, application_id: Uuid, start: DateTime<Utc>) -> Uuid {
    let slot = InterviewSlot::new(
        TimeRange::from_duration(start, 30).unwrap(),
        SlotStatus::Requested,
        Some(application_id),
        Utc::now(),
    );
    let id = slot.id;
    store.seed_slot(slot).await;
    id
}

fn booking(start: DateTime<Utc>, duration_minutes: i32, application_id: Option<Uuid>) -> CreateSlotRequest {
    CreateSlotRequest {
        start,
        duration_minutes,
        application_id,
    }
}

#[tokio::test]
async fn test_booking_then_overlapping_booking_conflicts() {
    let (store, scheduler) = setup();
    let first = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let second = seed_application(&store, ApplicationStatus::InterviewRequested).await;

    let slot = scheduler
        .create_slot(booking(at(9, 0), 30, Some(first)))
        .await
        .unwrap();
    assert_eq!(slot.status, SlotStatus::Booked);
    assert_eq!(slot.start_time, at(9, 0));
    assert_eq!(slot.end_time, at(9, 30));
    assert_eq!(slot.duration_minutes, 30);

    let err = scheduler
        .create_slot(booking(at(9, 15), 30, Some(second)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(_)));
    assert_eq!(store.all_slots().await.len(), 1);
}

#[tokio::test]
async fn test_booking_exact_range_twice_conflicts() {
    let (store, scheduler) = setup();
    let first = seed_application(&store, ApplicationStatus::Pending).await;
    let second = seed_application(&store, ApplicationStatus::Pending).await;

    scheduler
        .create_slot(booking(at(10, 0), 60, Some(first)))
        .await
        .unwrap();
    let err = scheduler
        .create_slot(booking(at(10, 0), 60, Some(second)))
        .await
        .unwrap_err();

    match err {
        SchedulingError::Conflict(message) => assert!(message.contains("already booked")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_adjacent_bookings_do_not_conflict() {
    let (store, scheduler) = setup();
    let first = seed_application(&store, ApplicationStatus::Pending).await;
    let second = seed_application(&store, ApplicationStatus::Pending).await;

    scheduler.create_slot(booking(at(9, 0), 30, Some(first))).await.unwrap();
    scheduler.create_slot(booking(at(9, 30), 30, Some(second))).await.unwrap();

    assert_eq!(store.all_slots().await.len(), 2);
}

#[tokio::test]
async fn test_create_slot_rejects_invalid_duration() {
    let (_store, scheduler) = setup();
    for minutes in [0, -15, 20] {
        let err = scheduler
            .create_slot(booking(at(9, 0), minutes, None))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)), "{minutes}");
    }
}

#[tokio::test]
async fn test_unassigned_slot_is_available_and_reused_when_booked() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;

    let open = scheduler.create_slot(booking(at(14, 0), 45, None)).await.unwrap();
    assert_eq!(open.status, SlotStatus::Available);
    assert_eq!(open.application_id, None);

    let again = scheduler.create_slot(booking(at(14, 0), 45, None)).await.unwrap();
    assert_eq!(again.id, open.id);

    let booked = scheduler
        .create_slot(booking(at(14, 0), 45, Some(application_id)))
        .await
        .unwrap();
    assert_eq!(booked.id, open.id);
    assert_eq!(booked.status, SlotStatus::Booked);
    assert_eq!(booked.application_id, Some(application_id));
    assert_eq!(store.all_slots().await.len(), 1);

    let application = store.application(application_id).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::InterviewScheduled);
}

#[tokio::test]
async fn test_create_slot_for_unknown_application() {
    let (store, scheduler) = setup();
    let err = scheduler
        .create_slot(booking(at(9, 0), 30, Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
    assert!(store.all_slots().await.is_empty());
}

#[tokio::test]
async fn test_application_cannot_hold_two_bookings() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;

    scheduler
        .create_slot(booking(at(9, 0), 30, Some(application_id)))
        .await
        .unwrap();
    let err = scheduler
        .create_slot(booking(at(15, 0), 30, Some(application_id)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(_)));
}

#[test_log::test(tokio::test)]
async fn test_confirm_books_slot_and_withdraws_siblings() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let a = seed_requested(&store, application_id, at(9, 0)).await;
    let b = seed_requested(&store, application_id, at(11, 0)).await;
    let c = seed_requested(&store, application_id, at(13, 0)).await;

    let confirmed = scheduler
        .confirm_requested_slot(a, application_id)
        .await
        .unwrap();

    assert_eq!(confirmed.id, a);
    assert_eq!(confirmed.status, SlotStatus::Booked);
    assert!(store.slot(b).await.unwrap().is_deleted());
    assert!(store.slot(c).await.unwrap().is_deleted());
    assert!(!store.slot(a).await.unwrap().is_deleted());

    let application = store.application(application_id).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::InterviewScheduled);

    let remaining = scheduler.application_slots(application_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, a);
}

#[tokio::test]
async fn test_confirm_leaves_other_applications_untouched() {
    let (store, scheduler) = setup();
    let mine = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let theirs = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let slot = seed_requested(&store, mine, at(9, 0)).await;
    let other = seed_requested(&store, theirs, at(11, 0)).await;

    scheduler.confirm_requested_slot(slot, mine).await.unwrap();

    assert!(!store.slot(other).await.unwrap().is_deleted());
    assert_eq!(
        store.application(theirs).await.unwrap().status,
        ApplicationStatus::InterviewRequested
    );
}

#[tokio::test]
async fn test_confirming_twice_is_invalid_state() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let slot = seed_requested(&store, application_id, at(9, 0)).await;

    scheduler.confirm_requested_slot(slot, application_id).await.unwrap();
    let err = scheduler
        .confirm_requested_slot(slot, application_id)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::InvalidState(_)));
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::InterviewScheduled
    );
}

#[tokio::test]
async fn test_confirm_checks_ownership() {
    let (store, scheduler) = setup();
    let owner = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let intruder = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let slot = seed_requested(&store, owner, at(9, 0)).await;

    let err = scheduler
        .confirm_requested_slot(slot, intruder)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::Ownership(_)));
    assert_eq!(store.slot(slot).await.unwrap().status, SlotStatus::Requested);
}

#[tokio::test]
async fn test_confirm_missing_or_withdrawn_slot_is_not_found() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let a = seed_requested(&store, application_id, at(9, 0)).await;
    let b = seed_requested(&store, application_id, at(10, 0)).await;

    let err = scheduler
        .confirm_requested_slot(Uuid::new_v4(), application_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));

    scheduler.confirm_requested_slot(a, application_id).await.unwrap();
    let err = scheduler
        .confirm_requested_slot(b, application_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_confirmation_changes_nothing() {
    let (store, scheduler) = setup();
    let booked_app = seed_application(&store, ApplicationStatus::Pending).await;
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let a = seed_requested(&store, application_id, at(9, 0)).await;
    let b = seed_requested(&store, application_id, at(11, 0)).await;

    scheduler
        .create_slot(booking(at(9, 15), 30, Some(booked_app)))
        .await
        .unwrap();
    let before = store.all_slots().await;

    let err = scheduler
        .confirm_requested_slot(a, application_id)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::Conflict(_)));
    assert_eq!(store.all_slots().await, before);
    assert!(!store.slot(b).await.unwrap().is_deleted());
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::InterviewRequested
    );
}

#[tokio::test]
async fn test_confirm_rejects_application_with_existing_booking() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let requested = seed_requested(&store, application_id, at(13, 0)).await;
    store
        .seed_slot(InterviewSlot::new(
            TimeRange::from_duration(at(9, 0), 30).unwrap(),
            SlotStatus::Booked,
            Some(application_id),
            Utc::now(),
        ))
        .await;

    let err = scheduler
        .confirm_requested_slot(requested, application_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_overlapping_confirmations() {
    let (store, scheduler) = setup();
    let first = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let second = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let a = seed_requested(&store, first, at(9, 0)).await;
    let b = seed_requested(&store, second, at(9, 15)).await;

    let left = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.confirm_requested_slot(a, first).await })
    };
    let right = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.confirm_requested_slot(b, second).await })
    };
    let results = [left.await.unwrap(), right.await.unwrap()];

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(failure, SchedulingError::Conflict(_)));

    let booked = store
        .all_slots()
        .await
        .into_iter()
        .filter(InterviewSlot::is_booked)
        .count();
    assert_eq!(booked, 1);
}

#[tokio::test]
async fn test_request_slots_records_proposals() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::UnderReview).await;

    let proposals = [
        SlotProposal { start: at(9, 0), duration_minutes: 30 },
        SlotProposal { start: at(10, 0), duration_minutes: 60 },
    ];
    let created = scheduler
        .request_slots(application_id, &proposals)
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|slot| slot.status == SlotStatus::Requested));
    assert!(created.iter().all(|slot| slot.belongs_to(application_id)));
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::InterviewRequested
    );
}

#[tokio::test]
async fn test_request_slots_is_all_or_nothing() {
    let (store, scheduler) = setup();
    let booked_app = seed_application(&store, ApplicationStatus::Pending).await;
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;
    scheduler
        .create_slot(booking(at(10, 0), 30, Some(booked_app)))
        .await
        .unwrap();

    let proposals = [
        SlotProposal { start: at(8, 0), duration_minutes: 30 },
        SlotProposal { start: at(10, 15), duration_minutes: 30 },
    ];
    let err = scheduler
        .request_slots(application_id, &proposals)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::Conflict(_)));
    assert_eq!(store.all_slots().await.len(), 1);
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::Pending
    );
}

#[tokio::test]
async fn test_request_slots_rejects_overlapping_proposals() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;

    let proposals = [
        SlotProposal { start: at(9, 0), duration_minutes: 60 },
        SlotProposal { start: at(9, 30), duration_minutes: 30 },
    ];
    let err = scheduler
        .request_slots(application_id, &proposals)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let err = scheduler.request_slots(application_id, &[]).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn test_book_existing_slot() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let open = scheduler.create_slot(booking(at(9, 0), 30, None)).await.unwrap();

    let booked = scheduler.book_slot(open.id, application_id).await.unwrap();
    assert_eq!(booked.status, SlotStatus::Booked);
    assert_eq!(booked.application_id, Some(application_id));

    let other = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let err = scheduler.book_slot(open.id, other).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(_)));
}

#[tokio::test]
async fn test_book_requested_slot_is_invalid_state() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let requested = seed_requested(&store, application_id, at(9, 0)).await;

    let err = scheduler.book_slot(requested, application_id).await.unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidState(_)));
}

#[tokio::test]
async fn test_direct_booking_over_own_request_is_invalid_state() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::UnderReview).await;
    let requested = scheduler
        .request_slots(
            application_id,
            &[
                SlotProposal { start: at(9, 0), duration_minutes: 30 },
                SlotProposal { start: at(11, 0), duration_minutes: 30 },
            ],
        )
        .await
        .unwrap();

    let err = scheduler
        .create_slot(booking(at(9, 0), 30, Some(application_id)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidState(_)));

    // Both requests stay open and nothing is booked
    let live = scheduler.application_slots(application_id).await.unwrap();
    assert_eq!(live.len(), 2);
    assert!(live.iter().all(|slot| slot.status == SlotStatus::Requested));
    assert_eq!(
        store.slot(requested[0].id).await.unwrap().status,
        SlotStatus::Requested
    );
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::InterviewRequested
    );

    // The confirm path still works for the same slot
    let booked = scheduler
        .confirm_requested_slot(requested[0].id, application_id)
        .await
        .unwrap();
    assert_eq!(booked.status, SlotStatus::Booked);
    let live = scheduler.application_slots(application_id).await.unwrap();
    assert_eq!(live.len(), 1);
}

#[tokio::test]
async fn test_open_slot_creation_ignores_other_requests() {
    let (store, scheduler) = setup();
    let other = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let requested = seed_requested(&store, other, at(9, 0)).await;

    let open = scheduler.create_slot(booking(at(9, 0), 30, None)).await.unwrap();
    assert_ne!(open.id, requested);
    assert_eq!(open.status, SlotStatus::Available);
    assert_eq!(open.application_id, None);

    // A different application books the open slot, not the request
    let applicant = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let booked = scheduler
        .create_slot(booking(at(9, 0), 30, Some(applicant)))
        .await
        .unwrap();
    assert_eq!(booked.id, open.id);
    assert_eq!(
        store.slot(requested).await.unwrap().status,
        SlotStatus::Requested
    );
}

#[tokio::test]
async fn test_cancel_booking_reverts_application() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::InterviewRequested).await;
    let slot = scheduler
        .create_slot(booking(at(9, 0), 30, Some(application_id)))
        .await
        .unwrap();

    let cancelled = scheduler.cancel_slot(slot.id).await.unwrap();
    assert!(cancelled.is_deleted());
    assert_eq!(
        store.application(application_id).await.unwrap().status,
        ApplicationStatus::InterviewRequested
    );

    // The range is free again and the row is kept.
    assert!(!scheduler
        .has_conflict(TimeRange::from_duration(at(9, 0), 30).unwrap(), None)
        .await
        .unwrap());
    assert_eq!(store.all_slots().await.len(), 1);

    let err = scheduler.cancel_slot(slot.id).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
}

#[tokio::test]
async fn test_has_conflict_with_exclusion() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;
    let slot = scheduler
        .create_slot(booking(at(9, 0), 60, Some(application_id)))
        .await
        .unwrap();

    let inside = TimeRange::new(at(9, 15), at(9, 45)).unwrap();
    assert!(scheduler.has_conflict(inside, None).await.unwrap());
    assert!(!scheduler.has_conflict(inside, Some(slot.id)).await.unwrap());
    let after = TimeRange::new(at(10, 0), at(10, 30)).unwrap();
    assert!(!scheduler.has_conflict(after, None).await.unwrap());
}

#[tokio::test]
async fn test_suggestions_reflect_bookings() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;
    scheduler
        .create_slot(booking(at(9, 0), 30, Some(application_id)))
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

    let day = scheduler.suggest_slots(date, None).await.unwrap();

    assert_eq!(day.duration_minutes, 30);
    assert_eq!(day.existing_slots.len(), 1);
    assert_eq!(day.suggestions.len(), 95);
    let at_nine = day.suggestions.iter().find(|s| s.start == at(9, 0)).unwrap();
    assert!(!at_nine.is_available);
    assert_eq!(
        at_nine.conflict_reason.as_deref(),
        Some("This time slot is already booked")
    );
    let unavailable = day.suggestions.iter().filter(|s| !s.is_available).count();
    // 08:45, 09:00 and 09:15 touch the booking.
    assert_eq!(unavailable, 3);
    for pair in day.suggestions.windows(2) {
        assert_eq!(pair[1].start - pair[0].start, Duration::minutes(15));
    }
}

#[tokio::test]
async fn test_suggestions_use_scheduler_timezone() {
    let (_store, scheduler) = setup();
    let scheduler = scheduler.with_timezone("Europe/Berlin".parse().unwrap());
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

    let day = scheduler.suggest_slots(date, Some(60)).await.unwrap();

    assert_eq!(day.suggestions[0].start, Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap());
    assert_eq!(
        day.suggestions.last().unwrap().end,
        Utc.with_ymd_and_hms(2024, 1, 10, 23, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_suggestions_reject_invalid_duration() {
    let (_store, scheduler) = setup();
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let err = scheduler.suggest_slots(date, Some(10)).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn test_slots_in_range_are_ordered_and_live() {
    let (store, scheduler) = setup();
    let application_id = seed_application(&store, ApplicationStatus::Pending).await;
    let late = seed_requested(&store, application_id, at(15, 0)).await;
    let early = seed_requested(&store, application_id, at(8, 0)).await;
    let cancelled = seed_requested(&store, application_id, at(12, 0)).await;
    scheduler.cancel_slot(cancelled).await.unwrap();

    let slots = scheduler.slots_in_range(at(0, 0), at(23, 0)).await.unwrap();
    let ids: Vec<_> = slots.iter().map(|slot| slot.id).collect();
    assert_eq!(ids, vec![early, late]);

    let err = scheduler.slots_in_range(at(10, 0), at(9, 0)).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn test_register_and_fetch_application() {
    let (_store, scheduler) = setup();
    let application = scheduler.register_application(None).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);

    let fetched = scheduler.application(application.id).await.unwrap();
    assert_eq!(fetched, application);

    let err = scheduler.application(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
    let err = scheduler.application_slots(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
}
