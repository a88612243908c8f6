use std::error::Error;
use slotbook_core::errors::{SchedulingError, SchedulingResult};

#[test]
fn test_scheduling_error_display() {
    let validation = SchedulingError::Validation("Duration must be positive".to_string());
    let conflict = SchedulingError::Conflict("Overlaps with an existing booking".to_string());
    let not_found = SchedulingError::NotFound("Interview slot missing".to_string());
    let invalid_state = SchedulingError::InvalidState("Slot is BOOKED".to_string());
    let ownership = SchedulingError::Ownership("Slot belongs elsewhere".to_string());
    let database = SchedulingError::Database(eyre::eyre!("Database connection failed"));

    assert_eq!(
        validation.to_string(),
        "Validation error: Duration must be positive"
    );
    assert_eq!(
        conflict.to_string(),
        "Scheduling conflict: Overlaps with an existing booking"
    );
    assert_eq!(
        not_found.to_string(),
        "Resource not found: Interview slot missing"
    );
    assert_eq!(invalid_state.to_string(), "Invalid state: Slot is BOOKED");
    assert_eq!(
        ownership.to_string(),
        "Ownership error: Slot belongs elsewhere"
    );
    assert!(database.to_string().contains("Database error:"));
}

#[test]
fn test_error_kinds() {
    assert_eq!(SchedulingError::Conflict(String::new()).kind(), "conflict");
    assert_eq!(SchedulingError::InvalidState(String::new()).kind(), "invalid_state");
    assert_eq!(SchedulingError::Ownership(String::new()).kind(), "ownership");
    assert_eq!(
        SchedulingError::Database(eyre::eyre!("down")).kind(),
        "database"
    );
}

#[test]
fn test_internal_error_keeps_source() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let error = SchedulingError::Internal(Box::new(io_error));

    assert!(error.source().is_some());
    assert!(error.to_string().contains("IO error"));
}

#[test]
fn test_eyre_conversion() {
    fn failing() -> SchedulingResult<()> {
        let pool: eyre::Result<()> = Err(eyre::eyre!("pool timed out"));
        pool?;
        Ok(())
    }

    let error = failing().unwrap_err();
    assert!(matches!(error, SchedulingError::Database(_)));
    assert!(error.to_string().contains("pool timed out"));
}
