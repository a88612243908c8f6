use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use slotbook_api::middleware::error_handling::{AppError, map_error};
use slotbook_core::errors::SchedulingError;

#[rstest]
#[case(SchedulingError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case(SchedulingError::Conflict("taken".into()), StatusCode::CONFLICT)]
#[case(SchedulingError::NotFound("gone".into()), StatusCode::NOT_FOUND)]
#[case(SchedulingError::InvalidState("booked".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(SchedulingError::Ownership("not yours".into()), StatusCode::FORBIDDEN)]
#[case(SchedulingError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(SchedulingError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_status_mapping(#[case] error: SchedulingError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_client_errors_carry_message() {
    let response = map_error(SchedulingError::Conflict(
        "This time slot is already booked".to_string(),
    ));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        body,
        json!({
            "error": "Scheduling conflict: This time slot is already booked",
            "kind": "conflict",
        })
    );
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let response = map_error(SchedulingError::Database(eyre::eyre!(
        "password authentication failed for user slotbook"
    )));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "Database error");
}

#[test]
fn test_report_converts_to_database_error() {
    let error: AppError = eyre::eyre!("pool closed").into();
    assert!(matches!(error.0, SchedulingError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
