use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use slotbook_core::models::{
    InterviewSlot, TimeRange,
    requests::{
        BookSlotRequest, ConfirmSlotRequest, ConflictQuery, ConflictResponse, CreateSlotRequest,
        DaySuggestions, SlotListResponse, SlotRangeQuery, SuggestionQuery,
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<InterviewSlot>), AppError> {
    let slot = state.scheduler.create_slot(payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SlotRangeQuery>,
) -> Result<Json<SlotListResponse>, AppError> {
    let slots = state.scheduler.slots_in_range(query.start, query.end).await?;
    Ok(Json(SlotListResponse { slots }))
}

#[axum::debug_handler]
pub async fn suggest_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<DaySuggestions>, AppError> {
    let suggestions = state
        .scheduler
        .suggest_slots(query.date, query.duration)
        .await?;
    Ok(Json(suggestions))
}

#[axum::debug_handler]
pub async fn check_conflict(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ConflictQuery>,
) -> Result<Json<ConflictResponse>, AppError> {
    let range = TimeRange::new(query.start, query.end)?;
    let has_conflict = state.scheduler.has_conflict(range, query.exclude).await?;
    Ok(Json(ConflictResponse { has_conflict }))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookSlotRequest>,
) -> Result<Json<InterviewSlot>, AppError> {
    let slot = state
        .scheduler
        .book_slot(id, payload.application_id)
        .await?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn confirm_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmSlotRequest>,
) -> Result<Json<InterviewSlot>, AppError> {
    let slot = state
        .scheduler
        .confirm_requested_slot(id, payload.application_id)
        .await?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn cancel_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSlot>, AppError> {
    let slot = state.scheduler.cancel_slot(id).await?;
    Ok(Json(slot))
}
