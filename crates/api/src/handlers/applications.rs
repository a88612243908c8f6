use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use slotbook_core::models::{
    Application,
    requests::{CreateApplicationRequest, RequestSlotsRequest, SlotListResponse},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = state.scheduler.register_application(payload.status).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    let application = state.scheduler.application(id).await?;
    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn application_slots(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SlotListResponse>, AppError> {
    let slots = state.scheduler.application_slots(id).await?;
    Ok(Json(SlotListResponse { slots }))
}

/// Records candidate times for an application as REQUESTED slots.
#[axum::debug_handler]
pub async fn request_slots(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestSlotsRequest>,
) -> Result<(StatusCode, Json<SlotListResponse>), AppError> {
    let slots = state.scheduler.request_slots(id, &payload.slots).await?;
    Ok((StatusCode::CREATED, Json(SlotListResponse { slots })))
}
