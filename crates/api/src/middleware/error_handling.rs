//! # Error Handling Middleware
//!
//! Maps scheduling errors to HTTP status codes and JSON error bodies so
//! every endpoint fails the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slotbook_core::errors::SchedulingError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use slotbook_api::middleware::error_handling::AppError;
/// use slotbook_core::errors::SchedulingError;
///
/// async fn handler(duration: i32) -> Result<Json<i32>, AppError> {
///     if duration % 15 != 0 {
///         return Err(AppError(SchedulingError::Validation(
///             "Duration must be a multiple of 15 minutes".to_string(),
///         )));
///     }
///     Ok(Json(duration))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub SchedulingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SchedulingError::Validation(_) => StatusCode::BAD_REQUEST,
            SchedulingError::Conflict(_) => StatusCode::CONFLICT,
            SchedulingError::NotFound(_) => StatusCode::NOT_FOUND,
            SchedulingError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SchedulingError::Ownership(_) => StatusCode::FORBIDDEN,
            SchedulingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SchedulingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store failures are not the caller's fault; keep their details in the log
        let message = if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
            match &self.0 {
                SchedulingError::Database(_) => "Database error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        let body = Json(json!({ "error": message, "kind": self.0.kind() }));
        (status, body).into_response()
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SchedulingError::Database(err))
    }
}

/// Maps a SchedulingError straight to an HTTP response.
pub fn map_error(err: SchedulingError) -> Response {
    AppError(err).into_response()
}
