use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::slots};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/slots", post(slots::create_slot).get(slots::list_slots))
        .route("/api/slots/suggestions", get(slots::suggest_slots))
        .route("/api/slots/conflicts", get(slots::check_conflict))
        .route("/api/slots/:id", delete(slots::cancel_slot))
        .route("/api/slots/:id/book", post(slots::book_slot))
        .route("/api/slots/:id/confirm", post(slots::confirm_slot))
}
