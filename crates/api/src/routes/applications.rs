use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::applications};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/applications", post(applications::create_application))
        .route("/api/applications/:id", get(applications::get_application))
        .route(
            "/api/applications/:id/slots",
            get(applications::application_slots),
        )
        .route(
            "/api/applications/:id/slot-requests",
            post(applications::request_slots),
        )
}
