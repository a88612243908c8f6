//! # SlotBook API
//!
//! The API crate provides the web server for the interview slot scheduler.
//! It exposes JSON endpoints for creating, requesting, booking, confirming
//! and cancelling interview slots, and for day-level slot suggestions.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into [`Scheduler`] calls
//! - **Middleware**: Error-to-response mapping
//! - **Config**: Environment-driven server configuration
//!
//! Scheduling rules and persistence live in `slotbook-core` and
//! `slotbook-db`; handlers only parse input and render results.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::HeaderValue};
use eyre::Result;
use slotbook_core::Scheduler;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Scheduling service bound to the configured store
    pub scheduler: Scheduler,
}

/// Builds the router with every endpoint and the shared state attached,
/// without any transport layers.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Interview slot endpoints
        .merge(routes::slots::routes())
        // Application endpoints
        .merge(routes::applications::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and scheduler
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `scheduler` - Scheduling service backed by the chosen store
pub async fn start_server(config: config::ApiConfig, scheduler: Scheduler) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState { scheduler });
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(timezone = config.timezone.name(), "Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
