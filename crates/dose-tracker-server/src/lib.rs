//! JSON HTTP API for the dose tracker.
//!
//! Wraps [`dose_tracker_core::DoseTracker`] in an axum router. Every route
//! under `/api` except signup and login requires a bearer token.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use error::{ApiError, ApiResult};
pub use state::{AppState, AuthUser};

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", routes::api())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
