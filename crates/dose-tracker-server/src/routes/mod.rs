//! HTTP routes.

mod auth;
mod entries;
mod medicines;
mod patients;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

/// Body of mutations that return nothing else.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Routes mounted under `/api`.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/medicines", get(medicines::list))
        .route("/patients", get(patients::list).post(patients::create))
        .route("/patients/{id}", get(patients::get).delete(patients::delete))
        .route("/patients/{id}/entries", get(patients::entries))
        .route("/patients/{id}/timeline", get(patients::timeline))
        .route("/patients/{id}/doses", post(patients::record_dose))
        .route(
            "/patients/{id}/doses/{medicine}/early-check",
            get(patients::early_check),
        )
        .route("/entries", post(entries::create))
        .route("/entries/{id}", put(entries::update).delete(entries::delete))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
