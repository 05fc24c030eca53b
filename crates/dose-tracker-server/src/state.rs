//! Shared application state and the signed-in user extractor.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use dose_tracker_core::{DoseTracker, TrackerResult, User};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<DoseTracker>,
}

impl AppState {
    pub fn new(tracker: DoseTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }

    /// Run a facade call on the blocking pool.
    pub async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&DoseTracker) -> TrackerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || f(&tracker))
            .await
            .map_err(ApiError::internal)?
            .map_err(ApiError::from)
    }
}

/// The user behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let lookup = token.clone();
        let user = state.run(move |tracker| tracker.authenticate(&lookup)).await?;
        Ok(AuthUser { user, token })
    }
}

fn bearer_token(headers: &HeaderMap) -> ApiResult<String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized("Expected a Bearer token")),
    }
}
