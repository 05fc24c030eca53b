//! Signup, login and logout.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use dose_tracker_core::{IssuedToken, User};
use serde::Deserialize;

use super::Success;
use crate::error::ApiResult;
use crate::state::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(credentials) = body?;
    let user = state
        .run(move |tracker| tracker.signup(&credentials.email, &credentials.password))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<IssuedToken>> {
    let Json(credentials) = body?;
    let issued = state
        .run(move |tracker| tracker.login(&credentials.email, &credentials.password))
        .await?;
    Ok(Json(issued))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Success>> {
    state.run(move |tracker| tracker.logout(&auth.token)).await?;
    Ok(Success::ok())
}
