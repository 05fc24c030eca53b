//! Entry create / update / delete.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dose_tracker_core::{Entry, EntryInput};
use serde::Deserialize;

use super::Success;
use crate::error::ApiResult;
use crate::state::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntry {
    pub patient_id: i64,
    #[serde(flatten)]
    pub input: EntryInput,
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Result<Json<CreateEntry>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let Json(request) = body?;
    let entry = state
        .run(move |tracker| tracker.create_entry(request.patient_id, &request.input))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<Json<Entry>> {
    let Path(id) = path?;
    let Json(input) = body?;
    let entry = state
        .run(move |tracker| tracker.update_entry(id, &input))
        .await?;
    Ok(Json(entry))
}

/// Succeeds whether or not the entry still existed.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Success>> {
    let Path(id) = path?;
    state.run(move |tracker| tracker.delete_entry(id)).await?;
    Ok(Success::ok())
}
