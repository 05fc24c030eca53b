//! Patient routes and per-patient views.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use dose_tracker_core::{EarlyDoseWarning, Entry, Patient, PatientTimeline};
use serde::{Deserialize, Serialize};

use super::Success;
use crate::error::ApiResult;
use crate::state::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct CreatePatient {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordDose {
    pub medicine: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyCheck {
    pub medicine: String,
    pub checked_at: DateTime<Utc>,
    pub early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<EarlyDoseWarning>,
}

pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<Patient>>> {
    let patients = state
        .run(move |tracker| tracker.list_patients(&auth.user))
        .await?;
    Ok(Json(patients))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreatePatient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let Json(request) = body?;
    let patient = state
        .run(move |tracker| tracker.create_patient(&auth.user, &request.name))
        .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Patient>> {
    let Path(id) = path?;
    let patient = state.run(move |tracker| tracker.get_patient(id)).await?;
    Ok(Json(patient))
}

pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Success>> {
    let Path(id) = path?;
    state.run(move |tracker| tracker.delete_patient(id)).await?;
    Ok(Success::ok())
}

/// Raw entries, newest first.
pub async fn entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Entry>>> {
    let Path(id) = path?;
    let entries = state.run(move |tracker| tracker.list_entries(id)).await?;
    Ok(Json(entries))
}

/// Upcoming / past / temperature views as of now.
pub async fn timeline(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<PatientTimeline>> {
    let Path(id) = path?;
    let timeline = state
        .run(move |tracker| tracker.timeline(id, Utc::now()))
        .await?;
    Ok(Json(timeline))
}

/// "Give dose now". Early doses are accepted; clients confirm beforehand
/// via the early-check route.
pub async fn record_dose(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<RecordDose>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let Path(id) = path?;
    let Json(request) = body?;
    let entry = state
        .run(move |tracker| tracker.record_dose(id, &request.medicine))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn early_check(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<(i64, String)>, PathRejection>,
) -> ApiResult<Json<EarlyCheck>> {
    let Path((id, medicine)) = path?;
    let now = Utc::now();
    let lookup = medicine.clone();
    let warning = state
        .run(move |tracker| tracker.early_dose_check(id, &lookup, now))
        .await?;
    Ok(Json(EarlyCheck {
        medicine,
        checked_at: now,
        early: warning.is_some(),
        warning,
    }))
}
