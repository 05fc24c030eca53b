use axum::{extract::State, Json};
use dose_tracker_core::MedicineConfig;

use crate::state::{AppState, AuthUser};

/// The medicine registry in name order.
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> Json<Vec<MedicineConfig>> {
    Json(state.tracker.registry().iter().cloned().collect())
}
