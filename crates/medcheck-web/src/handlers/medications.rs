use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use medcheck_common::MedicationEntry;

use crate::error::ApiError;
use crate::handlers::auth::AuthUser;
use crate::state::{run_blocking, SharedState};

pub const MISSING_FIELDS_MESSAGE: &str = "Please enter both medication and dosage.";

/// GET /api/medications
pub async fn list_medications(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<Vec<MedicationEntry>>, ApiError> {
    let entries = run_blocking(&state, move |st| Ok(st.medications.list(&user.username)?)).await?;
    Ok(Json(entries))
}

/// POST /api/medications
///
/// Responds with the full updated list.
pub async fn add_medication(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(entry): Json<MedicationEntry>,
) -> Result<(StatusCode, Json<Vec<MedicationEntry>>), ApiError> {
    if entry.validate().is_err() {
        return Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()));
    }
    let entries = run_blocking(&state, move |st| {
        st.medications.add(&user.username, &entry)?;
        Ok(st.medications.list(&user.username)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(entries)))
}
