use axum::extract::State;
use axum::Json;
use medcheck_common::PatientContext;

use crate::error::ApiError;
use crate::handlers::auth::AuthUser;
use crate::state::{run_blocking, SharedState};

/// GET /api/profile
pub async fn get_profile(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<PatientContext>, ApiError> {
    let username = user.username.clone();
    run_blocking(&state, move |st| Ok(st.users.profile(&username)?))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("profile for '{}'", user.username)))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(profile): Json<PatientContext>,
) -> Result<Json<PatientContext>, ApiError> {
    let stored = profile.clone();
    run_blocking(&state, move |st| Ok(st.users.update_profile(&user.username, &stored)?)).await?;
    Ok(Json(profile))
}
