//! Registration, login/logout and the bearer-token extractor.

use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use medcheck_common::PatientContext;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::{run_blocking, SharedState};

/// The user behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?
            .to_string();

        match state.session_user(&token)? {
            Some(username) => Ok(AuthUser { username, token }),
            None => Err(ApiError::Unauthorized),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub profile: PatientContext,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |st| {
        Ok(st.users.register(&req.username, &req.password, &req.profile)?)
    })
    .await?;
    Ok(StatusCode::CREATED)
}

/// POST /api/login
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim().to_string();
    let verified = {
        let username = username.clone();
        run_blocking(&state, move |st| Ok(st.users.verify(&username, &req.password)?)).await?
    };
    if !verified {
        tracing::info!(username = %username, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.open_session(&username)?;
    tracing::info!(username = %username, "Login succeeded");
    Ok(Json(LoginResponse { token, username }))
}

/// POST /api/logout
pub async fn logout(State(state): State<SharedState>, user: AuthUser) -> Result<StatusCode, ApiError> {
    state.close_session(&user.token)?;
    tracing::debug!(username = %user.username, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}
