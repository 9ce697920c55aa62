//! Axum router — maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    auth::{login, logout, register},
    check::check_interactions,
    health::health,
    medications::{add_medication, list_medications},
    profile::{get_profile, update_profile},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/health",          get(health))

        // Accounts & sessions
        .route("/api/register",    post(register))
        .route("/api/login",       post(login))
        .route("/api/logout",      post(logout))

        // Per-user data
        .route("/api/profile",     get(get_profile).put(update_profile))
        .route("/api/medications", get(list_medications).post(add_medication))

        // Interaction check
        .route("/api/check",       post(check_interactions))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
