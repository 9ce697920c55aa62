//! The interaction check: stored medications and profile in, flagged pairs
//! and a laid-out graph out.

use axum::extract::State;
use axum::Json;
use medcheck_common::InteractionRecord;
use medcheck_graph::{build_graph_with, InteractionGraph};
use medcheck_interactions::pair_count;
use serde::Serialize;

use crate::error::ApiError;
use crate::handlers::auth::AuthUser;
use crate::state::{run_blocking, SharedState};

pub const NO_INTERACTIONS_MESSAGE: &str = "No interactions found.";
pub const NO_MEDICATIONS_MESSAGE: &str = "Please add medication to check compatibility.";

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub interactions: Vec<InteractionRecord>,
    pub summary: String,
    pub pairs_checked: usize,
    pub graph: InteractionGraph,
}

fn summarize(medication_count: usize, records: &[InteractionRecord]) -> String {
    if medication_count == 0 {
        return NO_MEDICATIONS_MESSAGE.to_string();
    }
    match records.len() {
        0 => NO_INTERACTIONS_MESSAGE.to_string(),
        1 => "Potential Drug Interactions: 1 pair flagged.".to_string(),
        n => format!("Potential Drug Interactions: {n} pairs flagged."),
    }
}

/// POST /api/check
///
/// Costs one completion call per medication pair, so N medications take
/// N·(N−1)/2 calls.
pub async fn check_interactions(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<CheckResponse>, ApiError> {
    let username = user.username.clone();
    let (profile, medications) = run_blocking(&state, move |st| {
        Ok((st.users.profile(&username)?, st.medications.list(&username)?))
    })
    .await?;
    let profile = profile.ok_or_else(|| ApiError::NotFound(format!("profile for '{}'", user.username)))?;

    tracing::info!(
        username = %user.username,
        medications = medications.len(),
        calls = pair_count(medications.len()),
        "Interaction check requested"
    );

    let interactions = state.evaluator.evaluate(&medications, &profile).await;
    let graph = build_graph_with(&interactions, &state.layout);

    Ok(Json(CheckResponse {
        summary: summarize(medications.len(), &interactions),
        pairs_checked: pair_count(medications.len()),
        interactions,
        graph,
    }))
}
