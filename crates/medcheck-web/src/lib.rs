//! medcheck-web — JSON API for MedCheck
//! Provides:
//!   - Account registration and bearer-token sessions
//!   - Patient profile and medication list management
//!   - Pairwise interaction check with a laid-out interaction graph

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, SharedState};
