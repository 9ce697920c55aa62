//! Shared application state for the web server.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use medcheck_db::{Database, MedicationRepository, UserRepository};
use medcheck_graph::LayoutConfig;
use medcheck_interactions::{EvaluatorConfig, PairwiseEvaluator};
use medcheck_llm::CompletionBackend;
use uuid::Uuid;

use crate::error::ApiError;

/// How long a login token stays valid.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone)]
struct Session {
    username: String,
    issued_at: Instant,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub users: UserRepository,
    pub medications: MedicationRepository,
    pub evaluator: PairwiseEvaluator,
    pub layout: LayoutConfig,
    /// Token -> session, process-local. Entries older than `session_ttl` are
    /// rejected on lookup and purged whenever a new session is opened.
    sessions: RwLock<HashMap<String, Session>>,
    session_ttl: Duration,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        backend: Arc<dyn CompletionBackend>,
        evaluator: EvaluatorConfig,
        layout: LayoutConfig,
    ) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            medications: MedicationRepository::new(db.clone()),
            evaluator: PairwiseEvaluator::new(backend, evaluator),
            layout,
            db,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Issue a fresh token for `username`, dropping expired sessions first.
    pub fn open_session(&self, username: &str) -> Result<String, ApiError> {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ApiError::Internal("session lock".into()))?;

        let before = sessions.len();
        sessions.retain(|_, s| s.issued_at.elapsed() < self.session_ttl);
        if sessions.len() < before {
            tracing::debug!(purged = before - sessions.len(), "Expired sessions purged");
        }

        sessions.insert(
            token.clone(),
            Session { username: username.to_string(), issued_at: Instant::now() },
        );
        Ok(token)
    }

    pub fn session_user(&self, token: &str) -> Result<Option<String>, ApiError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .get(token)
            .filter(|s| s.issued_at.elapsed() < self.session_ttl)
            .map(|s| s.username.clone()))
    }

    /// Drop a token. Returns whether it was live.
    pub fn close_session(&self, token: &str) -> Result<bool, ApiError> {
        Ok(self
            .sessions
            .write()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .remove(token)
            .is_some())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }
}

pub type SharedState = Arc<AppState>;

/// Run store work (SQLite I/O, Argon2 hashing) on the blocking pool so it
/// never stalls a runtime worker.
pub async fn run_blocking<T, F>(state: &SharedState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcheck_test_utils::ScriptedBackend;

    fn state(ttl: Duration) -> AppState {
        AppState::new(
            Arc::new(Database::in_memory().unwrap()),
            Arc::new(ScriptedBackend::always("+1")),
            EvaluatorConfig::default(),
            LayoutConfig::default(),
        )
        .with_session_ttl(ttl)
    }

    #[test]
    fn test_session_lookup_and_close() {
        let st = state(DEFAULT_SESSION_TTL);
        let token = st.open_session("alice").unwrap();
        assert_eq!(st.session_user(&token).unwrap().as_deref(), Some("alice"));
        assert!(st.close_session(&token).unwrap());
        assert_eq!(st.session_user(&token).unwrap(), None);
        assert!(!st.close_session(&token).unwrap());
    }

    #[test]
    fn test_expired_tokens_are_rejected() {
        let st = state(Duration::ZERO);
        let token = st.open_session("alice").unwrap();
        assert_eq!(st.session_user(&token).unwrap(), None);
    }

    #[test]
    fn test_logins_without_logout_do_not_accumulate() {
        let st = state(Duration::ZERO);
        for _ in 0..50 {
            st.open_session("alice").unwrap();
        }
        // Each open purges everything already expired, so only the newest remains.
        assert_eq!(st.session_count(), 1);
    }
}
