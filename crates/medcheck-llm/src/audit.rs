//! Audit entries for text-completion calls.
//! Prompts carry patient context, so only their hashes are kept.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub backend: String,
    pub model: String,
    pub prompt_hash: String,
    pub output_hash: Option<String>,
    pub succeeded: bool,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    /// `output` is `None` when the call failed.
    pub fn new(
        backend: impl Into<String>,
        model: impl Into<String>,
        prompt: &str,
        output: Option<&str>,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend: backend.into(),
            model: model.into(),
            prompt_hash: sha256_hex(prompt),
            output_hash: output.map(sha256_hex),
            succeeded: output.is_some(),
            latency_ms,
            called_at: Utc::now(),
        }
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_call_has_no_output_hash() {
        let entry = LlmAuditEntry::new("generate", "remote", "prompt", None, 12);
        assert!(!entry.succeeded);
        assert!(entry.output_hash.is_none());
        assert_eq!(entry.prompt_hash.len(), 64);
    }

    #[test]
    fn test_identical_output_hashes_match() {
        let a = LlmAuditEntry::new("generate", "remote", "p1", Some("-1"), 5);
        let b = LlmAuditEntry::new("generate", "remote", "p2", Some("-1"), 7);
        assert_eq!(a.output_hash, b.output_hash);
        assert_ne!(a.prompt_hash, b.prompt_hash);
        assert_ne!(a.id, b.id);
    }
}
