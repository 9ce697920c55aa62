//! medcheck-test-utils — Scripted completion backend and fixtures shared by
//! the workspace's tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use medcheck_common::{Gender, MedicationEntry, PatientContext, Route};
use medcheck_llm::{CompletionBackend, CompletionRequest, CompletionResponse, LlmError};

type Responder = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// A backend that answers from a closure and records every request it sees.
pub struct ScriptedBackend {
    responder: Responder,
    delay: Option<Duration>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self { responder: Box::new(f), delay: None, calls: Mutex::new(Vec::new()) }
    }

    /// Always answer with `text`.
    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Always fail with a non-success service status.
    pub fn failing(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::from_fn(move |_| Err(LlmError::Service { status, body: body.clone() }))
    }

    /// Sleep before every answer; used to exercise concurrent fan-out.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(req.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = (self.responder)(&req.prompt)?;
        Ok(CompletionResponse { text, model: "scripted".to_string() })
    }

    fn model_id(&self) -> &str { "scripted" }
    fn backend_name(&self) -> &'static str { "scripted" }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn sample_patient() -> PatientContext {
    PatientContext {
        height_cm: 175.0,
        weight_kg: 72.5,
        comorbidities: "hypertension".to_string(),
        route: Route::Oral,
        gender: Gender::Male,
        substance_use: "none".to_string(),
    }
}

pub fn medications(entries: &[(&str, &str)]) -> Vec<MedicationEntry> {
    entries
        .iter()
        .map(|(name, dosage)| MedicationEntry::new(*name, *dosage))
        .collect()
}
