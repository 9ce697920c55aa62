//! Text-completion backend trait and concrete implementations.
//!
//! Backends:
//!   GenerateBackend         — the generation service (`POST /generate/`,
//!                             `{prompt, max_tokens, temperature}` → `{response}`)
//!   OpenAiCompatibleBackend — any OpenAI-style `/v1/completions` endpoint
//!                             (llama.cpp server, vLLM, Ollama, LMStudio, …)
//!
//! Every call is a single request. There is no retry, no caching and no
//! timeout beyond what the HTTP transport enforces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token budget used for interaction checks.
pub const DEFAULT_MAX_TOKENS: u32 = 200;
/// Sampling temperature used for interaction checks.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("Service error [{status}]: {body}")]
    Service { status: u16, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn ensure_prompt(&self) -> Result<(), LlmError> {
        if self.prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError>;
    fn model_id(&self) -> &str;
    fn backend_name(&self) -> &'static str;

    /// Generate text for `prompt`. `max_tokens` and `temperature` are passed
    /// through to the service unvalidated.
    async fn complete_text(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let req = CompletionRequest::new(prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);
        Ok(self.complete(req).await?.text)
    }
}

// ── Helper: status handling ──────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(LlmError::Service { status: status.as_u16(), body });
    }
    Ok(resp.json().await?)
}

// ── 1. Generation service ────────────────────────────────────────────────────

pub struct GenerateBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl GenerateBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: "generate".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Label used in logs and audit entries; the service itself picks the model.
    pub fn with_model_label(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for GenerateBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        req.ensure_prompt()?;
        let url = format!("{}/generate/", self.base_url.trim_end_matches('/'));
        let resp = self.client.post(&url).json(&req).send().await?;
        let json = check_response_status(resp).await?;
        let text = json["response"]
            .as_str()
            .ok_or_else(|| LlmError::MalformedResponse("missing `response` field".to_string()))?
            .to_string();
        Ok(CompletionResponse { text, model: self.model.clone() })
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &'static str { "generate" }
}

// ── 2. OpenAI-Compatible completions ─────────────────────────────────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k),
            None    => req,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        req.ensure_prompt()?;
        let url = format!("{}/v1/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model":       &self.model,
            "prompt":      req.prompt,
            "max_tokens":  req.max_tokens,
            "temperature": req.temperature,
        });
        let resp = self.auth(self.client.post(&url)).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        let text = json["choices"][0]["text"]
            .as_str()
            .ok_or_else(|| LlmError::MalformedResponse("missing `choices[0].text`".to_string()))?
            .trim()
            .to_string();
        Ok(CompletionResponse {
            text,
            model: json["model"].as_str().unwrap_or(&self.model).to_string(),
        })
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &'static str { "openai_compatible" }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_backend_sends_prompt_and_sampling_parameters() {
        let app = Router::new().route(
            "/generate/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "response": format!(
                        "{}|{}|{}",
                        body["prompt"].as_str().unwrap_or_default(),
                        body["max_tokens"],
                        body["temperature"],
                    )
                }))
            }),
        );
        let base = spawn_server(app).await;
        let backend = GenerateBackend::new(format!("{base}/"));

        let text = backend.complete_text("Drug 1: A", 200, 0.5).await.unwrap();
        assert_eq!(text, "Drug 1: A|200|0.5");
    }

    #[tokio::test]
    async fn test_generate_backend_non_success_carries_status_and_body() {
        let app = Router::new().route(
            "/generate/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Model not loaded.") }),
        );
        let base = spawn_server(app).await;
        let backend = GenerateBackend::new(base);

        let err = backend.complete(CompletionRequest::new("hello")).await.unwrap_err();
        match err {
            LlmError::Service { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Model not loaded.");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_before_sending() {
        // Nothing listens here; an attempted request would surface as Http.
        let backend = GenerateBackend::new("http://127.0.0.1:9");
        let err = backend.complete(CompletionRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyPrompt));
    }

    #[tokio::test]
    async fn test_generate_backend_missing_field_is_malformed() {
        let app = Router::new().route(
            "/generate/",
            post(|| async { Json(json!({"text": "+1"})) }),
        );
        let base = spawn_server(app).await;
        let err = GenerateBackend::new(base)
            .complete(CompletionRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_openai_compatible_reads_first_choice() {
        let app = Router::new().route(
            "/v1/completions",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "model": body["model"],
                    "choices": [{ "text": "  -1\n" }]
                }))
            }),
        );
        let base = spawn_server(app).await;
        let backend = OpenAiCompatibleBackend::new(base, "llama-3.2-1b", None);

        let resp = backend.complete(CompletionRequest::new("pair")).await.unwrap();
        assert_eq!(resp.text, "-1");
        assert_eq!(resp.model, "llama-3.2-1b");
    }

    #[test]
    fn test_request_defaults_match_interaction_checks() {
        let req = CompletionRequest::new("x");
        assert_eq!(req.max_tokens, 200);
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(GenerateBackend::new("http://localhost:8000").backend_name(), "generate");
        let b = OpenAiCompatibleBackend::new("http://localhost:1234", "local-model", None);
        assert_eq!(b.model_id(), "local-model");
        assert_eq!(b.backend_name(), "openai_compatible");
    }
}
