//! medcheck-llm — Text-completion backend abstraction layer.
//! Provides the CompletionBackend trait, the HTTP backends that speak to
//! the external generation service, and per-call audit entries.

pub mod backend;
pub mod factory;
pub mod audit;

pub use backend::{
    CompletionBackend, CompletionRequest, CompletionResponse, GenerateBackend, LlmError,
    OpenAiCompatibleBackend, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
pub use factory::{build_backend, BackendConfig, BackendKind};
pub use audit::LlmAuditEntry;
