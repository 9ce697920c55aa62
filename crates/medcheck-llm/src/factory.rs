//! Backend construction from configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{CompletionBackend, GenerateBackend, OpenAiCompatibleBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Generate,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

pub fn build_backend(cfg: &BackendConfig) -> Arc<dyn CompletionBackend> {
    tracing::info!(
        backend = ?cfg.kind,
        base_url = %cfg.base_url,
        model = %cfg.model,
        "Building text-completion backend"
    );
    match cfg.kind {
        BackendKind::Generate => Arc::new(
            GenerateBackend::new(cfg.base_url.clone()).with_model_label(cfg.model.clone()),
        ),
        BackendKind::OpenAiCompatible => Arc::new(OpenAiCompatibleBackend::new(
            cfg.base_url.clone(),
            cfg.model.clone(),
            cfg.api_key.clone(),
        )),
    }
}
