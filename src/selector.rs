//! Picks the provider a session talks to.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{HuggingFaceConfig, LlmsConfig, OllamaConfig, OpenRouterConfig, Secrets};
use crate::provider::{
    HuggingFaceProvider, LlmProvider, OllamaProvider, OpenRouterProvider, ProviderError,
    ProviderKind,
};

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("no LLM provider is enabled in llms_config")]
    NoProviderSelected,
}

/// The single enabled provider and its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedProvider {
    Ollama(OllamaConfig),
    HuggingFace(HuggingFaceConfig),
    OpenRouter(OpenRouterConfig),
}

/// Pick the enabled provider.
///
/// When several are enabled the first one in the order ollama, huggingface,
/// openrouter wins.
pub fn select(config: &LlmsConfig) -> Result<ResolvedProvider, SelectError> {
    if let Some(ollama) = config.ollama.as_ref().filter(|c| c.enabled) {
        return Ok(ResolvedProvider::Ollama(ollama.clone()));
    }
    if let Some(hf) = config.huggingface.as_ref().filter(|c| c.enabled) {
        return Ok(ResolvedProvider::HuggingFace(hf.clone()));
    }
    if let Some(or) = config.openrouter.as_ref().filter(|c| c.enabled) {
        return Ok(ResolvedProvider::OpenRouter(or.clone()));
    }
    Err(SelectError::NoProviderSelected)
}

impl ResolvedProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ResolvedProvider::Ollama(_) => ProviderKind::Ollama,
            ResolvedProvider::HuggingFace(_) => ProviderKind::HuggingFace,
            ResolvedProvider::OpenRouter(_) => ProviderKind::OpenRouter,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ResolvedProvider::Ollama(c) => &c.model,
            ResolvedProvider::HuggingFace(c) => &c.model,
            ResolvedProvider::OpenRouter(c) => &c.model,
        }
    }

    /// Construct the adapter for this provider
    pub fn build(
        &self,
        secrets: &Secrets,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let provider: Arc<dyn LlmProvider> = match self {
            ResolvedProvider::Ollama(config) => Arc::new(OllamaProvider::new(config, timeout)),
            ResolvedProvider::HuggingFace(config) => {
                let api_key = secrets
                    .huggingface_api_key
                    .as_deref()
                    .ok_or(ProviderError::MissingApiKey(Secrets::HUGGINGFACE_API_KEY))?;
                Arc::new(HuggingFaceProvider::new(config, api_key, timeout)?)
            }
            ResolvedProvider::OpenRouter(config) => {
                let api_key = secrets
                    .openrouter_api_key
                    .as_deref()
                    .ok_or(ProviderError::MissingApiKey(Secrets::OPENROUTER_API_KEY))?;
                Arc::new(OpenRouterProvider::new(config, api_key, timeout)?)
            }
        };
        Ok(provider)
    }
}
