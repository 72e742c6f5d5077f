//! LLM agent module: wraps the selected provider for the rest of the app.

pub use crate::summary::Summary;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{LlmsConfig, Secrets};
use crate::provider::{LlmProvider, ProviderError, ProviderKind};
use crate::selector::{self, SelectError};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// AI Summarizer that wraps the configured provider
#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
}

impl Summarizer {
    /// Select and build the provider described by the configuration
    pub fn from_config(config: &LlmsConfig, secrets: &Secrets) -> Result<Self, AgentError> {
        let resolved = selector::select(config)?;
        let provider = resolved.build(secrets, config.timeout())?;
        info!(provider = %resolved.kind(), model = resolved.model(), "LLM provider initialized");
        Ok(Self { provider })
    }

    /// Wrap an already constructed provider
    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Label for the summarize action, naming the model and provider
    pub fn label(&self) -> String {
        format!("Summarize with {} ({})", self.model(), self.kind())
    }

    /// Run the provider on the extracted text of `url`
    pub async fn summarize(
        &self,
        url: &str,
        content: &str,
        prompt: &str,
    ) -> Result<Summary, ProviderError> {
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        info!(url, provider = %self.kind(), chars = content.len(), "summarizing");
        let text = self.provider.summarize(content, prompt).await?;

        let summary = Summary::new(url.to_string(), self.kind(), self.model().to_string(), text);
        if summary.is_empty() {
            warn!(url, provider = %self.kind(), "provider returned an empty summary");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingProvider {
        calls: Mutex<Vec<(String, String)>>,
    }

    struct BlankProvider;

    #[async_trait::async_trait]
    impl LlmProvider for BlankProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenRouter
        }

        fn model(&self) -> &str {
            "m"
        }

        async fn summarize(&self, _content: &str, _prompt: &str) -> Result<String, ProviderError> {
            Ok("  \n".to_string())
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for RecordingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Ollama
        }

        fn model(&self) -> &str {
            "mistral"
        }

        async fn summarize(&self, content: &str, prompt: &str) -> Result<String, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((content.to_string(), prompt.to_string()));
            Ok("summary".to_string())
        }
    }

    #[test]
    fn test_label_names_model_and_provider() {
        let summarizer = Summarizer::with_provider(Arc::new(RecordingProvider {
            calls: Mutex::new(Vec::new()),
        }));
        assert_eq!(summarizer.label(), "Summarize with mistral (Ollama)");
    }

    #[tokio::test]
    async fn test_summarize_records_provenance() {
        let provider = Arc::new(RecordingProvider {
            calls: Mutex::new(Vec::new()),
        });
        let summarizer = Summarizer::with_provider(provider.clone());

        let summary = summarizer
            .summarize("https://example.com", "page text", "prompt")
            .await
            .unwrap();

        assert_eq!(summary.text, "summary");
        assert_eq!(summary.provider, ProviderKind::Ollama);
        assert_eq!(summary.model, "mistral");
        assert_eq!(summary.url, "https://example.com");
        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            &[("page text".to_string(), "prompt".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_content_skips_provider() {
        let provider = Arc::new(RecordingProvider {
            calls: Mutex::new(Vec::new()),
        });
        let summarizer = Summarizer::with_provider(provider.clone());

        let err = summarizer
            .summarize("https://example.com", "  \n ", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyContent));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_provider_output_is_kept() {
        let summarizer = Summarizer::with_provider(Arc::new(BlankProvider));
        let summary = summarizer
            .summarize("https://example.com", "page text", "prompt")
            .await
            .unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.provider, ProviderKind::OpenRouter);
    }

    #[test]
    fn test_from_config_without_provider() {
        let err = Summarizer::from_config(&LlmsConfig::default(), &Secrets::default())
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::Select(SelectError::NoProviderSelected)));
    }
}
