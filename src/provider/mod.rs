//! LLM provider adapters.
//!
//! Each backend implements [`LlmProvider`]; [`crate::selector`] decides which
//! one a session uses.

mod huggingface;
mod ollama;
mod openrouter;

pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;
pub use openrouter::OpenRouterProvider;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Shown to the user when the chat-completion API answers 429
pub const RATE_LIMIT_MESSAGE: &str = "The daily request limit for OpenRouter has been reached. \
A lot of people used the service today. Please try again tomorrow.";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} not found. Make sure it is installed and on PATH")]
    RuntimeNotFound(String),
    #[error("{runtime} error: {stderr}")]
    Process { runtime: String, stderr: String },
    #[error("missing API key: set {0} in the environment or .env")]
    MissingApiKey(&'static str),
    #[error("{provider} error: HTTP {status} - {body}")]
    Http {
        provider: ProviderKind,
        status: u16,
        body: String,
    },
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,
    #[error("{0} request failed: {1}")]
    Request(ProviderKind, #[source] reqwest::Error),
    #[error("{0} did not answer within {1:?}")]
    Timeout(ProviderKind, Duration),
    #[error("{0} returned an unexpected response: {1}")]
    MalformedResponse(ProviderKind, String),
    #[error("I/O error talking to {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("nothing to summarize: the extracted content is empty")]
    EmptyContent,
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

/// The supported backends, in selection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    HuggingFace,
    OpenRouter,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "Ollama",
            ProviderKind::HuggingFace => "HuggingFace",
            ProviderKind::OpenRouter => "OpenRouter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for LLM summarization providers
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Summarize `content` following the instructions in `prompt`
    async fn summarize(&self, content: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Combine the prompt and page content into a single instruction
pub fn compose_prompt(prompt: &str, content: &str) -> String {
    format!("{prompt}\nThe contents of this website is as follows:\n{content}")
}

/// Map a reqwest failure onto the provider taxonomy
fn request_error(kind: ProviderKind, timeout: Duration, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(kind, timeout)
    } else {
        ProviderError::Request(kind, e)
    }
}
