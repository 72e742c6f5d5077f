//! Summary struct - the output of one summarize action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// A summary produced by an LLM provider for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The page that was summarized
    pub url: String,
    /// Provider that produced the text
    pub provider: ProviderKind,
    /// Model used by the provider
    pub model: String,
    /// The summary itself
    pub text: String,
    /// When the summary was created
    pub created_at: DateTime<Utc>,
}

impl Summary {
    /// Create a new summary
    pub fn new(url: String, provider: ProviderKind, model: String, text: String) -> Self {
        Self {
            url,
            provider,
            model,
            text,
            created_at: Utc::now(),
        }
    }

    /// Check if the provider returned anything
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Plain-text rendering used for email bodies
    pub fn to_plain_text(&self) -> String {
        format!(
            "{}\n\n--\nSource: {}\nGenerated by {} ({}) at {}\n",
            self.text,
            self.url,
            self.model,
            self.provider,
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}
