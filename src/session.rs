//! Per-session state and the actions a user can take.

use tracing::{info, warn};

use crate::agent::Summarizer;
use crate::mail::{self, EmailError, MailSettings};
use crate::prompt::{PromptError, PromptLibrary, DEFAULT_PROMPT};
use crate::provider::ProviderError;
use crate::scraper::{ScrapeError, Scraper};
use crate::summary::Summary;
use crate::util::truncate_chars;

/// Characters of extracted text written to the log
const LOG_PREVIEW_CHARS: usize = 300;

/// Text extracted from the current page
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub text: String,
}

/// One user's interactive state: the initialized scraper and provider plus
/// whatever the last actions produced.
pub struct Session {
    scraper: Scraper,
    summarizer: Summarizer,
    prompts: PromptLibrary,
    mail: Option<MailSettings>,
    prompt_name: Option<String>,
    prompt_override: Option<String>,
    page: Option<Page>,
    summary: Option<Summary>,
}

impl Session {
    pub fn new(
        scraper: Scraper,
        summarizer: Summarizer,
        prompts: PromptLibrary,
        mail: Option<MailSettings>,
    ) -> Self {
        if prompts.is_empty() {
            info!("no prompt files configured, using the built-in prompt");
        }
        let prompt_name = prompts.default_name().map(str::to_string);
        Self {
            scraper,
            summarizer,
            prompts,
            mail,
            prompt_name,
            prompt_override: None,
            page: None,
            summary: None,
        }
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn prompt_name(&self) -> Option<&str> {
        self.prompt_name.as_deref()
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn can_email(&self) -> bool {
        self.mail.is_some()
    }

    /// Fetch `url` and make it the current page. The previous summary is
    /// discarded; on failure the previous page is discarded too.
    pub async fn load_url(&mut self, url: &str) -> Result<&Page, ScrapeError> {
        self.summary = None;
        self.page = None;

        let text = self.scraper.fetch_text(url).await?;
        info!(url, "page text fetched");
        info!(
            "extracted content (truncated): {}",
            truncate_chars(&text, LOG_PREVIEW_CHARS)
        );

        Ok(&*self.page.insert(Page {
            url: url.trim().to_string(),
            text,
        }))
    }

    /// Switch to another configured prompt, dropping any edited prompt
    pub fn select_prompt(&mut self, name: &str) -> Result<(), PromptError> {
        self.prompts.load(name)?;
        self.prompt_name = Some(name.to_string());
        self.prompt_override = None;
        Ok(())
    }

    /// Use `text` as the prompt until another prompt is selected
    pub fn override_prompt(&mut self, text: String) {
        self.prompt_override = Some(text);
    }

    /// The prompt text the next summarize call will send
    pub fn current_prompt(&self) -> Result<String, PromptError> {
        if let Some(text) = &self.prompt_override {
            return Ok(text.clone());
        }
        match &self.prompt_name {
            Some(name) => self.prompts.load(name),
            None => Ok(DEFAULT_PROMPT.to_string()),
        }
    }

    /// Summarize the current page with the session's provider
    pub async fn summarize(&mut self) -> Result<&Summary, SessionError> {
        let page = self.page.as_ref().ok_or(SessionError::NoPage)?;
        let prompt = self.current_prompt()?;

        let summary = self
            .summarizer
            .summarize(&page.url, &page.text, &prompt)
            .await
            .inspect_err(|e| warn!(error = %e, "summarization failed"))?;
        info!(chars = summary.text.len(), "summary generated");

        Ok(&*self.summary.insert(summary))
    }

    /// Email the current summary. The summary stays available on failure.
    pub async fn email(&self, recipient: &str) -> Result<(), SessionError> {
        let settings = self.mail.as_ref().ok_or(SessionError::MailNotConfigured)?;
        let summary = self.summary.as_ref().ok_or(SessionError::NoSummary)?;

        mail::send_email(settings, recipient, summary)
            .await
            .inspect_err(|e| warn!(error = %e, "email delivery failed"))?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("enter a URL first")]
    NoPage,
    #[error("there is no summary to send yet")]
    NoSummary,
    #[error("email is not configured: set EMAIL_ADDRESS, EMAIL_PASSWORD, EMAIL_HOST and EMAIL_PORT")]
    MailNotConfigured,
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Email(#[from] EmailError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use crate::provider::{LlmProvider, ProviderKind};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct EchoProvider;

    #[async_trait::async_trait]
    impl LlmProvider for EchoProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenRouter
        }

        fn model(&self) -> &str {
            "echo"
        }

        async fn summarize(&self, content: &str, prompt: &str) -> Result<String, ProviderError> {
            Ok(format!("{prompt}|{content}"))
        }
    }

    fn session(prompts: PromptLibrary) -> Session {
        let scraper = Scraper::new(&ScraperConfig::default()).unwrap();
        let summarizer = Summarizer::with_provider(Arc::new(EchoProvider));
        Session::new(scraper, summarizer, prompts, None)
    }

    #[tokio::test]
    async fn test_summarize_without_page() {
        let mut session = session(PromptLibrary::default());
        let err = session.summarize().await.unwrap_err();
        assert!(matches!(err, SessionError::NoPage));
    }

    #[tokio::test]
    async fn test_email_requires_settings() {
        let session = session(PromptLibrary::default());
        let err = session.email("reader@example.org").await.unwrap_err();
        assert!(matches!(err, SessionError::MailNotConfigured));
        assert!(!session.can_email());
    }

    #[tokio::test]
    async fn test_invalid_url_clears_state() {
        let mut session = session(PromptLibrary::default());
        let err = session.load_url("notaurl").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
        assert!(session.page().is_none());
        assert!(session.summary().is_none());
    }

    #[test]
    fn test_prompt_selection_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "prompt a").unwrap();
        std::fs::write(&b, "prompt b").unwrap();

        let mut files = BTreeMap::new();
        files.insert("a".to_string(), a);
        files.insert("b".to_string(), b);
        let mut session = session(PromptLibrary::new(files));

        assert_eq!(session.prompt_name(), Some("a"));
        assert_eq!(session.current_prompt().unwrap(), "prompt a");

        session.override_prompt("edited".to_string());
        assert_eq!(session.current_prompt().unwrap(), "edited");

        session.select_prompt("b").unwrap();
        assert_eq!(session.current_prompt().unwrap(), "prompt b");

        assert!(session.select_prompt("c").is_err());
        assert_eq!(session.prompt_name(), Some("b"));
    }

    #[test]
    fn test_default_prompt_without_files() {
        let session = session(PromptLibrary::default());
        assert_eq!(session.current_prompt().unwrap(), DEFAULT_PROMPT);
    }
}
