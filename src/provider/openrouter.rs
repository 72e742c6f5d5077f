use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{compose_prompt, request_error, LlmProvider, ProviderError, ProviderKind};
use crate::config::OpenRouterConfig;

/// OpenRouter chat-completion provider.
///
/// Works with any OpenAI-compatible `chat/completions` endpoint.
pub struct OpenRouterProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

// ---- Chat completion API types ----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterProvider {
    pub fn new(
        config: &OpenRouterConfig,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(ProviderKind::OpenRouter, e))?;

        Ok(Self {
            client,
            endpoint: config.base_url.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            timeout,
        })
    }
}

/// Interpret a chat-completion response
fn parse_response(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("OpenRouter rate limit reached");
        return Err(ProviderError::RateLimited);
    }
    if status != StatusCode::OK {
        return Err(ProviderError::Http {
            provider: ProviderKind::OpenRouter,
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(ProviderKind::OpenRouter, e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            ProviderError::MalformedResponse(
                ProviderKind::OpenRouter,
                "empty choices in response".to_string(),
            )
        })
}

#[async_trait::async_trait]
impl LlmProvider for OpenRouterProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, content: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: compose_prompt(prompt, content),
            }],
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "calling chat completion API");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(ProviderKind::OpenRouter, self.timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(ProviderKind::OpenRouter, self.timeout, e))?;

        parse_response(status, &body)
    }
}
