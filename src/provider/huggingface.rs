use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{request_error, LlmProvider, ProviderError, ProviderKind};
use crate::config::HuggingFaceConfig;

/// HuggingFace hosted inference provider.
///
/// Summarization models on the inference API take raw text only, so the
/// prompt is not sent.
pub struct HuggingFaceProvider {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct InferenceOutput {
    summary_text: Option<String>,
}

impl HuggingFaceProvider {
    pub fn new(
        config: &HuggingFaceConfig,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(ProviderKind::HuggingFace, e))?;

        Ok(Self {
            client,
            api_url: format!("{}/{}", config.base_url.trim_end_matches('/'), config.model),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Interpret an inference API response
fn parse_response(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    if status != StatusCode::OK {
        return Err(ProviderError::Http {
            provider: ProviderKind::HuggingFace,
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let outputs: Vec<InferenceOutput> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(ProviderKind::HuggingFace, e.to_string()))?;

    outputs
        .into_iter()
        .next()
        .and_then(|o| o.summary_text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            ProviderError::MalformedResponse(
                ProviderKind::HuggingFace,
                "missing summary_text in first result".to_string(),
            )
        })
}

#[async_trait::async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, content: &str, _prompt: &str) -> Result<String, ProviderError> {
        debug!(url = %self.api_url, "calling HuggingFace inference API");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&InferenceRequest { inputs: content })
            .send()
            .await
            .map_err(|e| request_error(ProviderKind::HuggingFace, self.timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(ProviderKind::HuggingFace, self.timeout, e))?;

        parse_response(status, &body)
    }
}
