use super::error::ProviderError;
use super::types;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const API_KEY_REASON_PREFIX: &str = "API_KEY_";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, joined. A reply without any text
    /// (e.g. a prompt blocked by safety filters) is a provider failure.
    fn into_text(self) -> Result<String, ProviderError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::Failed("Gemini returned no text".to_string()));
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(
            "Gemini text provider initialized (model: {}, timeout: {:?})",
            model, timeout
        );
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

        // 403 also covers project-level denials, so only 401 and an explicit
        // key reason count as credential failures here.
        let key_rejected = status == StatusCode::UNAUTHORIZED
            || parsed.as_ref().is_some_and(|e| {
                e.details.iter().any(|d| {
                    d.reason
                        .as_deref()
                        .is_some_and(|r| r.starts_with(API_KEY_REASON_PREFIX))
                })
            });

        let message = parsed
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        if key_rejected {
            ProviderError::Auth(message)
        } else {
            ProviderError::Failed(format!("Gemini API error: {} {}", status, message))
        }
    }
}

#[async_trait]
impl types::TextProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Gemini generateContent failed with {}", status);
            return Err(Self::classify_failure(status, &body));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("Malformed Gemini response: {}", e)))?;
        data.into_text()
    }
}
