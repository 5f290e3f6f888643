//! Gemini API Client
//!
//! Sends one `generateContent` request per chat message, with the optional
//! attachment as an inline data part. Rate-limited requests are retried with
//! exponential backoff.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::attachment::{Attachment, InlineData};
use super::credentials::CredentialManager;
use super::error::AssistantError;
use super::json_parser::extract_json;
use crate::config::GeminiConfig;
use crate::utils::preview;

pub const EMPTY_RESPONSE_TEXT: &str = "I received an empty response from Gemini.";
pub const NO_TEXT_RESPONSE_TEXT: &str = "No response generated.";

/// Anything that turns a prompt (plus optional file) into response text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<String, AssistantError>;
}

// ============ Request / Response Structures ============

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request(prompt: &str, attachment: Option<&Attachment>) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: prompt.to_string(),
    }];
    if let Some(file) = attachment {
        parts.push(Part::InlineData {
            inline_data: file.to_inline_data(),
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
    }
}

/// First text part of the first candidate, or a fixed notice
fn extract_reply(response: GenerateContentResponse) -> String {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return EMPTY_RESPONSE_TEXT.to_string();
    };

    candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TEXT_RESPONSE_TEXT.to_string())
}

/// Log suffix for a 429 on attempt `retry` (0-based)
fn rate_limit_note(retry: u32, max_retries: u32) -> String {
    if retry >= max_retries {
        format!("giving up after {} retries", max_retries)
    } else {
        format!("retry {}/{}", retry + 1, max_retries)
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with an explicit API key
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> Result<Self, AssistantError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AssistantError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: api_key.trim().to_string(),
        })
    }

    /// Create a client using the configured key, falling back to the credential store
    pub fn from_config(config: GeminiConfig) -> Result<Self, AssistantError> {
        let api_key = match &config.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => CredentialManager::new().get_api_key()?,
        };
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send request with retry logic
    async fn send_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AssistantError> {
        let mut retry_delay = Duration::from_secs(2);
        let max_retries = self.config.max_retries;

        for retry in 0..=max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let resp = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await;

            match resp {
                Ok(r) if r.status() == StatusCode::TOO_MANY_REQUESTS => {
                    tracing::warn!("[Gemini] Rate limited, {}", rate_limit_note(retry, max_retries));
                    continue;
                }
                Ok(r) if r.status().is_success() => {
                    return Ok(r.json().await?);
                }
                Ok(r) => {
                    let status = r.status();
                    let text = r.text().await.unwrap_or_default();
                    tracing::warn!("[Gemini] API error response: {}", preview(&text, 300));

                    let message = extract_json::<ApiErrorBody>(&text)
                        .map(|body| body.error.message)
                        .unwrap_or_else(|| {
                            status.canonical_reason().unwrap_or("Unknown error").to_string()
                        });
                    return Err(AssistantError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                Err(e) => {
                    if retry == max_retries {
                        return Err(AssistantError::Network(e));
                    }
                    tracing::warn!("[Gemini] Request failed, retrying: {}", e);
                    continue;
                }
            }
        }

        Err(AssistantError::RetriesExhausted)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<String, AssistantError> {
        let request = build_request(prompt, attachment);

        tracing::info!(
            "[Gemini] Sending prompt ({} chars, attachment: {}) to {}",
            prompt.len(),
            attachment.map(|a| a.file_name.as_str()).unwrap_or("none"),
            self.config.model
        );

        let response = self.send_request(&request).await?;
        let text = extract_reply(response);

        tracing::info!("[Gemini] Response length: {} chars", text.len());
        tracing::debug!("[Gemini] Response preview: {}", preview(&text, 200));

        Ok(text)
    }
}
