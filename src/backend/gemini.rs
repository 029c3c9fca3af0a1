//! Hosted backend: Google Gemini's `generateContent` REST API.
//!
//! Images travel as `inline_data` parts (base64 + mime type) next to the
//! prompt text in a single user turn — Gemini has no separate system role on
//! this endpoint, so the system prompt is folded into the text part.
//!
//! The hosted free tier enforces a hard requests-per-minute quota, which is
//! why the matching [`crate::config::BackendProfile`] carries a non-zero
//! pacing interval for the batch orchestrator to honour.

use super::{BackendError, ImageData, VisionBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public Gemini REST endpoint; overridable per profile for testing.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: Blob },
}

#[derive(Serialize)]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, BackendError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable {
                detail: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                detail: body,
            });
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse {
                    detail: e.to_string(),
                })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| BackendError::InvalidResponse {
                detail: "no candidates in response".to_string(),
            })?;

        if text.is_empty() {
            return Err(BackendError::InvalidResponse {
                detail: "candidate contained no text parts".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl VisionBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe_image(
        &self,
        system_prompt: &str,
        image: &ImageData,
    ) -> Result<String, BackendError> {
        debug!(model = %self.model, "describe_image via generateContent");
        let parts = vec![
            Part::Text {
                text: system_prompt.to_string(),
            },
            Part::InlineData {
                inline_data: Blob {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            },
        ];
        self.generate(parts).await
    }

    async fn summarize_text(
        &self,
        system_prompt: &str,
        body: &str,
    ) -> Result<String, BackendError> {
        debug!(model = %self.model, body_len = body.len(), "summarize_text");
        let parts = vec![Part::Text {
            text: format!("{system_prompt}\n\n{body}"),
        }];
        self.generate(parts).await
    }
}
