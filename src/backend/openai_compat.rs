//! Self-hosted backend: any OpenAI-compatible chat-completions endpoint.
//!
//! Covers Ollama, LM Studio, vLLM and friends — everything that speaks
//! `POST {base_url}/chat/completions`. Images travel as data-URL
//! `image_url` content parts inside the user turn, which is the one
//! multimodal encoding all of these servers agree on.
//!
//! Self-hosted endpoints have no request quota, so the matching
//! [`crate::config::BackendProfile`] carries a zero pacing interval.

use super::{BackendError, ImageData, VisionBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct OpenAiCompatBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        max_tokens: usize,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_tokens,
            temperature,
        }
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, BackendError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
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

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse {
                    detail: e.to_string(),
                })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::InvalidResponse {
                detail: "empty choices".to_string(),
            })
    }
}

#[async_trait]
impl VisionBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn describe_image(
        &self,
        system_prompt: &str,
        image: &ImageData,
    ) -> Result<String, BackendError> {
        debug!(model = %self.model, "describe_image via {}", self.base_url);
        // The empty user text is intentional: these APIs require a user turn
        // to respond to, but the image carries all the actual content.
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: String::new(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ]),
            },
        ];
        self.chat(messages).await
    }

    async fn summarize_text(
        &self,
        system_prompt: &str,
        body: &str,
    ) -> Result<String, BackendError> {
        debug!(model = %self.model, body_len = body.len(), "summarize_text");
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(body.to_string()),
            },
        ];
        self.chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_image_parts() {
        let req = ChatCompletionRequest {
            model: "gemma3:4b".into(),
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: "".into() },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AA==".into(),
                        },
                    },
                ]),
            }],
            max_tokens: 1024,
            temperature: 0.2,
        };
        let json = serde_json::to_value(&req).expect("serialise");
        let parts = &json["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AA==");
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let backend = OpenAiCompatBackend::new(
            "http://localhost:11434/v1/".into(),
            None,
            "gemma3:4b".into(),
            1024,
            0.2,
        );
        assert_eq!(backend.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn response_with_string_content_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"A summary."}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("A summary.")
        );
    }
}
