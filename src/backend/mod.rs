//! The LLM backend boundary.
//!
//! Everything the pipeline knows about a model backend is the
//! [`VisionBackend`] trait: one call that describes an image, one call that
//! condenses text. The two shipping implementations cover the two supported
//! profiles — a self-hosted OpenAI-compatible endpoint
//! ([`openai_compat::OpenAiCompatBackend`]) and a hosted Gemini endpoint
//! ([`gemini::GeminiBackend`]).
//!
//! Backends are plain configuration objects constructed once (via
//! [`connect`]) and passed by reference into each run — no module-level
//! client state, so tests can swap in a scripted fake through
//! [`crate::config::SummaryConfig::backend`].

pub mod gemini;
pub mod openai_compat;

use crate::config::{BackendEndpoint, BackendProfile, SummaryConfig};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A base64-encoded raster image tagged with its media type.
#[derive(Clone)]
pub struct ImageData {
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub data: String,
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageData {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Render as an RFC 2397 data URL for OpenAI-style `image_url` parts.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// Base64 payloads run to hundreds of kilobytes; keep them out of debug logs.
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Errors reported by a backend implementation.
///
/// Timeouts are deliberately absent: bounding the wait is the caller's job
/// ([`crate::pipeline::analyze`] wraps every call in `tokio::time::timeout`).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The endpoint could not be reached at all.
    #[error("backend unreachable: {detail}")]
    Unreachable { detail: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The endpoint answered HTTP 429 — the request quota is exhausted.
    #[error("backend rate limit exceeded")]
    RateLimited,

    /// The endpoint answered 2xx but the body was not the expected shape.
    #[error("malformed backend response: {detail}")]
    InvalidResponse { detail: String },
}

/// A vision-capable LLM backend.
///
/// Implementations are stateless given their configuration and must be
/// shareable across runs (`Send + Sync`). Every method performs exactly one
/// outbound call — no internal retries, no caching.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Short provider label used in logs and error messages.
    fn name(&self) -> &str;

    /// Summarise one image under the given system prompt.
    ///
    /// Returns the raw model text; the caller strips and cleans it.
    async fn describe_image(
        &self,
        system_prompt: &str,
        image: &ImageData,
    ) -> Result<String, BackendError>;

    /// Condense a text body under the given system prompt.
    async fn summarize_text(
        &self,
        system_prompt: &str,
        body: &str,
    ) -> Result<String, BackendError>;
}

/// Construct the backend client a profile describes.
///
/// The pre-built override in `config.backend` takes precedence — the caller
/// constructed and configured the backend entirely (useful in tests or when
/// wrapping a backend with middleware). Otherwise the profile's endpoint
/// variant selects the implementation; the orchestrator itself never
/// branches on provider identity.
pub fn connect(profile: &BackendProfile, config: &SummaryConfig) -> Arc<dyn VisionBackend> {
    if let Some(ref backend) = config.backend {
        return Arc::clone(backend);
    }

    match &profile.endpoint {
        BackendEndpoint::OpenAiCompatible {
            base_url,
            api_key,
            model,
        } => Arc::new(openai_compat::OpenAiCompatBackend::new(
            base_url.clone(),
            api_key.clone(),
            model.clone(),
            config.max_tokens,
            config.temperature,
        )),
        BackendEndpoint::Gemini {
            base_url,
            api_key,
            model,
        } => Arc::new(gemini::GeminiBackend::new(
            base_url.clone(),
            api_key.clone(),
            model.clone(),
        )),
    }
}
