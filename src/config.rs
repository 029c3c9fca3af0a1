//! Configuration types for deck summarisation.
//!
//! All pipeline behaviour is controlled through [`SummaryConfig`], built via
//! its [`SummaryConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across runs, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! The backend choice lives in [`BackendProfile`]: a closed set of endpoint
//! variants, each bundling the rate-limit interval and the prompt pair for
//! that provider. The profile is selected once per run; the orchestrator is
//! generic over it and never branches on provider identity internally.

use crate::backend::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::backend::VisionBackend;
use crate::error::SlidebriefError;
use crate::pipeline::batch::CancelFlag;
use crate::progress::SummaryProgressCallback;
use crate::prompts::{DEFAULT_DECK_PROMPT, DEFAULT_SLIDE_PROMPT};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pacing interval for the hosted profile.
///
/// The hosted free tier allows ~15 requests/minute; one call every 4 seconds
/// stays safely inside that quota.
pub const HOSTED_CALL_INTERVAL: Duration = Duration::from_secs(4);

/// Which backend endpoint a profile talks to.
///
/// A closed two-variant set: the self-hosted OpenAI-compatible server and
/// the hosted Gemini API. Pluggable third-party backends are a non-goal;
/// a pre-built [`VisionBackend`] can still be injected via
/// [`SummaryConfig::backend`] for testing.
#[derive(Clone)]
pub enum BackendEndpoint {
    /// Any OpenAI-compatible chat-completions server (Ollama, LM Studio, vLLM).
    OpenAiCompatible {
        base_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// Google Gemini `generateContent`.
    Gemini {
        base_url: String,
        api_key: String,
        model: String,
    },
}

impl fmt::Debug for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendEndpoint::OpenAiCompatible {
                base_url, model, ..
            } => f
                .debug_struct("OpenAiCompatible")
                .field("base_url", base_url)
                .field("model", model)
                .finish_non_exhaustive(),
            BackendEndpoint::Gemini {
                base_url, model, ..
            } => f
                .debug_struct("Gemini")
                .field("base_url", base_url)
                .field("model", model)
                .finish_non_exhaustive(),
        }
    }
}

/// A named backend configuration: endpoint, pacing interval, prompt pair.
///
/// Immutable once built; selected once per pipeline run.
///
/// # Example
/// ```rust
/// use slidebrief::BackendProfile;
/// use std::time::Duration;
///
/// let profile = BackendProfile::self_hosted("http://localhost:11434/v1", "gemma3:4b")
///     .with_call_interval(Duration::ZERO);
/// assert_eq!(profile.name, "self-hosted");
/// ```
#[derive(Debug, Clone)]
pub struct BackendProfile {
    /// Short label used in logs ("self-hosted", "hosted").
    pub name: String,
    /// Endpoint the profile talks to.
    pub endpoint: BackendEndpoint,
    /// Minimum spacing between backend calls within one batch.
    ///
    /// Zero for unconstrained backends. Static configuration, never adjusted
    /// from observed responses (no adaptive backoff).
    pub min_call_interval: Duration,
    /// System prompt for single-slide analysis.
    pub slide_prompt: String,
    /// System prompt for deck-level summarisation.
    pub deck_prompt: String,
}

impl BackendProfile {
    /// Profile for a self-hosted OpenAI-compatible server.
    ///
    /// No request quota, so no pacing interval.
    pub fn self_hosted(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "self-hosted".to_string(),
            endpoint: BackendEndpoint::OpenAiCompatible {
                base_url: base_url.into(),
                api_key: None,
                model: model.into(),
            },
            min_call_interval: Duration::ZERO,
            slide_prompt: DEFAULT_SLIDE_PROMPT.to_string(),
            deck_prompt: DEFAULT_DECK_PROMPT.to_string(),
        }
    }

    /// Profile for the hosted Gemini API.
    ///
    /// Paced at [`HOSTED_CALL_INTERVAL`] to respect the per-minute quota.
    pub fn hosted(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "hosted".to_string(),
            endpoint: BackendEndpoint::Gemini {
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                api_key: api_key.into(),
                model: model.into(),
            },
            min_call_interval: HOSTED_CALL_INTERVAL,
            slide_prompt: DEFAULT_SLIDE_PROMPT.to_string(),
            deck_prompt: DEFAULT_DECK_PROMPT.to_string(),
        }
    }

    /// Override the pacing interval.
    pub fn with_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }

    /// Override both prompts.
    pub fn with_prompts(
        mut self,
        slide_prompt: impl Into<String>,
        deck_prompt: impl Into<String>,
    ) -> Self {
        self.slide_prompt = slide_prompt.into();
        self.deck_prompt = deck_prompt.into();
        self
    }

    /// Point the profile at a different base URL (test servers, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        match &mut self.endpoint {
            BackendEndpoint::OpenAiCompatible { base_url, .. } => *base_url = url,
            BackendEndpoint::Gemini { base_url, .. } => *base_url = url,
        }
        self
    }
}

/// Configuration for one deck-summarisation run.
///
/// Built via [`SummaryConfig::builder()`] or [`SummaryConfig::default()`].
///
/// # Example
/// ```rust
/// use slidebrief::{BackendProfile, SummaryConfig};
///
/// let config = SummaryConfig::builder()
///     .profile(BackendProfile::self_hosted("http://localhost:11434/v1", "gemma3:4b"))
///     .dpi(150)
///     .api_timeout_secs(180)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Backend profile selected for this run.
    pub profile: BackendProfile,

    /// Pre-constructed backend. Takes precedence over `profile.endpoint`.
    ///
    /// The testing seam: inject a scripted fake here and no network I/O
    /// happens anywhere in the pipeline.
    pub backend: Option<Arc<dyn VisionBackend>>,

    /// Rasterisation DPI for page images. Range: 72–400. Default: 150.
    ///
    /// 150 DPI keeps slide text sharp enough for a vision model while the
    /// PNG stays well below typical API upload limits.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap independent of DPI: a high-DPI render of an unusually
    /// large slide master could otherwise produce a huge upload. Either
    /// dimension above the cap is scaled down proportionally.
    pub max_rendered_pixels: u32,

    /// Maximum tokens the backend may generate per call. Default: 1024.
    pub max_tokens: usize,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to what is on the slide;
    /// higher values introduce creativity that hurts summary accuracy.
    pub temperature: f32,

    /// Per-backend-call timeout in seconds. Default: 120.
    ///
    /// Every backend call is bounded by this; a hung backend must never
    /// block a run indefinitely.
    pub api_timeout_secs: u64,

    /// Timeout for each external converter subprocess in seconds. Default: 120.
    pub render_timeout_secs: u64,

    /// Interleave per-slide summaries into the rendered report. Default: false.
    pub include_slide_summaries: bool,

    /// Progress callback fired per slide. Default: none.
    pub progress: Option<Arc<dyn SummaryProgressCallback>>,

    /// Cancellation flag checked before each slide's backend call. Default: none.
    pub cancel: Option<CancelFlag>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            profile: BackendProfile::self_hosted("http://localhost:11434/v1", "gemma3:4b"),
            backend: None,
            dpi: 150,
            max_rendered_pixels: 2000,
            max_tokens: 1024,
            temperature: 0.2,
            api_timeout_secs: 120,
            render_timeout_secs: 120,
            include_slide_summaries: false,
            progress: None,
            cancel: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("profile", &self.profile)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn VisionBackend>"))
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("include_slide_summaries", &self.include_slide_summaries)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn profile(mut self, profile: BackendProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn VisionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn include_slide_summaries(mut self, v: bool) -> Self {
        self.config.include_slide_summaries = v;
        self
    }

    pub fn progress(mut self, cb: Arc<dyn SummaryProgressCallback>) -> Self {
        self.config.progress = Some(cb);
        self
    }

    pub fn cancel(mut self, flag: CancelFlag) -> Self {
        self.config.cancel = Some(flag);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SlidebriefError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(SlidebriefError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(SlidebriefError::InvalidConfig(
                "api_timeout_secs must be ≥ 1 — a hung backend call must not block a run forever"
                    .into(),
            ));
        }
        if c.render_timeout_secs == 0 {
            return Err(SlidebriefError::InvalidConfig(
                "render_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
