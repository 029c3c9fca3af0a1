//! # slidebrief
//!
//! Summarise slide decks into per-slide and whole-deck briefs using Vision
//! Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! Slide decks carry most of their meaning visually — layouts, diagrams,
//! emphasis — so text extraction alone produces garbled study material.
//! Instead this crate rasterises each slide into a PNG and lets a VLM read
//! it as a student would, then condenses the per-slide summaries into one
//! deck-level brief suitable for exam revision.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck (.pptx/.ppt/.odp/.pdf)
//!  │
//!  ├─ 1. Render     LibreOffice → PDF, pdftoppm → page PNGs (subprocesses)
//!  ├─ 2. Encode     PNG → size-capped base64 payload
//!  ├─ 3. Analyse    one VLM call per slide, strictly in order,
//!  │                paced for quota-bound backends, failures absorbed
//!  ├─ 4. Aggregate  successful slide summaries → one deck summary
//!  └─ 5. Report     deterministic text or paginated PDF artifact
//! ```
//!
//! Two backend profiles ship: a self-hosted OpenAI-compatible endpoint
//! (Ollama, LM Studio, vLLM — unthrottled) and the hosted Gemini API
//! (paced to its requests-per-minute quota). One bad slide never sinks a
//! deck: it becomes a placeholder entry and the batch continues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slidebrief::{summarize, BackendProfile, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummaryConfig::builder()
//!         .profile(BackendProfile::self_hosted("http://localhost:11434/v1", "gemma3:4b"))
//!         .build()?;
//!     let output = summarize("lecture-3.pptx", &config).await?;
//!     println!("{}", output.final_summary);
//!     eprintln!(
//!         "{}/{} slides summarised",
//!         output.stats.summarized_slides, output.total_slides
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slidebrief` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! slidebrief = { version = "0.4", default-features = false }
//! ```
//!
//! ## External tools
//!
//! Rendering shells out to LibreOffice (`libreoffice`, override with
//! `SLIDEBRIEF_SOFFICE`) and poppler's `pdftoppm` (override with
//! `SLIDEBRIEF_PDFTOPPM`). Decks that are already PDFs skip LibreOffice.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendError, ImageData, VisionBackend};
pub use config::{
    BackendEndpoint, BackendProfile, SummaryConfig, SummaryConfigBuilder, HOSTED_CALL_INTERVAL,
};
pub use error::{AnalysisError, RenderError, SlidebriefError};
pub use output::{SlideSummary, SummaryOutput, SummaryStats};
pub use pipeline::batch::CancelFlag;
pub use pipeline::encode::SlideImage;
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use report::{render_pdf_report, render_text_report};
pub use summarize::{summarize, summarize_bytes, summarize_to_file, SUPPORTED_EXTENSIONS};
