//! Error types for the slidebrief library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SlidebriefError`] — **Fatal**: the run cannot produce a result at all
//!   (deck missing or unsupported, the document converter failed, aggregation
//!   had nothing to work with). Returned as `Err(SlidebriefError)` from the
//!   top-level `summarize*` functions.
//!
//! * [`AnalysisError`] — **Non-fatal**: a single slide's backend call failed
//!   (unreachable endpoint, malformed reply, timeout) but the rest of the
//!   deck is fine. Stored inside [`crate::output::SlideSummary`] so callers
//!   can inspect partial success rather than losing the whole deck to one
//!   bad slide.
//!
//! Page-level failures are absorbed and annotated, never thrown upward;
//! run-level failures propagate to the boundary as a single diagnostic error
//! naming the stage that failed. There are no automatic retries anywhere —
//! callers wanting resilience retry the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the slidebrief library.
///
/// Slide-level failures use [`AnalysisError`] and are stored in
/// [`crate::output::SlideSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum SlidebriefError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Deck file was not found at the given path.
    #[error("deck file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file extension is not a supported deck format.
    ///
    /// Rejected before any temp file is written or subprocess spawned.
    #[error("unsupported deck format '.{extension}' for '{path}'\nSupported: .ppt, .pptx, .odp, .pdf")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The document renderer failed or produced no page images.
    ///
    /// Fatal for the whole run: no per-slide recovery is possible before
    /// page images exist.
    #[error(transparent)]
    Render(#[from] RenderError),

    // ── Aggregation errors ────────────────────────────────────────────────
    /// Aggregation received no usable slide summaries.
    ///
    /// Every slide in the deck failed analysis, so a deck-level summary
    /// would be meaningless. Surfaced distinctly from a generic processing
    /// error so callers can tell "nothing worked" from "the backend broke".
    #[error("no usable slide summaries to aggregate ({failed}/{total} slides failed)")]
    EmptyInput { total: usize, failed: usize },

    /// The deck-level summarisation call itself failed.
    #[error("deck summarisation failed: {detail}")]
    AggregationFailed { detail: String },

    // ── Report errors ─────────────────────────────────────────────────────
    /// Report rendering failed after a valid deck summary was produced.
    ///
    /// Kept distinct because the textual summary is still salvageable even
    /// when the document artifact is not.
    #[error("report rendering failed: {detail}")]
    ReportArtifact { detail: String },

    /// Could not write the report file.
    #[error("failed to write report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures of the external document renderer (deck → page images).
///
/// The converter is an opaque subprocess pipeline (LibreOffice for the
/// office-to-PDF step, poppler's `pdftoppm` for rasterisation); every variant
/// here is a way that pipeline is known to go wrong.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The office converter binary could not be started.
    #[error("document converter '{bin}' could not be started: {detail}\nInstall LibreOffice or set SLIDEBRIEF_SOFFICE to the binary path.")]
    ConverterUnavailable { bin: String, detail: String },

    /// The office converter exited with a non-zero status.
    #[error("document conversion failed (exit status {status}): {stderr}")]
    ConversionFailed { status: i32, stderr: String },

    /// The converter reported success but its output file never appeared.
    #[error("document conversion produced no output at '{path}'")]
    MissingOutput { path: PathBuf },

    /// A converter subprocess exceeded the configured timeout.
    #[error("document rendering timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The page rasteriser binary could not be started.
    #[error("page rasteriser '{bin}' could not be started: {detail}\nInstall poppler-utils or set SLIDEBRIEF_PDFTOPPM to the binary path.")]
    RasteriserUnavailable { bin: String, detail: String },

    /// The page rasteriser exited with a non-zero status.
    #[error("page rasterisation failed (exit status {status}): {stderr}")]
    RasterisationFailed { status: i32, stderr: String },

    /// A rendered page image exists on disk but could not be decoded.
    #[error("unreadable page image '{path}': {detail}")]
    UnreadableImage { path: PathBuf, detail: String },

    /// The deck rendered to zero page images.
    #[error("deck rendered to zero page images")]
    NoPages,

    /// Filesystem error while shuttling intermediate files.
    #[error("i/o error during rendering: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal error for a single slide.
///
/// Stored alongside [`crate::output::SlideSummary`] when a slide fails.
/// The batch always continues to the next slide.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AnalysisError {
    /// The vision backend call failed (unreachable, HTTP error, bad payload).
    #[error("slide {slide}: backend call failed: {detail}")]
    Backend { slide: usize, detail: String },

    /// The vision backend call exceeded the configured timeout.
    #[error("slide {slide}: backend call timed out after {secs}s")]
    Timeout { slide: usize, secs: u64 },

    /// The backend answered, but with an empty summary after cleanup.
    #[error("slide {slide}: backend returned an empty summary")]
    EmptyResponse { slide: usize },
}
