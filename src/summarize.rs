//! Top-level summarisation entry points.
//!
//! [`summarize`] is the primary API: validate the deck, render it to page
//! images inside a scoped temp directory, analyse every slide in order,
//! aggregate, and return the structured result. [`summarize_bytes`] accepts
//! in-memory uploads, [`summarize_to_file`] additionally writes the PDF
//! report with an atomic temp-file + rename.
//!
//! All intermediate files (uploaded bytes, converted PDF, page PNGs) live in
//! a [`tempfile::TempDir`] owned by the run — dropped, and therefore
//! removed, on every exit path, success or error.

use crate::backend::{self, VisionBackend};
use crate::config::SummaryConfig;
use crate::error::SlidebriefError;
use crate::output::{SummaryOutput, SummaryStats};
use crate::pipeline::encode::SlideImage;
use crate::pipeline::{aggregate, batch, encode, render};
use crate::report;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Deck formats the pipeline accepts.
///
/// Anything else is rejected before a temp file is written or a subprocess
/// spawned. PDF is accepted directly — the renderer goes through PDF
/// internally anyway, so a pre-converted deck just skips the first hop.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["ppt", "pptx", "odp", "pdf"];

fn validate_extension(path: &Path) -> Result<String, SlidebriefError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext {
        Some(e) if SUPPORTED_EXTENSIONS.contains(&e.as_str()) => Ok(e),
        other => Err(SlidebriefError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: other.unwrap_or_default(),
        }),
    }
}

/// Summarise a deck file.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(SummaryOutput)` on success, even if some slides failed analysis
/// (check `output.stats.failed_slides`).
///
/// # Errors
/// Returns `Err(SlidebriefError)` only for run-level failures:
/// - Deck missing or of an unsupported format
/// - The document renderer failed or produced no pages
/// - Every slide failed, leaving aggregation with no input
/// - The aggregation call itself failed
pub async fn summarize(
    input: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SlidebriefError> {
    let deck_path = input.as_ref();
    let display_name = deck_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| deck_path.display().to_string());
    summarize_at(deck_path, display_name, config).await
}

/// Summarise deck bytes held in memory.
///
/// `filename` is the upload's original name; it drives format validation
/// and appears verbatim in the output and report title. The bytes are
/// spilled to a managed temp file (the office converter needs a path) and
/// cleaned up automatically.
pub async fn summarize_bytes(
    bytes: &[u8],
    filename: &str,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SlidebriefError> {
    let ext = validate_extension(Path::new(filename))?;

    // The suffix matters: the converter sniffs the format from it.
    let mut tmp = tempfile::Builder::new()
        .suffix(&format!(".{ext}"))
        .tempfile()
        .map_err(|e| SlidebriefError::Internal(format!("temp deck file: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| SlidebriefError::Internal(format!("temp deck write: {e}")))?;

    // `tmp` is dropped (and the file deleted) when this returns.
    summarize_at(tmp.path(), filename.to_string(), config).await
}

/// Summarise a deck and write the PDF report to `output_path`.
///
/// Uses an atomic write (temp file + rename) to prevent partial files.
pub async fn summarize_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryStats, SlidebriefError> {
    let output = summarize(input, config).await?;
    let path = output_path.as_ref();

    let slides = config
        .include_slide_summaries
        .then_some(output.summaries.as_slice());
    let pdf = report::render_pdf_report(Some(&output.filename), &output.final_summary, slides)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SlidebriefError::ReportWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &pdf)
        .await
        .map_err(|e| SlidebriefError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| SlidebriefError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Shared implementation behind the public entry points.
async fn summarize_at(
    deck_path: &Path,
    display_name: String,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SlidebriefError> {
    let total_start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    validate_extension(deck_path)?;
    if !deck_path.exists() {
        return Err(SlidebriefError::FileNotFound {
            path: deck_path.to_path_buf(),
        });
    }
    info!(profile = %config.profile.name, "starting summarisation: {display_name}");

    // ── Step 2: Resolve backend ──────────────────────────────────────────
    let backend = backend::connect(&config.profile, config);

    // ── Step 3: Scoped work directory ────────────────────────────────────
    // Owns every intermediate file; removed on drop regardless of outcome.
    let work_dir = tempfile::tempdir()
        .map_err(|e| SlidebriefError::Internal(format!("work dir: {e}")))?;

    // ── Step 4: Render deck to page images ───────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_deck(deck_path, work_dir.path(), config).await?;
    let render_ms = render_start.elapsed().as_millis() as u64;
    info!("rendered {} pages in {}ms", rendered.len(), render_ms);

    // ── Step 5: Encode page images ───────────────────────────────────────
    let slides = encode::encode_slides(&rendered, config.max_rendered_pixels)?;

    run_pipeline(slides, display_name, &backend, config, render_ms, total_start).await
}

/// The backend-facing tail of the pipeline: batch → aggregate → output.
///
/// Split out so the whole analysis path can be driven without the external
/// converter (scenario tests feed synthetic slides straight in).
pub async fn run_pipeline(
    slides: Vec<SlideImage>,
    filename: String,
    backend: &Arc<dyn VisionBackend>,
    config: &SummaryConfig,
    render_ms: u64,
    total_start: Instant,
) -> Result<SummaryOutput, SlidebriefError> {
    let total_slides = slides.len();

    // ── Step 6: Analyse every slide in order ─────────────────────────────
    let analysis_start = Instant::now();
    let summaries = batch::analyze_deck(backend, &slides, config).await;
    let analysis_ms = analysis_start.elapsed().as_millis() as u64;

    let summarized = summaries.iter().filter(|s| s.is_success()).count();
    let failed = summaries.len() - summarized;
    debug!(summarized, failed, analysis_ms, "batch complete");

    // ── Step 7: Aggregate into the deck summary ──────────────────────────
    let aggregate_start = Instant::now();
    let final_summary = aggregate::summarize_deck(backend, &summaries, config).await?;
    let aggregate_ms = aggregate_start.elapsed().as_millis() as u64;

    let stats = SummaryStats {
        summarized_slides: summarized,
        failed_slides: failed,
        render_ms,
        analysis_ms,
        aggregate_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "summarisation complete: {}/{} slides, {}ms total",
        summarized, total_slides, stats.total_ms
    );

    Ok(SummaryOutput {
        filename,
        total_slides,
        summaries,
        final_summary,
        stats,
    })
}
