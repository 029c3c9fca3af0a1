//! Output types: per-slide summaries, the deck-level result, and run stats.
//!
//! [`SummaryOutput`] serialises to the wire shape the inbound surface
//! expects — `{filename, total_slides, summaries: [{slide, summary}],
//! final_summary}` — with run statistics appended for observability.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// The result of analysing one slide.
///
/// Ordinals are 1-based and form a strict 1..N sequence matching the deck's
/// slide order, regardless of what happened to each individual slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSummary {
    /// 1-based position of the slide within the deck.
    #[serde(rename = "slide")]
    pub ordinal: usize,

    /// Summary text, or a diagnostic placeholder when the slide failed.
    #[serde(rename = "summary")]
    pub text: String,

    /// The failure that produced the placeholder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AnalysisError>,
}

impl SlideSummary {
    /// Whether this slide was summarised successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Timing and count statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Slides summarised without error.
    pub summarized_slides: usize,
    /// Slides that failed analysis and carry a placeholder entry.
    pub failed_slides: usize,
    /// Wall-clock time spent in the document renderer.
    pub render_ms: u64,
    /// Wall-clock time spent in per-slide analysis (including pacing waits).
    pub analysis_ms: u64,
    /// Wall-clock time spent aggregating.
    pub aggregate_ms: u64,
    /// Total run time.
    pub total_ms: u64,
}

/// Complete result of one deck-summarisation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Source filename of the deck, verbatim.
    pub filename: String,

    /// Number of slides the renderer produced (equals `summaries.len()`
    /// unless the run was cancelled mid-batch).
    pub total_slides: usize,

    /// Per-slide summaries in slide order, failed slides included as
    /// placeholder entries.
    pub summaries: Vec<SlideSummary>,

    /// The deck-level summary, derived from the successful entries only.
    pub final_summary: String,

    /// Run statistics.
    #[serde(default)]
    pub stats: SummaryStats,
}
