//! The batch orchestrator: strictly ordered, failure-absorbing analysis of
//! a whole deck.
//!
//! The core contract of the pipeline lives here:
//!
//! * Input order is output order — slide N's summary sits at position N,
//!   whatever happened to the slides around it.
//! * One bad slide never sinks the deck. A failed backend call becomes a
//!   placeholder [`SlideSummary`] carrying its [`AnalysisError`], and the
//!   batch moves on.
//! * Calls are serialised and paced through the profile's [`Throttle`] —
//!   there is deliberately no fan-out, because the quota-bound hosted
//!   backend needs spacing, not concurrency.
//!
//! A [`CancelFlag`] is checked before each slide; cancellation ends the
//! batch early with whatever entries were already collected.

use crate::backend::VisionBackend;
use crate::config::SummaryConfig;
use crate::output::SlideSummary;
use crate::pipeline::analyze;
use crate::pipeline::encode::SlideImage;
use crate::pipeline::throttle::Throttle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Externally triggered cancellation token.
///
/// Cheap to clone; hand one half to the caller and the other to
/// [`crate::config::SummaryConfig::cancel`]. Checked before each slide's
/// backend call, so cancellation takes effect at the next slide boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the batch using this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Placeholder body recorded for a slide whose analysis failed.
pub(crate) fn failure_placeholder(ordinal: usize) -> String {
    format!("[slide {ordinal} could not be summarised]")
}

/// Analyse every slide of a deck, in order.
///
/// Returns one [`SlideSummary`] per input slide (fewer only if cancelled
/// mid-batch). Never fails as a whole: per-slide errors are absorbed into
/// placeholder entries.
pub async fn analyze_deck(
    backend: &Arc<dyn VisionBackend>,
    slides: &[SlideImage],
    config: &SummaryConfig,
) -> Vec<SlideSummary> {
    let total = slides.len();
    let throttle = Throttle::new(config.profile.min_call_interval);
    let mut summaries: Vec<SlideSummary> = Vec::with_capacity(total);

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(total);
    }

    for (index, slide) in slides.iter().enumerate() {
        if config.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            warn!(
                "batch cancelled after {}/{} slides",
                summaries.len(),
                total
            );
            break;
        }

        throttle.pace(index).await;

        if let Some(ref cb) = config.progress {
            cb.on_slide_start(slide.ordinal, total);
        }

        match analyze::summarize_slide(
            backend,
            slide,
            &config.profile.slide_prompt,
            config.api_timeout_secs,
        )
        .await
        {
            Ok(text) => {
                debug!(slide = slide.ordinal, "slide ok");
                if let Some(ref cb) = config.progress {
                    cb.on_slide_complete(slide.ordinal, total, text.len());
                }
                summaries.push(SlideSummary {
                    ordinal: slide.ordinal,
                    text,
                    error: None,
                });
            }
            Err(err) => {
                warn!(slide = slide.ordinal, "slide failed: {err}");
                if let Some(ref cb) = config.progress {
                    cb.on_slide_error(slide.ordinal, total, err.to_string());
                }
                summaries.push(SlideSummary {
                    ordinal: slide.ordinal,
                    text: failure_placeholder(slide.ordinal),
                    error: Some(err),
                });
            }
        }
    }

    if let Some(ref cb) = config.progress {
        let succeeded = summaries.iter().filter(|s| s.is_success()).count();
        cb.on_batch_complete(total, succeeded);
    }

    summaries
}
