//! Progress-callback trait for per-slide pipeline events.
//!
//! Inject an `Arc<dyn SummaryProgressCallback>` via
//! [`crate::config::SummaryConfigBuilder::progress`] to receive events as the
//! batch works through a deck. Callbacks are the least-invasive integration
//! point: callers can forward events to a progress bar, a WebSocket, or a
//! log sink without the library knowing how the host communicates.
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. The batch is single-flow, so events for one run
//! arrive in order; `Send + Sync` is still required because independent runs
//! may share one callback.

use std::sync::Arc;

/// Called by the pipeline as it works through a deck.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once after rendering, before any slide is analysed.
    fn on_batch_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called just before the backend request is sent for a slide.
    fn on_slide_start(&self, ordinal: usize, total_slides: usize) {
        let _ = (ordinal, total_slides);
    }

    /// Called when a slide is summarised successfully.
    fn on_slide_complete(&self, ordinal: usize, total_slides: usize, summary_len: usize) {
        let _ = (ordinal, total_slides, summary_len);
    }

    /// Called when a slide's analysis fails (the batch continues).
    fn on_slide_error(&self, ordinal: usize, total_slides: usize, error: String) {
        let _ = (ordinal, total_slides, error);
    }

    /// Called once after every slide has been attempted (or the batch was
    /// cancelled).
    fn on_batch_complete(&self, total_slides: usize, success_count: usize) {
        let _ = (total_slides, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;
