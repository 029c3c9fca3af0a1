//! Per-slide analysis: one image, one backend call, one bounded wait.
//!
//! This stage is intentionally thin — prompt content lives on the
//! [`crate::config::BackendProfile`] and transport lives behind
//! [`VisionBackend`], so what remains here is the per-call contract:
//! a finite timeout, output cleanup, and the guarantee that the result is
//! either a non-empty whitespace-stripped summary or an [`AnalysisError`].
//!
//! No retries happen here or anywhere else in the pipeline; a failed slide
//! becomes a placeholder entry at the batch layer and the run moves on.

use crate::backend::VisionBackend;
use crate::error::AnalysisError;
use crate::pipeline::encode::SlideImage;
use crate::pipeline::postprocess;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Summarise one slide image.
///
/// The timeout bounds the whole backend round-trip: a hung endpoint
/// surfaces as [`AnalysisError::Timeout`] instead of stalling the batch.
pub async fn summarize_slide(
    backend: &Arc<dyn VisionBackend>,
    slide: &SlideImage,
    slide_prompt: &str,
    timeout_secs: u64,
) -> Result<String, AnalysisError> {
    let call = backend.describe_image(slide_prompt, &slide.image);

    let raw = match tokio::time::timeout(Duration::from_secs(timeout_secs), call).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(AnalysisError::Backend {
                slide: slide.ordinal,
                detail: e.to_string(),
            })
        }
        Err(_elapsed) => {
            return Err(AnalysisError::Timeout {
                slide: slide.ordinal,
                secs: timeout_secs,
            })
        }
    };

    let cleaned = postprocess::clean_summary(&raw);
    if cleaned.is_empty() {
        return Err(AnalysisError::EmptyResponse {
            slide: slide.ordinal,
        });
    }

    debug!(
        slide = slide.ordinal,
        chars = cleaned.len(),
        "slide summarised"
    );
    Ok(cleaned)
}
