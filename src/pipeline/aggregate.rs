//! Aggregation: ordered slide summaries → one deck-level summary.
//!
//! Failed slides are filtered out here, but the surviving lines keep their
//! original slide numbers ("Slide 4: …") so the model sees true positions —
//! the summary of a deck with a failed slide 2 should still talk about what
//! comes "after slide 1", not renumber the world.
//!
//! Zero usable summaries is a defined failure
//! ([`SlidebriefError::EmptyInput`]), surfaced distinctly from backend
//! breakage: "nothing worked" and "the summariser broke" need different
//! operator responses.
//!
//! No input-length cap is enforced; decks large enough to overflow the
//! backend's context are the caller's problem to chunk.

use crate::backend::VisionBackend;
use crate::config::SummaryConfig;
use crate::error::SlidebriefError;
use crate::output::SlideSummary;
use crate::pipeline::postprocess;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Build the aggregation input from the successful summaries, in order.
///
/// Returns `None` when no slide succeeded.
fn aggregate_input(summaries: &[SlideSummary]) -> Option<String> {
    let lines: Vec<String> = summaries
        .iter()
        .filter(|s| s.is_success())
        .map(|s| format!("Slide {}: {}", s.ordinal, s.text))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Produce the deck-level summary from the batch's slide summaries.
pub async fn summarize_deck(
    backend: &Arc<dyn VisionBackend>,
    summaries: &[SlideSummary],
    config: &SummaryConfig,
) -> Result<String, SlidebriefError> {
    let total = summaries.len();
    let failed = summaries.iter().filter(|s| !s.is_success()).count();

    let Some(body) = aggregate_input(summaries) else {
        return Err(SlidebriefError::EmptyInput { total, failed });
    };

    debug!(
        used = total - failed,
        failed, body_len = body.len(),
        "aggregating slide summaries"
    );

    let call = backend.summarize_text(&config.profile.deck_prompt, &body);
    let raw = match tokio::time::timeout(Duration::from_secs(config.api_timeout_secs), call).await
    {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(SlidebriefError::AggregationFailed {
                detail: e.to_string(),
            })
        }
        Err(_elapsed) => {
            return Err(SlidebriefError::AggregationFailed {
                detail: format!("timed out after {}s", config.api_timeout_secs),
            })
        }
    };

    let cleaned = postprocess::clean_summary(&raw);
    if cleaned.is_empty() {
        return Err(SlidebriefError::AggregationFailed {
            detail: "backend returned an empty deck summary".to_string(),
        });
    }

    info!(chars = cleaned.len(), "deck summary produced");
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ImageData, VisionBackend};
    use crate::config::BackendProfile;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn ok(ordinal: usize, text: &str) -> SlideSummary {
        SlideSummary {
            ordinal,
            text: text.into(),
            error: None,
        }
    }

    fn failed(ordinal: usize) -> SlideSummary {
        SlideSummary {
            ordinal,
            text: format!("[slide {ordinal} could not be summarised]"),
            error: Some(crate::error::AnalysisError::Backend {
                slide: ordinal,
                detail: "boom".into(),
            }),
        }
    }

    #[test]
    fn input_keeps_original_ordinals_and_drops_failures() {
        let summaries = vec![ok(1, "Intro."), failed(2), ok(3, "Conclusion.")];
        let body = aggregate_input(&summaries).unwrap();
        assert_eq!(body, "Slide 1: Intro.\nSlide 3: Conclusion.");
        assert!(!body.contains("Slide 2"));
    }

    #[test]
    fn all_failed_input_is_none() {
        assert!(aggregate_input(&[failed(1), failed(2)]).is_none());
        assert!(aggregate_input(&[]).is_none());
    }

    /// Echoes back the body it received so tests can inspect it.
    struct EchoBackend {
        seen: Mutex<Option<String>>,
        reply: &'static str,
    }

    #[async_trait]
    impl VisionBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn describe_image(
            &self,
            _prompt: &str,
            _image: &ImageData,
        ) -> Result<String, BackendError> {
            unimplemented!("not used in these tests")
        }

        async fn summarize_text(
            &self,
            _prompt: &str,
            body: &str,
        ) -> Result<String, BackendError> {
            *self.seen.lock().unwrap() = Some(body.to_string());
            Ok(self.reply.to_string())
        }
    }

    fn test_config() -> SummaryConfig {
        SummaryConfig::builder()
            .profile(BackendProfile::self_hosted(
                "http://localhost:11434/v1",
                "gemma3:4b",
            ))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn empty_filtered_sequence_is_a_defined_failure() {
        let backend: Arc<dyn VisionBackend> = Arc::new(EchoBackend {
            seen: Mutex::new(None),
            reply: "unused",
        });
        let err = summarize_deck(&backend, &[failed(1)], &test_config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SlidebriefError::EmptyInput {
                total: 1,
                failed: 1
            }
        ));
    }

    #[tokio::test]
    async fn failed_slides_never_reach_the_backend() {
        let backend_impl = Arc::new(EchoBackend {
            seen: Mutex::new(None),
            reply: "  A deck summary.  ",
        });
        let backend: Arc<dyn VisionBackend> = backend_impl.clone();

        let summaries = vec![ok(1, "Intro."), failed(2), ok(3, "Conclusion.")];
        let result = summarize_deck(&backend, &summaries, &test_config())
            .await
            .unwrap();

        assert_eq!(result, "A deck summary.", "output must be stripped");
        let seen = backend_impl.seen.lock().unwrap().clone().unwrap();
        assert!(seen.contains("Slide 1:"));
        assert!(seen.contains("Slide 3:"));
        assert!(!seen.contains("Slide 2"), "failed slide leaked into prompt");
    }

    #[tokio::test]
    async fn empty_backend_reply_is_an_aggregation_failure() {
        let backend: Arc<dyn VisionBackend> = Arc::new(EchoBackend {
            seen: Mutex::new(None),
            reply: "   ",
        });
        let err = summarize_deck(&backend, &[ok(1, "Intro.")], &test_config())
            .await
            .unwrap_err();
        assert!(matches!(err, SlidebriefError::AggregationFailed { .. }));
    }
}
