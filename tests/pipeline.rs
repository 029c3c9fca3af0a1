//! End-to-end pipeline tests for slidebrief.
//!
//! The scenario suite drives the full backend-facing pipeline
//! (batch → aggregate → report) against a scripted in-memory backend, so it
//! runs everywhere with no external tools and no network. One live test at
//! the bottom exercises the real renderer + a local Ollama and is gated
//! behind the `SLIDEBRIEF_E2E` environment variable so it never runs in CI
//! unless explicitly requested.
//!
//! Run the live test with:
//!   SLIDEBRIEF_E2E=1 SLIDEBRIEF_E2E_DECK=./test_cases/lecture.pptx \
//!     cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use slidebrief::pipeline::encode::SlideImage;
use slidebrief::summarize::run_pipeline;
use slidebrief::{
    render_text_report, summarize, BackendError, BackendProfile, ImageData, SlidebriefError,
    SummaryConfig, VisionBackend,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Scripted backend: fails on the given 1-based describe calls, records the
/// body handed to the aggregate call.
struct ScriptedBackend {
    describe_calls: AtomicUsize,
    fail_on: Vec<usize>,
    aggregate_body: Mutex<Option<String>>,
}

impl ScriptedBackend {
    fn new(fail_on: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            describe_calls: AtomicUsize::new(0),
            fail_on,
            aggregate_body: Mutex::new(None),
        })
    }
}

#[async_trait]
impl VisionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _image: &ImageData,
    ) -> Result<String, BackendError> {
        let n = self.describe_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&n) {
            Err(BackendError::Api {
                status: 500,
                detail: "scripted failure".into(),
            })
        } else {
            Ok(format!("Summary of slide {n}."))
        }
    }

    async fn summarize_text(&self, _prompt: &str, body: &str) -> Result<String, BackendError> {
        *self.aggregate_body.lock().unwrap() = Some(body.to_string());
        Ok("Overview of the deck.\n\nCloses with the main takeaways.".to_string())
    }
}

fn slides(n: usize) -> Vec<SlideImage> {
    (1..=n)
        .map(|ordinal| SlideImage {
            ordinal,
            // A 1×1 PNG placeholder; the scripted backend never decodes it.
            image: ImageData::new("AA==", "image/png"),
        })
        .collect()
}

fn test_config() -> SummaryConfig {
    SummaryConfig::builder()
        .profile(
            BackendProfile::self_hosted("http://localhost:11434/v1", "gemma3:4b")
                .with_call_interval(Duration::ZERO),
        )
        .build()
        .expect("valid config")
}

// ── Scenario 1: every slide succeeds ─────────────────────────────────────────

#[tokio::test]
async fn three_slide_deck_all_slides_succeed() {
    let backend = ScriptedBackend::new(vec![]);
    let output = run_pipeline(
        slides(3),
        "lecture-3.pptx".to_string(),
        &(backend.clone() as Arc<dyn VisionBackend>),
        &test_config(),
        0,
        Instant::now(),
    )
    .await
    .expect("run should succeed");

    assert_eq!(output.total_slides, 3);
    assert_eq!(output.summaries.len(), 3);
    assert_eq!(
        output.summaries.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(output.summaries.iter().all(|s| s.is_success()));
    assert!(!output.final_summary.is_empty());
    assert_eq!(output.stats.summarized_slides, 3);
    assert_eq!(output.stats.failed_slides, 0);

    // The rendered report embeds the deck filename in its title.
    let report = render_text_report(Some(&output.filename), &output.final_summary, None);
    assert!(report.contains("lecture-3.pptx"));
    assert!(!report.trim().is_empty());
}

// ── Scenario 2: one slide fails, run still succeeds ──────────────────────────

#[tokio::test]
async fn middle_slide_failure_does_not_fail_the_run() {
    let backend = ScriptedBackend::new(vec![2]);
    let output = run_pipeline(
        slides(3),
        "lecture-3.pptx".to_string(),
        &(backend.clone() as Arc<dyn VisionBackend>),
        &test_config(),
        0,
        Instant::now(),
    )
    .await
    .expect("a single failed slide must not fail the run");

    assert_eq!(output.summaries.len(), 3, "failed slide keeps its position");
    assert!(output.summaries[0].is_success());
    assert!(!output.summaries[1].is_success());
    assert!(output.summaries[2].is_success());
    assert_eq!(output.summaries[1].text, "[slide 2 could not be summarised]");
    assert_eq!(output.stats.failed_slides, 1);

    // The aggregate prompt saw slides 1 and 3 only, with original ordinals.
    let body = backend.aggregate_body.lock().unwrap().clone().unwrap();
    assert!(body.contains("Slide 1:"));
    assert!(body.contains("Slide 3:"));
    assert!(!body.contains("Slide 2"), "failed slide leaked into aggregation");
}

// ── Scenario 3: every slide fails ────────────────────────────────────────────

#[tokio::test]
async fn single_slide_deck_whose_slide_fails_is_a_run_failure() {
    let backend = ScriptedBackend::new(vec![1]);
    let err = run_pipeline(
        slides(1),
        "lecture-3.pptx".to_string(),
        &(backend.clone() as Arc<dyn VisionBackend>),
        &test_config(),
        0,
        Instant::now(),
    )
    .await
    .expect_err("zero usable summaries must fail the run");

    assert!(
        matches!(err, SlidebriefError::EmptyInput { total: 1, failed: 1 }),
        "got: {err}"
    );
    // No aggregation call was attempted.
    assert!(backend.aggregate_body.lock().unwrap().is_none());
}

// ── Scenario 4 lives in pipeline::render's unit tests: a deck that renders
// to zero page images fails with RenderError::NoPages before any backend
// call is attempted. ──────────────────────────────────────────────────────────

// ── Input validation at the public boundary ──────────────────────────────────

#[tokio::test]
async fn unsupported_extension_is_rejected_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not a deck").unwrap();

    let err = summarize(&path, &test_config()).await.unwrap_err();
    assert!(matches!(err, SlidebriefError::UnsupportedFormat { .. }));
}

#[tokio::test]
async fn missing_deck_is_file_not_found() {
    let err = summarize("definitely/not/here.pptx", &test_config())
        .await
        .unwrap_err();
    assert!(matches!(err, SlidebriefError::FileNotFound { .. }));
}

// ── JSON surface shape ───────────────────────────────────────────────────────

#[tokio::test]
async fn output_serialises_to_the_wire_shape() {
    let backend = ScriptedBackend::new(vec![]);
    let output = run_pipeline(
        slides(2),
        "deck.pptx".to_string(),
        &(backend as Arc<dyn VisionBackend>),
        &test_config(),
        0,
        Instant::now(),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["filename"], "deck.pptx");
    assert_eq!(json["total_slides"], 2);
    assert_eq!(json["summaries"][0]["slide"], 1);
    assert!(json["summaries"][0]["summary"].is_string());
    assert!(json["final_summary"].is_string());
}

// ── Live e2e (LibreOffice + poppler + Ollama required) ───────────────────────

/// Gated: renders a real deck and summarises it against a local
/// OpenAI-compatible endpoint.
///
/// Requirements:
/// - `SLIDEBRIEF_E2E=1`
/// - `SLIDEBRIEF_E2E_DECK` pointing at a real .pptx/.odp/.pdf
/// - LibreOffice + poppler-utils on PATH
/// - An endpoint at `SLIDEBRIEF_BASE_URL` (default http://localhost:11434/v1)
///   with a vision model (`SLIDEBRIEF_MODEL`, default gemma3:4b)
#[tokio::test]
async fn live_deck_summarisation() {
    if std::env::var("SLIDEBRIEF_E2E").is_err() {
        println!("SKIP — set SLIDEBRIEF_E2E=1 to run live e2e tests");
        return;
    }
    let Ok(deck) = std::env::var("SLIDEBRIEF_E2E_DECK") else {
        println!("SKIP — set SLIDEBRIEF_E2E_DECK to a deck file");
        return;
    };

    let base_url = std::env::var("SLIDEBRIEF_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:11434/v1".to_string());
    let model = std::env::var("SLIDEBRIEF_MODEL").unwrap_or_else(|_| "gemma3:4b".to_string());

    let config = SummaryConfig::builder()
        .profile(BackendProfile::self_hosted(base_url, model))
        .dpi(96) // lower DPI for faster local inference
        .build()
        .expect("valid config");

    let output = summarize(&deck, &config).await.expect("live run failed");

    assert!(output.total_slides >= 1);
    assert!(!output.final_summary.trim().is_empty());
    println!(
        "[live] {} slides, {} ok, {} failed\n{}",
        output.total_slides,
        output.stats.summarized_slides,
        output.stats.failed_slides,
        output.final_summary
    );
}
