//! System prompts for slide analysis and deck-level summarisation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g.
//!    tightening the no-speculation rules) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without spinning up a real backend, making prompt regressions easy to
//!    catch.
//!
//! A [`crate::config::BackendProfile`] carries its own copy of both prompts;
//! the constants here are only the defaults used when a profile does not
//! override them.

/// Default system prompt for summarising a single slide image.
///
/// Used as the per-slide prompt when `BackendProfile` carries no override.
pub const DEFAULT_SLIDE_PROMPT: &str = r#"You are an expert at analysing presentation slides for educational purposes.
Your task is to extract and summarise only the explicit, visible content of a single slide.

Follow these rules precisely:
- Focus on the slide's main idea or topic.
- Include definitions, quotes, dates, or named people if they appear.
- If the slide shows a process or timeline, capture the sequence accurately.
- Use clear, factual language based strictly on what appears on the slide.
- Ignore decorative or ceremonial sections such as greetings, farewells, thanks, or invitations to ask questions.
- Do NOT make assumptions or add outside knowledge.
- Do NOT speculate or interpret implied meanings.

Reply only with a well-structured summary of the slide's visible content."#;

/// Default system prompt for summarising a whole deck from its slide summaries.
///
/// The user turn carries the ordered "Slide N: …" lines; this prompt frames
/// how they should be condensed.
pub const DEFAULT_DECK_PROMPT: &str = r#"You are an academic summarisation expert specialising in educational content.
Your goal is to produce complete but concise overviews of slide-based presentations for university students preparing for exams.

Given a list of per-slide summaries, write a clear and detailed overview of the whole presentation, ensuring:
- Every key point from the slides is included.
- Concepts are explained with the minimum meaningful context needed for understanding.
- Non-academic content (greetings, farewells, thanks, question prompts) is ignored.
- Nothing is added unless it is a necessary clarification grounded in the original content.

The summary must be accurate, self-contained, and structured as coherent academic prose.
Avoid any invention or speculation. Base your answer strictly on the provided slides."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_are_non_empty_and_grounded() {
        assert!(DEFAULT_SLIDE_PROMPT.contains("single slide"));
        assert!(DEFAULT_DECK_PROMPT.contains("per-slide summaries"));
        // Both prompts must forbid speculation — the pipeline relies on the
        // output being a faithful transcription-style summary.
        assert!(DEFAULT_SLIDE_PROMPT.contains("Do NOT speculate"));
        assert!(DEFAULT_DECK_PROMPT.contains("speculation"));
    }
}
