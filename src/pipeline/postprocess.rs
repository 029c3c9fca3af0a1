//! Post-processing: deterministic cleanup of model-generated summary text.
//!
//! Even well-prompted models occasionally wrap their answer in code fences,
//! emit Windows line endings, pad paragraphs with extra blank lines, or leak
//! invisible Unicode (zero-width spaces, BOM, soft hyphens). These artefacts
//! would otherwise end up verbatim in the report, and the report renderer
//! splits paragraphs on the double-newline boundary — so blank-line noise
//! changes its output.
//!
//! Each rule is a pure `&str → String` function with no shared state,
//! applied in a fixed order: fences must come off before whitespace rules,
//! and the final trim runs last so the output satisfies the
//! "whitespace-stripped" guarantee the analyzer and aggregator make.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence (models sometimes disobey the prompt)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive newlines down to a paragraph break
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Trim leading/trailing whitespace
pub fn clean_summary(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```text\nThe slide introduces recursion.\n```";
        assert_eq!(
            strip_outer_fences(input),
            "The slide introduces recursion."
        );
    }

    #[test]
    fn test_strip_fences_no_lang() {
        let input = "```\nA summary.\n```";
        assert_eq!(strip_outer_fences(input), "A summary.");
    }

    #[test]
    fn test_no_fences_passthrough() {
        let input = "A summary without fences.";
        assert_eq!(strip_outer_fences(input), input);
    }

    #[test]
    fn test_inner_fences_untouched() {
        let input = "Intro.\n```\ncode sample from the slide\n```\nOutro.";
        assert_eq!(strip_outer_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        // A single paragraph break survives untouched.
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_clean_summary_full_pipeline() {
        let input = "```\nFirst paragraph.\r\n\r\n\r\n\r\nSecond paragraph.   \n```";
        let result = clean_summary(input);
        assert_eq!(result, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_clean_summary_strips_outer_whitespace() {
        assert_eq!(clean_summary("  \n  a summary  \n  "), "a summary");
    }

    #[test]
    fn test_clean_summary_empty_input() {
        assert_eq!(clean_summary("   \n\n  "), "");
    }
}
