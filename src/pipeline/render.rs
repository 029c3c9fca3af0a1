//! Document rendering: deck file → ordered page PNGs via external tools.
//!
//! The converter is an opaque subprocess pipeline, not an in-process
//! library: LibreOffice (headless) turns the office document into a PDF,
//! then poppler's `pdftoppm` rasterises the PDF into one PNG per page. A
//! deck that is already a PDF skips the first hop.
//!
//! Two quirks of that pipeline shape this module:
//!
//! * LibreOffice has been observed to exit before its output file is fully
//!   visible on disk, so we poll for the PDF with a bounded retry loop
//!   rather than trusting the exit status alone.
//! * Both subprocesses are bounded by `render_timeout_secs`; a wedged
//!   converter must not hang the run. `kill_on_drop` reaps the child when
//!   the timeout fires.
//!
//! Binary discovery: `SLIDEBRIEF_SOFFICE` / `SLIDEBRIEF_PDFTOPPM` override
//! the default `libreoffice` / `pdftoppm` names on `PATH`.

use crate::config::SummaryConfig;
use crate::error::RenderError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// One rasterised page on disk, in deck order.
#[derive(Debug, Clone)]
pub struct RenderedSlide {
    /// 1-based position within the deck.
    pub ordinal: usize,
    /// Path to the page PNG inside the run's work directory.
    pub path: PathBuf,
}

/// Filename prefix `pdftoppm` writes page images under.
const PAGE_PREFIX: &str = "slide";

/// LibreOffice occasionally returns before its output file is flushed;
/// poll this many times, this far apart, before declaring the output missing.
const OUTPUT_WAIT_ATTEMPTS: u32 = 10;
const OUTPUT_WAIT_DELAY: Duration = Duration::from_millis(500);

fn soffice_bin() -> String {
    std::env::var("SLIDEBRIEF_SOFFICE").unwrap_or_else(|_| "libreoffice".to_string())
}

fn pdftoppm_bin() -> String {
    std::env::var("SLIDEBRIEF_PDFTOPPM").unwrap_or_else(|_| "pdftoppm".to_string())
}

/// Render a deck file into ordered page PNGs inside `work_dir`.
///
/// Fatal on every failure path: no per-slide recovery is possible before
/// page images exist.
pub async fn render_deck(
    deck_path: &Path,
    work_dir: &Path,
    config: &SummaryConfig,
) -> Result<Vec<RenderedSlide>, RenderError> {
    let pdf_path = if is_pdf(deck_path) {
        debug!("deck is already a PDF, skipping office conversion");
        deck_path.to_path_buf()
    } else {
        convert_to_pdf(deck_path, work_dir, config.render_timeout_secs).await?
    };

    rasterise_pages(&pdf_path, work_dir, config.dpi, config.render_timeout_secs).await?;

    let slides = collect_page_images(work_dir, PAGE_PREFIX)?;
    info!("rendered {} page images", slides.len());
    Ok(slides)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Office document → PDF via headless LibreOffice.
async fn convert_to_pdf(
    deck_path: &Path,
    out_dir: &Path,
    timeout_secs: u64,
) -> Result<PathBuf, RenderError> {
    let bin = soffice_bin();
    info!("converting '{}' to PDF via {}", deck_path.display(), bin);

    let mut cmd = Command::new(&bin);
    cmd.arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(out_dir)
        .arg(deck_path)
        .kill_on_drop(true);

    let output = run_bounded(cmd, timeout_secs).await.map_err(|e| match e {
        RunFailure::Spawn(err) => RenderError::ConverterUnavailable {
            bin: bin.clone(),
            detail: err.to_string(),
        },
        RunFailure::Timeout => RenderError::Timeout { secs: timeout_secs },
    })?;

    if !output.status.success() {
        return Err(RenderError::ConversionFailed {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let pdf_path = expected_pdf_path(deck_path, out_dir);
    for attempt in 0..OUTPUT_WAIT_ATTEMPTS {
        if pdf_path.exists() {
            debug!("PDF ready after {} poll(s): {}", attempt + 1, pdf_path.display());
            return Ok(pdf_path);
        }
        warn!(
            "waiting for converter output '{}' (attempt {}/{})",
            pdf_path.display(),
            attempt + 1,
            OUTPUT_WAIT_ATTEMPTS
        );
        tokio::time::sleep(OUTPUT_WAIT_DELAY).await;
    }

    Err(RenderError::MissingOutput { path: pdf_path })
}

/// Where LibreOffice will place the converted PDF: `<out_dir>/<stem>.pdf`.
fn expected_pdf_path(deck_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = deck_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    out_dir.join(format!("{stem}.pdf"))
}

/// PDF → one PNG per page via `pdftoppm`.
async fn rasterise_pages(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    timeout_secs: u64,
) -> Result<(), RenderError> {
    let bin = pdftoppm_bin();
    debug!("rasterising '{}' at {} DPI via {}", pdf_path.display(), dpi, bin);

    let mut cmd = Command::new(&bin);
    cmd.arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg(pdf_path)
        .arg(out_dir.join(PAGE_PREFIX))
        .kill_on_drop(true);

    let output = run_bounded(cmd, timeout_secs).await.map_err(|e| match e {
        RunFailure::Spawn(err) => RenderError::RasteriserUnavailable {
            bin: bin.clone(),
            detail: err.to_string(),
        },
        RunFailure::Timeout => RenderError::Timeout { secs: timeout_secs },
    })?;

    if !output.status.success() {
        return Err(RenderError::RasterisationFailed {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

enum RunFailure {
    Spawn(std::io::Error),
    Timeout,
}

/// Run a subprocess to completion under a wall-clock bound.
async fn run_bounded(
    mut cmd: Command,
    timeout_secs: u64,
) -> Result<std::process::Output, RunFailure> {
    match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(RunFailure::Spawn(e)),
        Err(_elapsed) => Err(RunFailure::Timeout),
    }
}

/// Collect `<prefix>-N.png` page images from `dir`, ordered by page number.
///
/// `pdftoppm` zero-pads its page numbers based on the page count
/// (`slide-1.png` for short decks, `slide-01.png` beyond nine pages), so
/// ordering must be numeric, never lexicographic.
pub(crate) fn collect_page_images(
    dir: &Path,
    prefix: &str,
) -> Result<Vec<RenderedSlide>, RenderError> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(page_num) = parse_page_number(name, prefix) {
            numbered.push((page_num, path));
        }
    }

    if numbered.is_empty() {
        return Err(RenderError::NoPages);
    }

    numbered.sort_by_key(|(n, _)| *n);

    Ok(numbered
        .into_iter()
        .enumerate()
        .map(|(i, (_, path))| RenderedSlide {
            ordinal: i + 1,
            path,
        })
        .collect())
}

/// Parse `"<prefix>-<digits>.png"` into its page number.
fn parse_page_number(file_name: &str, prefix: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('-')?;
    let digits = rest.strip_suffix(".png")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn parse_page_number_accepts_padded_and_plain() {
        assert_eq!(parse_page_number("slide-1.png", "slide"), Some(1));
        assert_eq!(parse_page_number("slide-07.png", "slide"), Some(7));
        assert_eq!(parse_page_number("slide-12.png", "slide"), Some(12));
        assert_eq!(parse_page_number("slide-.png", "slide"), None);
        assert_eq!(parse_page_number("slide-1.jpg", "slide"), None);
        assert_eq!(parse_page_number("other-1.png", "slide"), None);
    }

    #[test]
    fn collect_orders_numerically_not_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "slide-10.png");
        touch(dir.path(), "slide-2.png");
        touch(dir.path(), "slide-1.png");
        touch(dir.path(), "deck.pdf");

        let slides = collect_page_images(dir.path(), "slide").unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(
            slides.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(slides[2].path.ends_with("slide-10.png"));
    }

    #[test]
    fn collect_with_no_pages_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "deck.pdf");
        let result = collect_page_images(dir.path(), "slide");
        assert!(matches!(result, Err(RenderError::NoPages)));
    }

    #[test]
    fn expected_pdf_path_uses_deck_stem() {
        let path = expected_pdf_path(Path::new("/tmp/upload/lecture-3.pptx"), Path::new("/work"));
        assert_eq!(path, Path::new("/work/lecture-3.pdf"));
    }

    #[test]
    fn pdf_detection_is_case_insensitive() {
        assert!(is_pdf(Path::new("deck.PDF")));
        assert!(is_pdf(Path::new("deck.pdf")));
        assert!(!is_pdf(Path::new("deck.pptx")));
        assert!(!is_pdf(Path::new("deck")));
    }
}
