//! CLI binary for slidebrief.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummaryConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use slidebrief::{
    render_pdf_report, render_text_report, summarize, BackendProfile, SummaryConfig,
    SummaryProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar, one log line per slide. Slides are
/// analysed strictly in order, so no out-of-order bookkeeping is needed.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} slides  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SummaryProgressCallback for CliProgress {
    fn on_batch_start(&self, total_slides: usize) {
        self.bar.set_length(total_slides as u64);
        self.bar.set_prefix("Summarising");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Analysing {total_slides} slides…"))
        ));
    }

    fn on_slide_complete(&self, ordinal: usize, total: usize, summary_len: usize) {
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            green("✓"),
            ordinal,
            total,
            dim(&format!("{summary_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_slide_error(&self, ordinal: usize, total: usize, error: String) {
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            red("✗"),
            ordinal,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_slides: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_slides.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} slides summarised",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} slides summarised  ({} failed)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total_slides,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise against a local Ollama (text report on stdout)
  slidebrief lecture-3.pptx

  # Write a PDF report next to the JSON on stdout
  slidebrief lecture-3.pptx --json -o lecture-3-summary.pdf

  # Use the hosted profile (paced at 1 call / 4 s)
  GEMINI_API_KEY=... slidebrief --profile hosted lecture-3.pptx

  # A deck that is already a PDF skips the LibreOffice step
  slidebrief slides-export.pdf -o brief.pdf

  # Include the per-slide summaries in the report
  slidebrief lecture-3.pptx --include-slides -o brief.pdf

BACKEND PROFILES:
  Profile      Endpoint                          Pacing
  ──────────   ───────────────────────────────   ─────────────
  self-hosted  OpenAI-compatible (Ollama, …)     none
  hosted       Google Gemini generateContent     4 s between calls

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        API key for the hosted profile
  SLIDEBRIEF_BASE_URL   Self-hosted endpoint base URL
  SLIDEBRIEF_MODEL      Model ID override
  SLIDEBRIEF_SOFFICE    LibreOffice binary (default: libreoffice)
  SLIDEBRIEF_PDFTOPPM   pdftoppm binary (default: pdftoppm)

SETUP:
  LibreOffice and poppler-utils must be on PATH for deck rendering:
    apt install libreoffice poppler-utils
"#;

/// Summarise slide decks with Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "slidebrief",
    version,
    about = "Summarise slide decks into per-slide and whole-deck briefs using Vision LLMs",
    long_about = "Summarise slide decks (.ppt, .pptx, .odp, or pre-rendered .pdf) into \
per-slide summaries and one deck-level brief, using a self-hosted OpenAI-compatible \
endpoint or the hosted Gemini API.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Deck file to summarise (.ppt, .pptx, .odp, .pdf).
    input: PathBuf,

    /// Write a PDF report to this path.
    #[arg(short, long, env = "SLIDEBRIEF_OUTPUT")]
    output: Option<PathBuf>,

    /// Backend profile: self-hosted or hosted.
    #[arg(long, value_enum, default_value = "self-hosted")]
    profile: ProfileArg,

    /// Base URL for the self-hosted profile.
    #[arg(long, env = "SLIDEBRIEF_BASE_URL", default_value = "http://localhost:11434/v1")]
    base_url: String,

    /// Model ID (defaults: gemma3:4b self-hosted, gemini-1.5-flash hosted).
    #[arg(long, env = "SLIDEBRIEF_MODEL")]
    model: Option<String>,

    /// API key for the hosted profile.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the pacing interval between backend calls, in seconds.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Rasterisation DPI (72–400).
    #[arg(long, env = "SLIDEBRIEF_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Max backend output tokens per call.
    #[arg(long, default_value_t = 1024)]
    max_tokens: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Per-backend-call timeout in seconds.
    #[arg(long, env = "SLIDEBRIEF_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Timeout for each converter subprocess in seconds.
    #[arg(long, default_value_t = 120)]
    render_timeout: u64,

    /// Interleave per-slide summaries into the report.
    #[arg(long)]
    include_slides: bool,

    /// Output the structured JSON result instead of the text report.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ProfileArg {
    SelfHosted,
    Hosted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = summarize(&cli.input, &config)
        .await
        .context("Summarisation failed")?;

    // ── Report file ──────────────────────────────────────────────────────
    if let Some(ref report_path) = cli.output {
        let slides = cli.include_slides.then_some(output.summaries.as_slice());
        let pdf = render_pdf_report(Some(&output.filename), &output.final_summary, slides)
            .context("Report rendering failed")?;
        std::fs::write(report_path, &pdf)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  report  →  {}",
                green("✔"),
                bold(&report_path.display().to_string())
            );
        }
    }

    // ── Stdout ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let slides = cli.include_slides.then_some(output.summaries.as_slice());
        let report = render_text_report(Some(&output.filename), &output.final_summary, slides);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(report.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        eprintln!(
            "   {}  {}ms render / {}ms analysis / {}ms aggregate",
            dim(&format!(
                "{}/{} slides",
                output.stats.summarized_slides, output.total_slides
            )),
            output.stats.render_ms,
            output.stats.analysis_ms,
            output.stats.aggregate_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli) -> Result<SummaryConfig> {
    let mut profile = match cli.profile {
        ProfileArg::SelfHosted => {
            let model = cli.model.clone().unwrap_or_else(|| "gemma3:4b".to_string());
            BackendProfile::self_hosted(&cli.base_url, model)
        }
        ProfileArg::Hosted => {
            let Some(ref api_key) = cli.api_key else {
                bail!("the hosted profile needs an API key (--api-key or GEMINI_API_KEY)");
            };
            let model = cli
                .model
                .clone()
                .unwrap_or_else(|| "gemini-1.5-flash".to_string());
            BackendProfile::hosted(api_key, model)
        }
    };

    if let Some(secs) = cli.interval_secs {
        profile = profile.with_call_interval(Duration::from_secs(secs));
    }

    let mut builder = SummaryConfig::builder()
        .profile(profile)
        .dpi(cli.dpi)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .render_timeout_secs(cli.render_timeout)
        .include_slide_summaries(cli.include_slides);

    if !cli.quiet && !cli.no_progress && !cli.json {
        builder = builder.progress(CliProgress::new());
    }

    builder.build().context("Invalid configuration")
}
