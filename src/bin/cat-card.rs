//! CLI binary for cat-card.
//!
//! A thin shim over the library crate that maps CLI flags to `CardConfig`,
//! writes the card to disk and prints a summary.

use anyhow::{Context, Result};
use cat_card::{
    generate, save_output, CardConfig, Diagnostic, DiagnosticObserver, FetchError, Observer,
    OutputFormat,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner while the card is built plus one ✓/✗ line
/// per fetch.
struct CliObserver {
    bar: ProgressBar,
    failures: AtomicUsize,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Fetching");
        bar.set_message("cats…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            failures: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl DiagnosticObserver for CliObserver {
    fn on_event(&self, event: &Diagnostic) {
        match event {
            Diagnostic::FetchSucceeded { url, status, bytes } => {
                self.bar.println(format!(
                    "  {} {}  {}  {}",
                    green("✓"),
                    status,
                    dim(&format!("{bytes:>7} bytes")),
                    dim(url),
                ));
            }
            Diagnostic::FetchFailed(e) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                let msg = match e {
                    FetchError::EmptyUrl => e.to_string(),
                    FetchError::Status { status, .. } => format!("HTTP {status}"),
                    FetchError::Transport { reason, .. } => reason.clone(),
                };
                // Truncate very long error messages to keep output tidy.
                let msg = if msg.chars().count() > 80 {
                    format!("{}\u{2026}", msg.chars().take(79).collect::<String>())
                } else {
                    msg
                };
                self.bar.println(format!("  {} {}", red("✗"), red(&msg)));
            }
            Diagnostic::SlotSkipped { index, text } => {
                self.bar
                    .println(format!("  {} panel {index} ({text:?}) left blank", cyan("⚠")));
            }
            Diagnostic::NoImages => {
                self.bar
                    .println(format!("  {} no images fetched; card will be blank", cyan("⚠")));
            }
            Diagnostic::SlotPlaced { .. } => {}
            Diagnostic::Composed { images, .. } => {
                self.bar.set_prefix("Composing");
                self.bar.set_message(format!("{images} image(s)"));
            }
            Diagnostic::ComposeFailed { reason } => {
                self.bar.println(format!("  {} {}", red("✘"), red(reason)));
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default card: "Hello" | "You", 400x500 panels → images/cat-card.jpg
  cat-card

  # Custom captions and styling
  cat-card --greeting "Good" --who "Morning" --color white --size 60

  # PNG output to a chosen path
  cat-card --format png -o out/card.png

  # Fetch both panels at the same time
  cat-card --concurrent

  # Machine-readable run stats
  cat-card --json > stats.json

ENVIRONMENT VARIABLES:
  CAT_CARD_BASE_URL   Override the image service (default https://cataas.com/cat)
  CAT_CARD_OUTPUT     Output path
  RUST_LOG            Override the log filter (e.g. cat_card=debug)
"#;

/// Fetch two captioned cats and blend them into one card.
#[derive(Parser, Debug)]
#[command(
    name = "cat-card",
    version,
    about = "Fetch two captioned cats and blend them side by side into one image",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Caption of the left panel.
    #[arg(long, env = "CAT_CARD_GREETING", default_value = "Hello")]
    greeting: String,

    /// Caption of the right panel.
    #[arg(long, env = "CAT_CARD_WHO", default_value = "You")]
    who: String,

    /// Panel width in pixels (the card is twice as wide).
    #[arg(long, env = "CAT_CARD_WIDTH", default_value_t = 400,
          value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Panel height in pixels.
    #[arg(long, env = "CAT_CARD_HEIGHT", default_value_t = 500,
          value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Caption colour.
    #[arg(long, env = "CAT_CARD_COLOR", default_value = "Pink")]
    color: String,

    /// Caption font size.
    #[arg(long, env = "CAT_CARD_SIZE", default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Output encoding.
    #[arg(long, env = "CAT_CARD_FORMAT", value_enum, default_value = "jpeg")]
    format: FormatArg,

    /// Image service base URL.
    #[arg(long, env = "CAT_CARD_BASE_URL", default_value = cat_card::DEFAULT_BASE_URL)]
    base_url: String,

    /// Write the card here. Default: images/cat-card.<ext>.
    #[arg(short, long, env = "CAT_CARD_OUTPUT")]
    output: Option<PathBuf>,

    /// Fetch both panels concurrently.
    #[arg(long, env = "CAT_CARD_CONCURRENT")]
    concurrent: bool,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "CAT_CARD_TIMEOUT")]
    timeout: Option<u64>,

    /// Print run stats as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "CAT_CARD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CAT_CARD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CAT_CARD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner's per-fetch lines replace INFO logs when it is active.
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
    let observer = show_progress.then(CliObserver::new);
    let config = build_config(&cli, observer.clone().map(|o| o as Observer))?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("images/cat-card.{}", config.format.extension())));

    // ── Run ──────────────────────────────────────────────────────────────
    let result = generate(&config).await;
    if let Some(ref obs) = observer {
        obs.finish();
    }
    let output = result.context("Failed to build the card")?;

    save_output(&output_path, &output.buffer)
        .await
        .with_context(|| format!("Failed to save card to {}", output_path.display()))?;

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} panels  {}x{} {}  {}ms  →  {}",
            if stats.slots_skipped == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.slots_placed,
            stats.slots_requested,
            output.width,
            output.height,
            output.format,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if let Some(ref obs) = observer {
            let failures = obs.failures.load(Ordering::SeqCst);
            if failures > 0 {
                eprintln!("   {}", dim(&format!("{failures} fetch(es) failed")));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `CardConfig`.
fn build_config(cli: &Cli, observer: Option<Observer>) -> Result<CardConfig> {
    let mut builder = CardConfig::builder()
        .greeting(cli.greeting.clone())
        .who(cli.who.clone())
        .width(cli.width)
        .height(cli.height)
        .color(cli.color.clone())
        .size(cli.size)
        .format(cli.format.into())
        .base_url(cli.base_url.clone())
        .concurrent_fetch(cli.concurrent);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(obs) = observer {
        builder = builder.observer(obs);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_map_to_default_config() {
        let cli = Cli::parse_from(["cat-card"]);
        let config = build_config(&cli, None).unwrap();
        let default = CardConfig::default();

        assert_eq!(config.greeting, default.greeting);
        assert_eq!(config.who, default.who);
        assert_eq!(config.params, default.params);
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert_eq!(config.base_url, default.base_url);
    }

    #[test]
    fn cli_flags_override() {
        let cli = Cli::parse_from([
            "cat-card", "--greeting", "Hi", "--who", "Cat", "--width", "200", "--format", "png",
            "--concurrent", "--timeout", "5",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.greeting, "Hi");
        assert_eq!(config.params.width, 200);
        assert_eq!(config.format, OutputFormat::Png);
        assert!(config.concurrent_fetch);
        assert_eq!(config.request_timeout_secs, Some(5));
    }

    #[test]
    fn cli_rejects_zero_width() {
        assert!(Cli::try_parse_from(["cat-card", "--width", "0"]).is_err());
    }
}
