//! CLI binary for figcrop.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use figcrop::{
    extract, ExtractionConfig, ExtractionProgressCallback, PageImageFormat, ProgressCallback,
};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over figure records with per-record
/// log lines for failures.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extraction_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rasterizing and detecting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_records: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} figures",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_records as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Cropping");
    }

    fn on_record_complete(&self, _index: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_record_error(&self, _index: usize, _total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} {}", red("✗"), red(&msg)));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_records: usize, cropped: usize) {
        let failed = total_records.saturating_sub(cropped);
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} figures cropped successfully",
                green("✔"),
                bold(&cropped.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} figures cropped  ({} failed)",
                if cropped == 0 { red("✘") } else { cyan("⚠") },
                bold(&cropped.to_string()),
                total_records,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic extraction into ./output/<doc-id>/
  figcrop paper.pdf

  # Custom output directory and raster DPI
  figcrop paper.pdf -o crops --dpi 200

  # PNG pages and crops
  figcrop paper.pdf --format png

  # Point at a pdffigures2 checkout explicitly
  figcrop paper.pdf --detector-home ~/src/pdffigures2

  # Emit the enriched manifest JSON on stdout
  figcrop paper.pdf --json > figures.json

OUTPUT LAYOUT:
  <output>/<doc-id>/pages/<doc-id>-page-NN.jpg   rasterized pages
  <output>/<doc-id>/figs/page-N-fig-NAME.jpg     figure/table body crops
  <output>/<doc-id>/caps/page-N-fig-NAME.jpg     caption crops
  <output>/<doc-id>/figures.json                 enriched manifest

EXTERNAL TOOLS:
  pdftoppm      poppler-utils; renders pages (apt install poppler-utils)
  pdffigures2   figure detector; needs a Java runtime and an assembly jar
                under the --detector-home directory

ENVIRONMENT VARIABLES:
  PDFFIGURES2_HOME   pdffigures2 install directory (same as --detector-home)
"#;

/// Extract and crop figure/table regions from PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "figcrop",
    version,
    about = "Extract, rescale, and crop figure/table regions from PDF documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Output root directory; results land under <output>/<doc-id>/.
    #[arg(short, long, env = "FIGCROP_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Rasterization DPI (72–600).
    #[arg(long, env = "FIGCROP_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Page/crop image format: jpg or png.
    #[arg(long, env = "FIGCROP_FORMAT", value_enum, default_value = "jpg")]
    format: FormatArg,

    /// pdffigures2 install directory.
    #[arg(long, env = "PDFFIGURES2_HOME")]
    detector_home: Option<PathBuf>,

    /// Print the enriched manifest JSON on stdout.
    #[arg(long, env = "FIGCROP_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "FIGCROP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FIGCROP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FIGCROP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Jpg,
    Png,
}

impl From<FormatArg> for PageImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpg => PageImageFormat::Jpeg,
            FormatArg::Png => PageImageFormat::Png,
        }
    }
}

fn main() -> Result<()> {
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
    let mut builder = ExtractionConfig::builder()
        .raster_dpi(cli.dpi)
        .image_format(cli.format.clone().into());
    if let Some(ref home) = cli.detector_home {
        builder = builder.detector_home(home);
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = extract(&cli.input, &cli.output, &config)
        .with_context(|| format!("Extraction failed for {}", cli.input.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.manifest)
                .context("Failed to serialize manifest")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} {} pages rasterized, {}/{} figures cropped → {}",
            cyan("◆"),
            output.stats.pages_rasterized,
            output.stats.cropped,
            output.stats.total_figures,
            output.manifest_path.display()
        );
        // The progress bar already echoed failures as they happened.
        if !show_progress {
            for failure in &output.failures {
                eprintln!("  {} {failure}", red("✗"));
            }
        }
    }

    // Non-zero exit when anything failed, so scripts can tell.
    if output.stats.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
