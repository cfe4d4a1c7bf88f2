//! CLI binary for snapgraph.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PublishConfig`, drives one publish run, and prints the page URL.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use snapgraph::{
    publish_from_directory, publish_from_pdf, ProgressCallback, PublishConfig,
    PublishProgressCallback,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per file.
/// Uploads are sequential, so events arrive strictly in order.
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Uploading");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl PublishProgressCallback for CliProgress {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Uploading {total_files} files…"))
        ));
    }

    fn on_upload_start(&self, _index: usize, _total: usize, file: &Path) {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_upload_complete(&self, index: usize, total: usize, url: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(url)
        ));
        self.bar.inc(1);
    }

    fn on_upload_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, uploaded: usize, failed: usize) {
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} files uploaded",
                green("✔"),
                bold(&uploaded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files uploaded  ({} failed)",
                cyan("⚠"),
                bold(&uploaded.to_string()),
                uploaded + failed,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Publish a directory of screenshots
  snapgraph ./screenshots

  # Publish every page of a PDF, downloaded from a URL
  snapgraph --pdf https://example.com/report.pdf

  # Same, driven by the environment (CI-friendly)
  SNAPGRAPH_PDF_URL=https://example.com/report.pdf snapgraph

  # Custom title and author credit
  snapgraph --title "Build 1042 screenshots" \
            --author-name ci-bot --author-url https://ci.example ./shots

  # Throwaway account, nothing persisted
  snapgraph --no-persist-token ./shots

  # Structured output for scripting
  snapgraph --json ./shots | jq -r .page_url

ENVIRONMENT VARIABLES:
  SNAPGRAPH_PDF_URL          PDF source (selects PDF mode when set)
  SNAPGRAPH_DOMAIN           Publishing service domain (default: graph.org)
  SNAPGRAPH_UPLOAD_ENDPOINT  File-hosting endpoint URL
  SNAPGRAPH_TITLE            Page title
  SNAPGRAPH_AUTHOR_NAME      Author name shown on the page
  SNAPGRAPH_AUTHOR_URL       Author link shown on the page
  SNAPGRAPH_TOKEN_FILE       Credential record path

The first run registers an anonymous account and stores its access token
(default: <config dir>/snapgraph/credentials.json); later runs reuse it.
"#;

/// Publish screenshots or PDF pages as a Telegraph-style image page.
#[derive(Parser, Debug)]
#[command(
    name = "snapgraph",
    version,
    about = "Publish a directory of screenshots, or the pages of a PDF, as one shareable image page",
    arg_required_else_help = false,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory of image files to publish.
    source: Option<PathBuf>,

    /// Publish the pages of this PDF (local path or HTTP/HTTPS URL)
    /// instead of a directory.
    #[arg(long, env = "SNAPGRAPH_PDF_URL")]
    pdf: Option<String>,

    /// Publishing service domain.
    #[arg(long, env = "SNAPGRAPH_DOMAIN", default_value = "graph.org")]
    domain: String,

    /// File-hosting endpoint URL (default: https://<domain>/upload).
    #[arg(long, env = "SNAPGRAPH_UPLOAD_ENDPOINT")]
    upload_endpoint: Option<String>,

    /// Page title.
    #[arg(long, env = "SNAPGRAPH_TITLE", default_value = "Screenshots")]
    title: String,

    /// Author name shown below the page title.
    #[arg(long, env = "SNAPGRAPH_AUTHOR_NAME", default_value = "snapgraph")]
    author_name: String,

    /// Author link attached to the author name.
    #[arg(long, env = "SNAPGRAPH_AUTHOR_URL", default_value = "")]
    author_url: String,

    /// Account short name (default: random per account).
    #[arg(long)]
    short_name: Option<String>,

    /// Upload attempts per file.
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Delay between upload attempts, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Pause after each successful upload, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,

    /// Per-upload request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    upload_timeout: u64,

    /// PDF download timeout in seconds.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Longest edge of rendered PDF pages, in pixels.
    #[arg(long, default_value_t = 2000)]
    max_pixels: u32,

    /// Credential record path.
    #[arg(long, env = "SNAPGRAPH_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Register a throwaway account; persist nothing.
    #[arg(long)]
    no_persist_token: bool,

    /// Omit the <h4> title line from the page body.
    #[arg(long)]
    no_header: bool,

    /// Omit the publish-date/author footer from the page body.
    #[arg(long)]
    no_footer: bool,

    /// Print the full run result as JSON instead of just the URL.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the page URL and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the per-file feedback that matters; keep
    // library logs down to errors while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgress::new() as ProgressCallback)
    } else {
        None
    };

    let mut builder = PublishConfig::builder()
        .domain(&cli.domain)
        .title(&cli.title)
        .author_name(&cli.author_name)
        .author_url(&cli.author_url)
        .max_upload_attempts(cli.attempts)
        .upload_retry_delay_ms(cli.retry_delay_ms)
        .upload_pause_ms(cli.pause_ms)
        .upload_timeout_secs(cli.upload_timeout)
        .download_timeout_secs(cli.download_timeout)
        .max_rendered_pixels(cli.max_pixels)
        .include_header(!cli.no_header)
        .include_footer(!cli.no_footer)
        .persist_token(!cli.no_persist_token);

    if let Some(name) = &cli.short_name {
        builder = builder.short_name(name);
    }
    if let Some(url) = &cli.upload_endpoint {
        builder = builder.upload_endpoint(url);
    }
    if let Some(path) = &cli.token_file {
        builder = builder.token_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    // A PDF source (flag or SNAPGRAPH_PDF_URL) selects PDF mode; otherwise
    // the positional directory is required.
    let output = match (&cli.pdf, &cli.source) {
        (Some(pdf), _) => publish_from_pdf(pdf, &config)
            .await
            .context("publishing PDF failed")?,
        (None, Some(dir)) => publish_from_directory(dir, &config)
            .await
            .context("publishing directory failed")?,
        (None, None) => {
            anyhow::bail!("no source given: pass a directory, or --pdf <URL|PATH> (or set SNAPGRAPH_PDF_URL)")
        }
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", output.page_url).context("failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {}  {}/{} files  {}ms",
            dim("published"),
            output.stats.uploaded,
            output.stats.total_files,
            output.stats.total_duration_ms,
        );
        if output.stats.failed > 0 {
            eprintln!("   {} files failed to upload", output.stats.failed);
        }
    }

    Ok(())
}
