//! CLI binary for pdf2text.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `extract` and `inspect` run the same pipeline once and print JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdf2text::pipeline::tools::tool_available;
use pdf2text::{DocumentProcessor, ProcessConfig};
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on the default port (3001)
  pdf2text serve

  # Extract a document once and print page → text JSON
  pdf2text extract https://arxiv.org/pdf/1706.03762

  # Full per-page results, including errors and timings
  pdf2text extract --detail https://example.com/report.pdf

  # Page count only (no qpdf/pdftotext needed)
  pdf2text inspect https://example.com/report.pdf

HTTP API:
  POST /process          {"url": "https://..."}  → {"1": "...", "2": "..."}
  POST /process?detail=true                      → per-page results + stats
  GET  /health

REQUIREMENTS:
  qpdf and pdftotext (poppler-utils) on PATH, or pointed to with
  --qpdf / --pdftotext.

ENVIRONMENT VARIABLES:
  RUST_LOG                  Override log filter (e.g. pdf2text=debug)
  PDF2TEXT_*                Every flag has a matching variable (see --help)
"#;

/// Split PDFs into pages and extract per-page text concurrently.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Split PDFs into pages and extract per-page text concurrently",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2TEXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to bind.
        #[arg(long, env = "PDF2TEXT_BIND", default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Port to listen on.
        #[arg(short, long, env = "PDF2TEXT_PORT", default_value_t = 3001)]
        port: u16,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Extract one document and print the result as JSON.
    Extract {
        /// HTTP/HTTPS URL of the PDF.
        url: String,

        /// Print per-page results and stats instead of the page → text map.
        #[arg(long)]
        detail: bool,

        /// Exit with an error if any page failed.
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Download a document and print its page count.
    Inspect {
        /// HTTP/HTTPS URL of the PDF.
        url: String,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// Directory for temporary files (default: a private temp dir).
    #[arg(long, env = "PDF2TEXT_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2TEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-page split+extract timeout in seconds (0 disables).
    #[arg(long, env = "PDF2TEXT_PAGE_TIMEOUT", default_value_t = 60)]
    page_timeout: u64,

    /// Maximum download size in MiB.
    #[arg(long, env = "PDF2TEXT_MAX_DOWNLOAD_MB", default_value_t = 256)]
    max_download_mb: u64,

    /// qpdf program name or path.
    #[arg(long, env = "PDF2TEXT_QPDF", default_value = "qpdf")]
    qpdf: String,

    /// pdftotext program name or path.
    #[arg(long, env = "PDF2TEXT_PDFTOTEXT", default_value = "pdftotext")]
    pdftotext: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            port,
            pipeline,
        } => {
            for program in [&pipeline.qpdf, &pipeline.pdftotext] {
                if !tool_available(program).await {
                    tracing::warn!(
                        "'{}' could not be started; every page will fail until it is installed",
                        program
                    );
                }
            }
            let processor = Arc::new(build_processor(&pipeline)?);
            tracing::info!(
                "Starting pdf2text v{}, work dir {}",
                env!("CARGO_PKG_VERSION"),
                processor.workspace().path().display()
            );
            pdf2text::server::serve(SocketAddr::new(bind, port), processor)
                .await
                .context("HTTP server failed")?;
        }

        Command::Extract {
            url,
            detail,
            strict,
            pipeline,
        } => {
            let processor = build_processor(&pipeline)?;
            let output = processor
                .process(&url)
                .await
                .context("Extraction failed")?;

            let failed = output.failed_pages();
            let json = if detail {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string_pretty(&output.texts())
            }
            .context("Failed to serialise output")?;
            print_json(&json)?;

            if !failed.is_empty() {
                if !cli.quiet {
                    eprintln!("{} of {} pages failed: {:?}", failed.len(), output.pages.len(), failed);
                }
                if strict {
                    output.into_result().context("Extraction incomplete")?;
                }
            }
        }

        Command::Inspect { url, pipeline } => {
            let processor = build_processor(&pipeline)?;
            let info = processor
                .inspect(&url)
                .await
                .context("Failed to inspect PDF")?;
            let json =
                serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?;
            print_json(&json)?;
        }
    }

    Ok(())
}

/// Map CLI args to a `DocumentProcessor`.
fn build_processor(args: &PipelineArgs) -> Result<DocumentProcessor> {
    let mut builder = ProcessConfig::builder()
        .download_timeout_secs(args.download_timeout)
        .page_timeout_secs(args.page_timeout)
        .max_download_bytes(args.max_download_mb.saturating_mul(1024 * 1024))
        .qpdf_program(args.qpdf.clone())
        .pdftotext_program(args.pdftotext.clone());

    if let Some(ref dir) = args.work_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create work directory {:?}", dir))?;
        builder = builder.work_dir(dir);
    }

    let config = builder.build().context("Invalid configuration")?;
    DocumentProcessor::new(config).context("Failed to initialise processor")
}

fn print_json(json: &str) -> Result<()> {
    let mut handle = io::stdout().lock();
    writeln!(handle, "{}", json).context("Failed to write to stdout")
}
