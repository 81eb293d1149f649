//! Document processing entry points.
//!
//! [`DocumentProcessor::process`] drives one document through
//! `Fetching → CountingPages → ExtractingPages → Aggregating → Done`.
//! A failure while fetching or counting aborts the request (`Failed`);
//! a failure inside a page worker only marks that page.
//!
//! Page workers are driven with `buffer_unordered` and their results are
//! collected by this one future, so no result map is ever written from
//! two places at once.

use crate::config::ProcessConfig;
use crate::error::Pdf2TextError;
use crate::output::{DocumentInfo, PageResult, ProcessOutput, ProcessStats};
use crate::pipeline::count;
use crate::pipeline::fetch::{self, Fetched};
use crate::pipeline::tools::{PageSplitter, PdftotextExtractor, QpdfSplitter, TextExtractor};
use crate::pipeline::worker::{self, PageContext};
use crate::pipeline::workspace::Workspace;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Requests share one pool this many times larger than a single request's fan-out.
const GLOBAL_POOL_FACTOR: usize = 4;

/// Pipeline stages, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    CountingPages,
    ExtractingPages,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Fetching => "fetching",
            Stage::CountingPages => "counting_pages",
            Stage::ExtractingPages => "extracting_pages",
            Stage::Aggregating => "aggregating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Maximum number of page workers one request runs at the same time.
///
/// Fixed rather than configurable: twice the available parallelism, never
/// fewer than four.
pub fn page_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
        .max(4)
}

/// Long-lived processor: one HTTP client, one workspace, one worker pool.
///
/// Cheap to share behind an `Arc`; every call to [`process`](Self::process)
/// is independent of every other.
pub struct DocumentProcessor {
    config: ProcessConfig,
    client: reqwest::Client,
    ctx: PageContext,
}

impl fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("config", &self.config)
            .field("work_dir", &self.ctx.workspace.path())
            .finish()
    }
}

impl DocumentProcessor {
    pub fn new(config: ProcessConfig) -> Result<Self, Pdf2TextError> {
        let workspace = match config.work_dir {
            Some(ref dir) => Workspace::at(dir),
            None => Workspace::ephemeral().map_err(|e| {
                Pdf2TextError::Internal(format!("Failed to create work directory: {e}"))
            })?,
        };

        let splitter: Arc<dyn PageSplitter> = match config.splitter {
            Some(ref s) => Arc::clone(s),
            None => Arc::new(QpdfSplitter::new(config.qpdf_program.clone())),
        };
        let extractor: Arc<dyn TextExtractor> = match config.extractor {
            Some(ref e) => Arc::clone(e),
            None => Arc::new(PdftotextExtractor::new(config.pdftotext_program.clone())),
        };

        let client = fetch::build_client(config.download_timeout_secs)?;

        let ctx = PageContext {
            workspace,
            splitter,
            extractor,
            permits: Arc::new(Semaphore::new(page_concurrency() * GLOBAL_POOL_FACTOR)),
            page_timeout_secs: config.page_timeout_secs,
        };

        Ok(Self {
            config,
            client,
            ctx,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.ctx.workspace
    }

    /// Download `url`, split it into pages and extract every page's text.
    ///
    /// # Returns
    /// `Ok(ProcessOutput)` once every page has been attempted, even if some
    /// pages failed (see [`ProcessOutput::failed_pages`]).
    ///
    /// # Errors
    /// Only for whole-request failures: invalid URL, download failure,
    /// non-PDF or corrupt body. The downloaded file is removed either way.
    pub async fn process(&self, url: &str) -> Result<ProcessOutput, Pdf2TextError> {
        let total_start = Instant::now();
        info!("Starting extraction: {}", url);

        // ── Fetching ─────────────────────────────────────────────────────
        debug!(url, stage = %Stage::Fetching, "Stage");
        let fetch_start = Instant::now();
        let fetched = self.fetch(url).await?;
        let download_duration_ms = fetch_start.elapsed().as_millis() as u64;

        // ── CountingPages ────────────────────────────────────────────────
        debug!(url, stage = %Stage::CountingPages, "Stage");
        let total_pages = self.count(url, &fetched).await?;
        info!("PDF has {} pages", total_pages);

        // ── ExtractingPages ──────────────────────────────────────────────
        debug!(url, stage = %Stage::ExtractingPages, pages = total_pages, "Stage");
        let extract_start = Instant::now();
        let ctx = &self.ctx;
        let document = &fetched.artifact;
        let mut pages: Vec<PageResult> = stream::iter(1..=total_pages)
            .map(move |page| worker::process_page(ctx, document, page))
            .buffer_unordered(page_concurrency())
            .collect()
            .await;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

        // ── Aggregating ──────────────────────────────────────────────────
        debug!(url, stage = %Stage::Aggregating, "Stage");
        let size_bytes = fetched.size_bytes;
        drop(fetched);
        pages.sort_by_key(|p| p.page_num);

        let extracted = pages.iter().filter(|p| p.is_ok()).count();
        let stats = ProcessStats {
            total_pages,
            extracted_pages: extracted,
            failed_pages: pages.len() - extracted,
            download_bytes: size_bytes,
            download_duration_ms,
            extract_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        debug!(url, stage = %Stage::Done, "Stage");
        info!(
            "Extraction complete: {}/{} pages, {}ms total",
            extracted, total_pages, stats.total_duration_ms
        );

        Ok(ProcessOutput { pages, stats })
    }

    /// Download `url` and report its page count without extracting anything.
    pub async fn inspect(&self, url: &str) -> Result<DocumentInfo, Pdf2TextError> {
        let fetched = self.fetch(url).await?;
        let page_count = self.count(url, &fetched).await?;
        Ok(DocumentInfo {
            page_count,
            size_bytes: fetched.size_bytes,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, Pdf2TextError> {
        fetch::fetch(
            &self.client,
            url,
            &self.ctx.workspace,
            self.config.download_timeout_secs,
            self.config.max_download_bytes,
        )
        .await
        .inspect_err(|e| error!(url, stage = %Stage::Failed, "Fetch failed: {}", e))
    }

    async fn count(&self, url: &str, fetched: &Fetched) -> Result<usize, Pdf2TextError> {
        count::page_count(fetched.artifact.path())
            .await
            .inspect_err(|e| error!(url, stage = %Stage::Failed, "Page count failed: {}", e))
    }
}

/// Process a PDF URL with a one-off [`DocumentProcessor`].
///
/// Prefer building one processor and reusing it when handling many
/// documents; this helper creates a fresh HTTP client and workspace.
pub async fn process(
    url: impl AsRef<str>,
    config: &ProcessConfig,
) -> Result<ProcessOutput, Pdf2TextError> {
    DocumentProcessor::new(config.clone())?
        .process(url.as_ref())
        .await
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    url: impl AsRef<str>,
    config: &ProcessConfig,
) -> Result<ProcessOutput, Pdf2TextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2TextError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(process(url, config))
}

/// Fetch a PDF URL and report its page count.
///
/// Does not require `qpdf` or `pdftotext`.
pub async fn inspect(
    url: impl AsRef<str>,
    config: &ProcessConfig,
) -> Result<DocumentInfo, Pdf2TextError> {
    DocumentProcessor::new(config.clone())?
        .inspect(url.as_ref())
        .await
}
