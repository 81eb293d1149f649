//! Page worker: split one page out, extract its text, delete the page file.
//!
//! ## Return Value
//!
//! Always returns a [`PageResult`] and never propagates the error upward, so
//! a single bad page doesn't abort the rest of the document. Callers check
//! `result.error` to see which pages are missing.

use crate::error::PageError;
use crate::output::PageResult;
use crate::pipeline::tools::{PageSplitter, TextExtractor};
use crate::pipeline::workspace::{TempArtifact, Workspace};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Everything a page worker needs, shared by all pages of all requests.
#[derive(Clone)]
pub struct PageContext {
    pub workspace: Workspace,
    pub splitter: Arc<dyn PageSplitter>,
    pub extractor: Arc<dyn TextExtractor>,
    /// Process-wide cap on concurrently running split+extract pipelines.
    pub permits: Arc<Semaphore>,
    /// `0` disables the timeout.
    pub page_timeout_secs: u64,
}

/// Extract the text of `page` (1-indexed) from `document`.
///
/// The page artifact is removed before returning on every path, including
/// timeout and cancellation of this future.
pub async fn process_page(ctx: &PageContext, document: &TempArtifact, page: usize) -> PageResult {
    let _permit = match ctx.permits.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return failed(
                page,
                Instant::now(),
                PageError::Io {
                    page,
                    detail: "worker pool is shut down".into(),
                },
            )
        }
    };

    let start = Instant::now();
    let artifact = ctx.workspace.page_artifact(document, page);
    let work = split_and_extract(ctx, document, &artifact, page);

    let outcome = if ctx.page_timeout_secs > 0 {
        match timeout(Duration::from_secs(ctx.page_timeout_secs), work).await {
            Ok(result) => result,
            Err(_) => Err(PageError::Timeout {
                page,
                secs: ctx.page_timeout_secs,
            }),
        }
    } else {
        work.await
    };
    drop(artifact);

    match outcome {
        Ok(text) => {
            debug!("Page {}: {} chars in {:?}", page, text.len(), start.elapsed());
            PageResult {
                page_num: page,
                text,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            warn!("Page {}: {}", page, e);
            failed(page, start, e)
        }
    }
}

async fn split_and_extract(
    ctx: &PageContext,
    document: &TempArtifact,
    artifact: &TempArtifact,
    page: usize,
) -> Result<String, PageError> {
    ctx.splitter
        .split_page(document.path(), page, artifact.path())
        .await?;
    ctx.extractor.extract_text(artifact.path(), page).await
}

fn failed(page: usize, start: Instant, error: PageError) -> PageResult {
    PageResult {
        page_num: page,
        text: String::new(),
        duration_ms: start.elapsed().as_millis() as u64,
        error: Some(error),
    }
}
