//! External tools: page splitting with `qpdf`, text extraction with `pdftotext`.
//!
//! Both tools sit behind a trait so the pipeline can be driven by other
//! implementations (tests use in-process fakes). The default
//! implementations spawn the programs with an explicit argument vector;
//! paths are never interpolated into a shell command line.
//!
//! Children are spawned with `kill_on_drop`, so when the page worker's
//! timeout fires and drops the future, the process is killed rather than
//! left running.

use crate::error::PageError;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// qpdf exits with 3 when it succeeded but printed warnings.
const QPDF_EXIT_WARNINGS: i32 = 3;

/// Produces a single-page document from a multi-page source.
#[async_trait]
pub trait PageSplitter: Send + Sync {
    /// Write page `page` (1-indexed) of `source` as a new document at `output`.
    async fn split_page(&self, source: &Path, page: usize, output: &Path)
        -> Result<(), PageError>;
}

/// Produces the plain text of a single-page document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of `document`. `page` is only used to label errors.
    async fn extract_text(&self, document: &Path, page: usize) -> Result<String, PageError>;
}

/// [`PageSplitter`] backed by `qpdf <src> --pages . <n> -- <out>`.
#[derive(Debug, Clone)]
pub struct QpdfSplitter {
    program: String,
}

impl QpdfSplitter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for QpdfSplitter {
    fn default() -> Self {
        Self::new("qpdf")
    }
}

#[async_trait]
impl PageSplitter for QpdfSplitter {
    async fn split_page(
        &self,
        source: &Path,
        page: usize,
        output: &Path,
    ) -> Result<(), PageError> {
        let page_arg = page.to_string();
        let args: [&OsStr; 6] = [
            source.as_os_str(),
            OsStr::new("--pages"),
            OsStr::new("."),
            OsStr::new(&page_arg),
            OsStr::new("--"),
            output.as_os_str(),
        ];
        let out = run_tool(&self.program, &args, page).await?;
        match out.status.code() {
            Some(0) => Ok(()),
            Some(QPDF_EXIT_WARNINGS) => {
                debug!(
                    "Page {}: qpdf warnings: {}",
                    page,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(())
            }
            _ => Err(tool_failed(&self.program, page, &out)),
        }
    }
}

/// [`TextExtractor`] backed by `pdftotext <doc> -` (text on stdout).
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: String,
}

impl PdftotextExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

#[async_trait]
impl TextExtractor for PdftotextExtractor {
    async fn extract_text(&self, document: &Path, page: usize) -> Result<String, PageError> {
        let args: [&OsStr; 2] = [document.as_os_str(), OsStr::new("-")];
        let out = run_tool(&self.program, &args, page).await?;
        if !out.status.success() {
            return Err(tool_failed(&self.program, page, &out));
        }
        // Verbatim, including the empty string for image-only pages.
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// Check whether `program` can be started at all (`<program> --version`).
pub async fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .is_ok()
}

async fn run_tool(program: &str, args: &[&OsStr], page: usize) -> Result<Output, PageError> {
    debug!("Page {}: running {} {:?}", page, program, args);
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PageError::ToolNotFound {
            page,
            program: program.to_string(),
            detail: e.to_string(),
        })
}

fn tool_failed(program: &str, page: usize, out: &Output) -> PageError {
    PageError::ToolFailed {
        page,
        program: program.to_string(),
        status: out.status.to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    }
}
