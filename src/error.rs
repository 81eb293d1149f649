//! Error types for the pdf2text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2TextError`] — **Fatal**: the request cannot proceed at all
//!   (unreachable URL, body is not a PDF, temp file could not be written).
//!   Returned as `Err(Pdf2TextError)` from [`crate::process`] entry points.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to split or extract
//!   but every other page is fine. Stored inside
//!   [`crate::output::PageResult`] so callers see exactly which pages are
//!   missing instead of a silently shorter mapping.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2text library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The URL does not parse or is not http/https.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Transport-level failure while downloading.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The server answered with a non-success status code.
    #[error("Failed to download '{url}': HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Response body exceeded the configured size cap.
    #[error("Download of '{url}' exceeds the {limit}-byte limit")]
    DownloadTooLarge { url: String, limit: u64 },

    /// Creating, writing or reading a temporary artifact failed.
    #[error("Temporary file error at '{path}': {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Format errors ─────────────────────────────────────────────────────
    /// The downloaded file does not start with the `%PDF` signature.
    #[error("Downloaded file is not a valid PDF: first bytes {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// The PDF structure cannot be parsed, so the page count is unknown.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Outcome errors ────────────────────────────────────────────────────
    /// Some pages failed during extraction.
    ///
    /// Returned by [`crate::output::ProcessOutput::into_result`] when the
    /// caller wants to treat any page failure as an error.
    #[error("{failed}/{total} pages failed during extraction")]
    PartialFailure { failed: usize, total: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TextError {
    /// `true` when the caller supplied bad input (HTTP 400 territory).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Pdf2TextError::InvalidUrl { .. })
    }

    /// `true` for failures while getting the document onto local storage.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Pdf2TextError::DownloadFailed { .. }
                | Pdf2TextError::DownloadTimeout { .. }
                | Pdf2TextError::HttpStatus { .. }
                | Pdf2TextError::DownloadTooLarge { .. }
                | Pdf2TextError::TempFile { .. }
        )
    }

    /// `true` when the fetched content is not a readable PDF.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Pdf2TextError::NotAPdf { .. } | Pdf2TextError::CorruptPdf { .. }
        )
    }
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageResult`] when a page fails.
/// The request continues for every other page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageError {
    /// The external program could not be started.
    #[error("Page {page}: '{program}' could not be started: {detail}")]
    ToolNotFound {
        page: usize,
        program: String,
        detail: String,
    },

    /// The external program exited unsuccessfully.
    #[error("Page {page}: '{program}' failed ({status}): {stderr}")]
    ToolFailed {
        page: usize,
        program: String,
        status: String,
        stderr: String,
    },

    /// Splitting plus extraction did not finish in time.
    #[error("Page {page}: timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },

    /// Local I/O around the page artifact failed.
    #[error("Page {page}: I/O error: {detail}")]
    Io { page: usize, detail: String },
}

impl PageError {
    /// The 1-indexed page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::ToolNotFound { page, .. }
            | PageError::ToolFailed { page, .. }
            | PageError::Timeout { page, .. }
            | PageError::Io { page, .. } => *page,
        }
    }
}
