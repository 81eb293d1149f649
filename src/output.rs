//! Output types returned by the processing pipeline.

use crate::error::{PageError, Pdf2TextError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one page worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Extracted text. Empty when the page failed or holds no text layer.
    pub text: String,
    /// Wall-clock time spent splitting and extracting this page.
    pub duration_ms: u64,
    /// Set when the page could not be extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
}

impl PageResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Timing and count statistics for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub total_pages: usize,
    pub extracted_pages: usize,
    pub failed_pages: usize,
    pub download_bytes: u64,
    pub download_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything known about one processed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// One entry per page, sorted by `page_num`.
    pub pages: Vec<PageResult>,
    pub stats: ProcessStats,
}

impl ProcessOutput {
    /// Page number → text for every page that extracted successfully.
    pub fn texts(&self) -> BTreeMap<usize, String> {
        self.pages
            .iter()
            .filter(|p| p.is_ok())
            .map(|p| (p.page_num, p.text.clone()))
            .collect()
    }

    /// Consume the output, keeping only the page → text mapping.
    pub fn into_texts(self) -> BTreeMap<usize, String> {
        self.pages
            .into_iter()
            .filter(|p| p.is_ok())
            .map(|p| (p.page_num, p.text))
            .collect()
    }

    /// Page numbers whose extraction failed, ascending.
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| !p.is_ok())
            .map(|p| p.page_num)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.pages.iter().all(PageResult::is_ok)
    }

    /// Treat any page failure as an error.
    pub fn into_result(self) -> Result<Self, Pdf2TextError> {
        let failed = self.failed_pages().len();
        if failed > 0 {
            return Err(Pdf2TextError::PartialFailure {
                failed,
                total: self.pages.len(),
            });
        }
        Ok(self)
    }
}

/// What [`crate::process::DocumentProcessor::inspect`] learns without extracting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub size_bytes: u64,
}
