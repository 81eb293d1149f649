//! Configuration types for PDF text extraction.
//!
//! All processing behaviour is controlled through [`ProcessConfig`], built
//! via its [`ProcessConfigBuilder`]. One struct holds every knob so the
//! server, the CLI and tests all construct the pipeline the same way.

use crate::error::Pdf2TextError;
use crate::pipeline::tools::{PageSplitter, TextExtractor};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default download cap: 256 MiB.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Configuration for a [`crate::process::DocumentProcessor`].
///
/// Built via [`ProcessConfig::builder()`] or using
/// [`ProcessConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2text::ProcessConfig;
///
/// let config = ProcessConfig::builder()
///     .work_dir(std::env::temp_dir())
///     .download_timeout_secs(30)
///     .page_timeout_secs(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessConfig {
    /// Directory holding every temporary artifact.
    ///
    /// `None` means the processor creates its own temporary directory and
    /// removes it when dropped. The directory must exist when set.
    pub work_dir: Option<PathBuf>,

    /// Download timeout in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-page timeout (split + extract) in seconds. `0` disables. Default: 60.
    ///
    /// A hung external tool otherwise stalls the whole request, since the
    /// processor waits for every page before answering.
    pub page_timeout_secs: u64,

    /// Maximum accepted response body in bytes. Default: 256 MiB.
    pub max_download_bytes: u64,

    /// Program used to split pages. Default: `qpdf` (resolved on `PATH`).
    pub qpdf_program: String,

    /// Program used to extract text. Default: `pdftotext` (resolved on `PATH`).
    pub pdftotext_program: String,

    /// Pre-constructed splitter. Takes precedence over `qpdf_program`.
    pub splitter: Option<Arc<dyn PageSplitter>>,

    /// Pre-constructed extractor. Takes precedence over `pdftotext_program`.
    pub extractor: Option<Arc<dyn TextExtractor>>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            download_timeout_secs: 120,
            page_timeout_secs: 60,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            qpdf_program: "qpdf".to_string(),
            pdftotext_program: "pdftotext".to_string(),
            splitter: None,
            extractor: None,
        }
    }
}

impl fmt::Debug for ProcessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessConfig")
            .field("work_dir", &self.work_dir)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("max_download_bytes", &self.max_download_bytes)
            .field("qpdf_program", &self.qpdf_program)
            .field("pdftotext_program", &self.pdftotext_program)
            .field("splitter", &self.splitter.as_ref().map(|_| "<dyn PageSplitter>"))
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .finish()
    }
}

impl ProcessConfig {
    /// Create a new builder for `ProcessConfig`.
    pub fn builder() -> ProcessConfigBuilder {
        ProcessConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProcessConfig`].
#[derive(Debug)]
pub struct ProcessConfigBuilder {
    config: ProcessConfig,
}

impl ProcessConfigBuilder {
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_timeout_secs = secs;
        self
    }

    pub fn max_download_bytes(mut self, bytes: u64) -> Self {
        self.config.max_download_bytes = bytes;
        self
    }

    pub fn qpdf_program(mut self, program: impl Into<String>) -> Self {
        self.config.qpdf_program = program.into();
        self
    }

    pub fn pdftotext_program(mut self, program: impl Into<String>) -> Self {
        self.config.pdftotext_program = program.into();
        self
    }

    pub fn splitter(mut self, splitter: Arc<dyn PageSplitter>) -> Self {
        self.config.splitter = Some(splitter);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessConfig, Pdf2TextError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_download_bytes == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "Download size limit must be ≥ 1 byte".into(),
            ));
        }
        if c.qpdf_program.trim().is_empty() || c.pdftotext_program.trim().is_empty() {
            return Err(Pdf2TextError::InvalidConfig(
                "Tool program names must not be empty".into(),
            ));
        }
        if let Some(ref dir) = c.work_dir {
            if !dir.is_dir() {
                return Err(Pdf2TextError::InvalidConfig(format!(
                    "Work directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ProcessConfig::default();
        assert_eq!(c.download_timeout_secs, 120);
        assert_eq!(c.page_timeout_secs, 60);
        assert_eq!(c.qpdf_program, "qpdf");
        assert_eq!(c.pdftotext_program, "pdftotext");
        assert!(c.work_dir.is_none());
        assert!(c.splitter.is_none());
    }

    #[test]
    fn builder_rejects_zero_download_timeout() {
        let err = ProcessConfig::builder()
            .download_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2TextError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_missing_work_dir() {
        let err = ProcessConfig::builder()
            .work_dir("/definitely/not/a/real/dir")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn builder_accepts_existing_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let c = ProcessConfig::builder()
            .work_dir(dir.path())
            .page_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.work_dir.as_deref(), Some(dir.path()));
        assert_eq!(c.page_timeout_secs, 0);
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = ProcessConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("ProcessConfig"));
        assert!(s.contains("qpdf"));
    }
}
