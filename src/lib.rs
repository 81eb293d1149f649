//! # pdf2text
//!
//! Download a PDF from a URL, split it into single pages and extract the
//! text of every page concurrently.
//!
//! The heavy lifting is done by two well-known command-line tools: `qpdf`
//! splits out each page and `pdftotext` (poppler) reads its text layer.
//! This crate handles the part around them: downloading once, fanning out
//! one worker per page with a bounded pool, collecting the results keyed by
//! page number, and making sure every temporary file is removed whatever
//! happens to any individual page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Fetch    stream the body into a uniquely named temp file
//!  ├─ 2. Count    read the page count with lopdf (spawn_blocking)
//!  ├─ 3. Split    qpdf <doc> --pages . N -- <page doc>     ┐ one worker
//!  ├─ 4. Extract  pdftotext <page doc> -                   ┘ per page
//!  └─ 5. Collect  page number → text, plus per-page errors
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2text::{process, ProcessConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessConfig::default();
//!     let output = process("https://example.com/report.pdf", &config).await?;
//!     for (page, text) in output.texts() {
//!         println!("--- page {page} ---\n{text}");
//!     }
//!     if !output.is_complete() {
//!         eprintln!("failed pages: {:?}", output.failed_pages());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2text` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ProcessConfig, ProcessConfigBuilder};
pub use error::{PageError, Pdf2TextError};
pub use output::{DocumentInfo, PageResult, ProcessOutput, ProcessStats};
pub use pipeline::tools::{PageSplitter, PdftotextExtractor, QpdfSplitter, TextExtractor};
pub use process::{inspect, process, process_sync, DocumentProcessor};
