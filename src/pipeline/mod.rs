//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the external tools can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ count ──▶ worker × N ──────────────▶ (process.rs)
//! (URL)    (lopdf)    ├─ tools: qpdf split
//!                     └─ tools: pdftotext
//! ```
//!
//! 1. [`workspace`] — unique artifact names in one directory, removal on drop
//! 2. [`fetch`]     — stream the URL body into a document artifact
//! 3. [`count`]     — learn the page count; runs in `spawn_blocking`
//! 4. [`tools`]     — [`tools::PageSplitter`] and [`tools::TextExtractor`]
//!    plus their `qpdf` / `pdftotext` implementations
//! 5. [`worker`]    — split + extract + cleanup for one page; never fails
//!    the request

pub mod count;
pub mod fetch;
pub mod tools;
pub mod worker;
pub mod workspace;
