//! Page-count resolver.
//!
//! The document is only opened to learn how many pages it has; the actual
//! per-page work is delegated to the external tools. lopdf parsing is
//! synchronous and CPU-bound, so it runs on the blocking thread pool to keep
//! the Tokio workers free for the concurrent page pipelines.

use crate::error::Pdf2TextError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Number of pages in the PDF at `path`.
pub async fn page_count(path: &Path) -> Result<usize, Pdf2TextError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || page_count_blocking(&path))
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("Page-count task panicked: {e}")))?
}

/// Blocking implementation of [`page_count`].
fn page_count_blocking(path: &Path) -> Result<usize, Pdf2TextError> {
    check_magic(path)?;

    let document = lopdf::Document::load(path).map_err(|e| Pdf2TextError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = document.get_pages().len();
    debug!("{}: {} pages", path.display(), pages);
    Ok(pages)
}

/// Verify the `%PDF` signature so an HTML error page or an empty body gets a
/// meaningful error instead of a parser failure.
fn check_magic(path: &Path) -> Result<(), Pdf2TextError> {
    let temp_err = |source: std::io::Error| Pdf2TextError::TempFile {
        path: PathBuf::from(path),
        source,
    };

    let file = std::fs::File::open(path).map_err(temp_err)?;
    let mut magic = Vec::with_capacity(PDF_MAGIC.len());
    file.take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .map_err(temp_err)?;

    if magic.as_slice() != PDF_MAGIC {
        return Err(Pdf2TextError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
