//! Temporary file store: unique artifact names inside one explicit directory.
//!
//! Every artifact is represented by a [`TempArtifact`] guard. The file is
//! removed when the guard is dropped, so a page worker that returns early,
//! errors, times out or is cancelled still leaves nothing behind.
//!
//! Document artifacts get a fresh v4 UUID as their name; page artifacts are
//! named `<page>-<document file name>`, which keeps them unique across
//! concurrent requests as long as the document name is.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

const DOCUMENT_EXTENSION: &str = "pdf";

/// Handle to the directory that holds all temporary artifacts.
///
/// Cheap to clone. When created with [`Workspace::ephemeral`] the directory
/// itself is deleted once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
    _owned: Option<Arc<TempDir>>,
}

impl Workspace {
    /// Use an existing directory. Nothing is created or removed besides the
    /// artifacts themselves.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _owned: None,
        }
    }

    /// Create a private temporary directory owned by this workspace.
    pub fn ephemeral() -> io::Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("pdf2text-").tempdir()?;
        debug!("Created work directory {}", temp_dir.path().display());
        Ok(Self {
            dir: temp_dir.path().to_path_buf(),
            _owned: Some(Arc::new(temp_dir)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Reserve a uniquely named path for a whole downloaded document.
    ///
    /// The file is not created here; the guard only owns the name.
    pub fn document_artifact(&self) -> TempArtifact {
        let name = format!("{}.{}", Uuid::new_v4().simple(), DOCUMENT_EXTENSION);
        TempArtifact::new(self.dir.join(name))
    }

    /// Reserve the path for the single-page document split out of `document`.
    pub fn page_artifact(&self, document: &TempArtifact, page: usize) -> TempArtifact {
        TempArtifact::new(self.dir.join(page_file_name(document.file_name(), page)))
    }
}

/// Name of the single-page artifact for `page` of the document `doc_name`.
pub fn page_file_name(doc_name: &str, page: usize) -> String {
    format!("{page}-{doc_name}")
}

/// A temporary file path owned by exactly one task.
///
/// Dropping the guard deletes the file if it exists. Missing files are not
/// an error: the guard is created before the file is.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed artifact {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove artifact {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn document_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        let names: HashSet<String> = (0..1000)
            .map(|_| ws.document_artifact().file_name().to_string())
            .collect();
        assert_eq!(names.len(), 1000);
        assert!(names.iter().all(|n| n.ends_with(".pdf")));
    }

    #[test]
    fn page_artifact_is_derived_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        let doc = ws.document_artifact();
        let page = ws.page_artifact(&doc, 12);
        assert_eq!(page.file_name(), format!("12-{}", doc.file_name()));
        assert_eq!(page.path().parent(), Some(dir.path()));
    }

    #[test]
    fn page_names_do_not_collide_across_pages() {
        assert_ne!(page_file_name("1abc.pdf", 1), page_file_name("abc.pdf", 11));
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        let artifact = ws.document_artifact();
        std::fs::write(artifact.path(), b"%PDF-1.4").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn drop_without_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        drop(ws.document_artifact());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn ephemeral_directory_removed_with_last_clone() {
        let ws = Workspace::ephemeral().unwrap();
        let path = ws.path().to_path_buf();
        let clone = ws.clone();
        drop(ws);
        assert!(path.is_dir());
        drop(clone);
        assert!(!path.exists());
    }
}
