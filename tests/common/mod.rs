//! Shared fixtures for the integration tests.
//!
//! Everything here runs offline: documents are generated with lopdf, served
//! from a local axum server bound to an ephemeral port, and split/extracted
//! by in-process fakes instead of qpdf and pdftotext.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::Path as UrlPath;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use lopdf::{dictionary, Document, Object, Stream};
use pdf2text::{PageError, PageSplitter, ProcessConfig, TextExtractor};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Documents ────────────────────────────────────────────────────────────────

/// Build an N-page PDF whose page `i` shows the text `page i`.
pub fn multipage_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::with_capacity(pages);
    for i in 1..=pages {
        let content = format!("BT /F1 12 Tf 100 700 Td (page {i}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(pages as i64),
    });
    for page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
            dict.set("Parent", pages_id);
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

// ── Local file server ────────────────────────────────────────────────────────

/// Routes:
/// - `/doc/{n}`     an n-page PDF
/// - `/html`        an HTML error page served with 200
/// - `/truncated`   a PDF header followed by garbage
/// - `/big`         64 KiB of PDF-looking bytes
/// - anything else  404
pub async fn spawn_file_server() -> String {
    let app = Router::new()
        .route("/doc/:pages", get(serve_document))
        .route("/html", get(|| async { "<html><body>Not here</body></html>" }))
        .route("/truncated", get(|| async { "%PDF-1.4\n1 0 obj\n<< /Type" }))
        .route("/big", get(serve_big));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn serve_document(UrlPath(pages): UrlPath<usize>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/pdf")],
        multipage_pdf(pages),
    )
}

async fn serve_big() -> impl IntoResponse {
    let mut body = b"%PDF-1.4\n".to_vec();
    body.resize(64 * 1024, b' ');
    ([(header::CONTENT_TYPE, "application/pdf")], body)
}

// ── Fake page tools ──────────────────────────────────────────────────────────

/// Writes `page N` into the page file instead of running qpdf.
pub struct PageNumberSplitter;

#[async_trait]
impl PageSplitter for PageNumberSplitter {
    async fn split_page(&self, source: &Path, page: usize, output: &Path) -> Result<(), PageError> {
        assert!(source.exists(), "document must exist while pages are split");
        tokio::fs::write(output, format!("page {page}"))
            .await
            .map_err(|e| PageError::Io {
                page,
                detail: e.to_string(),
            })
    }
}

/// Returns the page file's contents, optionally failing on chosen pages.
#[derive(Default)]
pub struct ReadBackExtractor {
    fail_on: HashSet<usize>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ReadBackExtractor {
    pub fn failing_on(pages: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_on: pages.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Highest number of extractions observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for ReadBackExtractor {
    async fn extract_text(&self, document: &Path, page: usize) -> Result<String, PageError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = if self.fail_on.contains(&page) {
            Err(PageError::ToolFailed {
                page,
                program: "fake-extractor".into(),
                status: "exit status: 1".into(),
                stderr: "simulated failure".into(),
            })
        } else {
            tokio::fs::read_to_string(document)
                .await
                .map_err(|e| PageError::Io {
                    page,
                    detail: e.to_string(),
                })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ── Config helpers ───────────────────────────────────────────────────────────

/// Config using the fakes above and `work_dir` as the workspace.
pub fn fake_config(work_dir: &Path, extractor: Arc<ReadBackExtractor>) -> ProcessConfig {
    ProcessConfig::builder()
        .work_dir(work_dir)
        .download_timeout_secs(10)
        .page_timeout_secs(10)
        .splitter(Arc::new(PageNumberSplitter))
        .extractor(extractor)
        .build()
        .unwrap()
}

/// Number of entries left in `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
