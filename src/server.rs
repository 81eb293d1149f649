//! HTTP surface: `POST /process` and `GET /health`.
//!
//! `POST /process` takes `{"url": "..."}` and answers with a JSON object
//! mapping page numbers to text. Pages that failed are absent from that
//! object and listed in the `x-failed-pages` response header. With
//! `?detail=true` the full [`ProcessOutput`] is returned instead, including
//! the error of every failed page.

use crate::error::Pdf2TextError;
use crate::output::ProcessOutput;
use crate::process::DocumentProcessor;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Header listing the page numbers that could not be extracted.
pub const FAILED_PAGES_HEADER: &str = "x-failed-pages";

/// Body of `POST /process`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    #[serde(default)]
    pub detail: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Errors surfaced to HTTP clients as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Processing(Pdf2TextError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<Pdf2TextError> for ApiError {
    fn from(e: Pdf2TextError) -> Self {
        ApiError::Processing(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Processing(e) if e.is_client_error() => {
                warn!("Rejected request: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Processing(e) => {
                error!("Processing failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    processor: Arc<DocumentProcessor>,
}

/// Build the application router around a shared processor.
pub fn router(processor: Arc<DocumentProcessor>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/process", post(process_document))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { processor })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, processor: Arc<DocumentProcessor>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(processor))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn process_document(
    State(state): State<AppState>,
    params: Result<Query<ProcessParams>, QueryRejection>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let Json(request) = payload?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("Field 'url' must not be empty".into()));
    }

    let output = state.processor.process(url).await?;

    if params.detail {
        return Ok(Json(output).into_response());
    }
    Ok(mapping_response(output))
}

fn mapping_response(output: ProcessOutput) -> Response {
    let failed = output.failed_pages();
    let mut response = Json(output.into_texts()).into_response();
    if !failed.is_empty() {
        let list = failed
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if let Ok(value) = HeaderValue::from_str(&list) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(FAILED_PAGES_HEADER), value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;
    use crate::output::{PageResult, ProcessStats};

    #[test]
    fn failed_pages_listed_in_header() {
        let output = ProcessOutput {
            pages: vec![
                PageResult {
                    page_num: 1,
                    text: "one".into(),
                    duration_ms: 0,
                    error: None,
                },
                PageResult {
                    page_num: 2,
                    text: String::new(),
                    duration_ms: 0,
                    error: Some(PageError::Timeout { page: 2, secs: 1 }),
                },
                PageResult {
                    page_num: 3,
                    text: String::new(),
                    duration_ms: 0,
                    error: Some(PageError::Timeout { page: 3, secs: 1 }),
                },
            ],
            stats: ProcessStats::default(),
        };
        let response = mapping_response(output);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[FAILED_PAGES_HEADER], "2,3");
    }

    #[test]
    fn complete_output_has_no_header() {
        let output = ProcessOutput {
            pages: vec![PageResult {
                page_num: 1,
                text: "one".into(),
                duration_ms: 0,
                error: None,
            }],
            stats: ProcessStats::default(),
        };
        let response = mapping_response(output);
        assert!(response.headers().get(FAILED_PAGES_HEADER).is_none());
    }

    #[test]
    fn client_errors_map_to_400() {
        let e = Pdf2TextError::InvalidUrl {
            url: "x".into(),
            reason: "bad".into(),
        };
        let response = ApiError::from(e).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let e = Pdf2TextError::HttpStatus {
            url: "http://x".into(),
            status: 404,
        };
        let response = ApiError::from(e).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
