//! Document fetcher: download a URL into a fresh workspace artifact.
//!
//! The body is streamed straight to disk chunk by chunk, so a large PDF never
//! sits in memory and the size cap is enforced while reading. The artifact
//! guard is created before the file, which means any failure after that
//! point (status, timeout, write error, size cap) removes the partial file
//! on the way out.

use crate::error::Pdf2TextError;
use crate::pipeline::workspace::{TempArtifact, Workspace};
use futures::StreamExt;
use reqwest::Url;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// A document that made it onto local storage.
#[derive(Debug)]
pub struct Fetched {
    pub artifact: TempArtifact,
    pub size_bytes: u64,
}

/// Parse `url` and require an http or https scheme.
pub fn validate_url(url: &str) -> Result<Url, Pdf2TextError> {
    let parsed = Url::parse(url).map_err(|e| Pdf2TextError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Pdf2TextError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Build the HTTP client used for every download.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, Pdf2TextError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("pdf2text/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Pdf2TextError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Download `url` into a new document artifact inside `workspace`.
///
/// Any non-success status is fatal: the body of an error page is never
/// written out as if it were the document.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    workspace: &Workspace,
    timeout_secs: u64,
    max_bytes: u64,
) -> Result<Fetched, Pdf2TextError> {
    let parsed = validate_url(url)?;
    info!("Downloading PDF from: {}", url);

    let map_transport = |e: reqwest::Error| {
        if e.is_timeout() {
            Pdf2TextError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Pdf2TextError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(parsed).send().await.map_err(map_transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(Pdf2TextError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(Pdf2TextError::DownloadTooLarge {
                url: url.to_string(),
                limit: max_bytes,
            });
        }
    }

    let artifact = workspace.document_artifact();
    let temp_err = |source: std::io::Error| Pdf2TextError::TempFile {
        path: artifact.path().to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(artifact.path())
        .await
        .map_err(temp_err)?;

    let mut written: u64 = 0;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(map_transport)?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(Pdf2TextError::DownloadTooLarge {
                url: url.to_string(),
                limit: max_bytes,
            });
        }
        file.write_all(&chunk).await.map_err(temp_err)?;
    }
    file.flush().await.map_err(temp_err)?;
    drop(file);

    debug!("Downloaded {} bytes to {}", written, artifact.path().display());

    Ok(Fetched {
        artifact,
        size_bytes: written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_accepts_http_and_https() {
        assert!(validate_url("http://example.com/a.pdf").is_ok());
        assert!(validate_url("https://example.com/a.pdf?x=1").is_ok());
    }

    #[test]
    fn validate_url_rejects_other_schemes() {
        let err = validate_url("file:///etc/passwd").unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn validate_url_rejects_garbage() {
        let err = validate_url("not a url").unwrap_err();
        assert!(matches!(err, Pdf2TextError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::at(dir.path());
        let client = build_client(5).unwrap();
        // Port 9 (discard) on localhost is reliably closed in test environments.
        let err = fetch(&client, "http://127.0.0.1:9/doc.pdf", &ws, 5, 1024)
            .await
            .unwrap_err();
        assert!(err.is_fetch_error(), "got: {err}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
