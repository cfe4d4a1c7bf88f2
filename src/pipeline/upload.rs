//! File upload: one multipart transfer per file, with bounded retries.
//!
//! ## Retry Strategy
//!
//! The hosting endpoint is anonymous and flaky in uninteresting ways —
//! transient 5xx, connection resets, the occasional slow proxy. A fixed
//! short delay between a handful of attempts recovers almost all of them;
//! there is no retry-after header to honour and no benefit to exponential
//! growth at this scale. A file that exhausts its attempts is recorded and
//! skipped — one bad file must never take down the batch.
//!
//! The [`FileHost`] trait is the seam between retry policy and transport:
//! the retry loop is tested against an in-memory host, and the HTTP
//! implementation stays a thin single-attempt function.

use crate::error::{HostError, PublishError, UploadError};
use crate::output::UploadResult;
use reqwest::multipart;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A single-attempt file transfer to a hosting endpoint.
///
/// Implementations make exactly one request; the retry loop in
/// [`upload_with_retry`] owns attempt counting and delays.
#[allow(async_fn_in_trait)]
pub trait FileHost {
    /// Transfer one local file; on success return its public URL.
    async fn push(&self, file: &Path) -> Result<String, HostError>;
}

/// Reqwest-backed [`FileHost`] posting `multipart/form-data` to a fixed URL.
///
/// The endpoint's success contract is minimal: status 2xx and the public
/// URL as the plain-text response body.
pub struct HttpFileHost {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpFileHost {
    /// A host client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PublishError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl FileHost for HttpFileHost {
    async fn push(&self, file: &Path) -> Result<String, HostError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| HostError::Transport(format!("read {}: {e}", file.display())))?;

        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime_for(file))
            .map_err(|e| HostError::Transport(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let url = body.trim();
        if url.is_empty() {
            return Err(HostError::Status {
                status: status.as_u16(),
                body: "empty response body".to_string(),
            });
        }

        Ok(url.to_string())
    }
}

/// Upload one file with the configured retry policy.
///
/// Both transport errors and non-success statuses are retriable. Never
/// fails the caller: exhaustion is reported inside the returned
/// [`UploadResult`].
pub async fn upload_with_retry<H: FileHost>(
    host: &H,
    file: &Path,
    max_attempts: u32,
    retry_delay_ms: u64,
) -> UploadResult {
    let mut last_err: Option<HostError> = None;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            debug!(
                file = %file.display(),
                attempt,
                "retrying upload after {retry_delay_ms}ms"
            );
            sleep(Duration::from_millis(retry_delay_ms)).await;
        }

        match host.push(file).await {
            Ok(url) => {
                debug!(file = %file.display(), attempt, %url, "uploaded");
                return UploadResult {
                    file: file.to_path_buf(),
                    url: Some(url),
                    attempts: attempt,
                    error: None,
                };
            }
            Err(e) => {
                warn!(
                    file = %file.display(),
                    attempt,
                    max_attempts,
                    "upload attempt failed: {e}"
                );
                last_err = Some(e);
            }
        }
    }

    let detail = last_err
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string());

    UploadResult {
        file: file.to_path_buf(),
        url: None,
        attempts: max_attempts,
        error: Some(UploadError::Exhausted {
            file: file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string()),
            attempts: max_attempts,
            detail,
        }),
    }
}

/// MIME type from the file extension, defaulting to PNG for the screenshot
/// case.
fn mime_for(file: &Path) -> &'static str {
    match file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("noext")), "image/png");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 200), "short");
        let t = truncate("éééééé", 3);
        assert!(t.starts_with('é'));
        assert!(t.ends_with('…'));
    }
}
