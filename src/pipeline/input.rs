//! Source resolution: validate the image directory, or fetch a PDF.
//!
//! ## Why download to a temp file?
//!
//! pdfium requires a file-system path — it cannot stream from a byte buffer.
//! Downloading to a `TempDir` gives us a path pdfium can open while ensuring
//! cleanup happens automatically when [`PdfSource`] is dropped, even if the
//! process panics. We validate the PDF magic bytes (`%PDF`) before returning
//! so callers get a meaningful error rather than a pdfium crash.
//!
//! Directory validation is deliberately strict and early: a missing source
//! fails the run before any account registration or upload happens, so no
//! partial page can ever be created from a typo'd path.

use crate::error::PublishError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A PDF ready for rasterisation — local, or downloaded to a temp dir.
#[derive(Debug)]
pub struct PdfSource {
    path: PathBuf,
    /// Kept alive to prevent cleanup until rendering completes.
    _temp_dir: Option<TempDir>,
}

impl PdfSource {
    /// Path of the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Validate that `path` is an existing directory.
pub fn resolve_directory(path: &Path) -> Result<PathBuf, PublishError> {
    if !path.exists() {
        return Err(PublishError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(PublishError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    debug!("resolved source directory: {}", path.display());
    Ok(path.to_path_buf())
}

/// Resolve a PDF source string to a local file.
///
/// URLs are downloaded to a temporary directory; local paths are validated
/// in place. Both are checked for the `%PDF` magic.
pub async fn resolve_pdf(source: &str, timeout_secs: u64) -> Result<PdfSource, PublishError> {
    if is_url(source) {
        download_pdf(source, timeout_secs).await
    } else {
        resolve_local_pdf(source)
    }
}

fn resolve_local_pdf(path_str: &str) -> Result<PdfSource, PublishError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PublishError::SourceNotFound { path });
    }

    let mut magic = [0u8; 4];
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PublishError::NotAPdf { path, magic });
            }
        }
        Err(_) => {
            return Err(PublishError::SourceNotFound { path });
        }
    }

    debug!("resolved local PDF: {}", path.display());
    Ok(PdfSource {
        path,
        _temp_dir: None,
    })
}

async fn download_pdf(url: &str, timeout_secs: u64) -> Result<PdfSource, PublishError> {
    info!("downloading PDF from: {url}");

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PublishError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PublishError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PublishError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PublishError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);

    let temp_dir = TempDir::new().map_err(|e| PublishError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PublishError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PublishError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PublishError::Internal(format!("failed to write temp file: {e}")))?;

    info!("downloaded to: {}", file_path.display());

    Ok(PdfSource {
        path: file_path,
        _temp_dir: Some(temp_dir),
    })
}

/// Extract a reasonable filename from the URL path, falling back to a
/// constant name inside the private temp dir.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn missing_directory_is_source_not_found() {
        let err = resolve_directory(Path::new("/nonexistent/shots")).unwrap_err();
        assert!(matches!(err, PublishError::SourceNotFound { .. }));
    }

    #[test]
    fn file_is_not_a_directory() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = resolve_directory(tmp.path()).unwrap_err();
        assert!(matches!(err, PublishError::NotADirectory { .. }));
    }

    #[test]
    fn local_non_pdf_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"PNG data, definitely not a PDF").unwrap();
        let err = resolve_local_pdf(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PublishError::NotAPdf { .. }));
    }

    #[test]
    fn local_pdf_magic_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.7 rest of file").unwrap();
        let source = resolve_local_pdf(path.to_str().unwrap()).unwrap();
        assert_eq!(source.path(), path);
    }

    #[test]
    fn filename_from_url_variants() {
        assert_eq!(
            filename_from_url("https://example.com/docs/report.pdf"),
            "report.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
        assert_eq!(filename_from_url("not a url"), "downloaded.pdf");
    }
}
