//! Result types returned by the publish pipeline.

use crate::error::UploadError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one file's journey through the uploader.
///
/// One `UploadResult` exists per input file, in publish order. A file that
/// exhausted its attempts has `url: None` and the last failure in `error`;
/// it is skipped on the page but kept here so callers can report it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Local path of the source file.
    pub file: PathBuf,

    /// Public URL returned by the hosting endpoint, absent on failure.
    pub url: Option<String>,

    /// Attempts actually made (1 on first-try success).
    pub attempts: u32,

    /// The terminal failure, if the file never uploaded.
    pub error: Option<UploadError>,
}

impl UploadResult {
    /// Whether this file made it onto the page.
    pub fn succeeded(&self) -> bool {
        self.url.is_some()
    }
}

/// Aggregate counters for one publish run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishStats {
    /// Files enumerated from the source.
    pub total_files: usize,
    /// Files uploaded successfully.
    pub uploaded: usize,
    /// Files skipped after exhausting retries.
    pub failed: usize,
    /// Wall-clock time spent in the upload loop (pauses included).
    pub upload_duration_ms: u64,
    /// Wall-clock time for the whole run, registration and page creation included.
    pub total_duration_ms: u64,
}

/// Everything a successful publish run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutput {
    /// Absolute URL of the created page (`https://<domain>/<path>`).
    pub page_url: String,

    /// The path component returned by the publishing service.
    pub page_path: String,

    /// Per-file outcomes in publish order.
    pub uploads: Vec<UploadResult>,

    /// Aggregate counters.
    pub stats: PublishStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_result_succeeded() {
        let ok = UploadResult {
            file: "a.png".into(),
            url: Some("https://files.example/a".into()),
            attempts: 1,
            error: None,
        };
        assert!(ok.succeeded());

        let failed = UploadResult {
            file: "b.png".into(),
            url: None,
            attempts: 3,
            error: Some(UploadError::Exhausted {
                file: "b.png".into(),
                attempts: 3,
                detail: "HTTP 500".into(),
            }),
        };
        assert!(!failed.succeeded());
    }

    #[test]
    fn output_serialises() {
        let out = PublishOutput {
            page_url: "https://graph.org/abc".into(),
            page_path: "abc".into(),
            uploads: vec![],
            stats: PublishStats {
                total_files: 0,
                uploaded: 0,
                failed: 0,
                upload_duration_ms: 0,
                total_duration_ms: 0,
            },
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("page_url"));
    }
}
