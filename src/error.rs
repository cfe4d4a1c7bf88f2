//! Error types for the snapgraph library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PublishError`] — **Fatal**: the run cannot produce a page at all
//!   (missing source directory, PDF download failure, account registration
//!   rejected, zero files uploaded). Returned as `Err(PublishError)` from the
//!   top-level `publish_*` functions.
//!
//! * [`UploadError`] — **Non-fatal**: a single file failed after all retries
//!   but the rest of the batch is fine. Stored inside
//!   [`crate::output::UploadResult`] so callers can inspect partial success
//!   rather than losing the whole page to one bad file.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! failed file, log and continue, or collect all failures for a post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the snapgraph library.
///
/// Per-file upload failures use [`UploadError`] and are stored in
/// [`crate::output::UploadResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PublishError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// The source path was not found.
    #[error("source not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// The source path exists but is not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// HTTP URL was syntactically valid but the PDF download failed.
    #[error("failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("file is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Publishing-service errors ─────────────────────────────────────────
    /// Account registration yielded no usable access token.
    ///
    /// Page creation requires a token, so a failed registration is surfaced
    /// immediately instead of letting the later `createPage` call fail with a
    /// less useful message.
    #[error("account registration failed: {reason}")]
    RegistrationFailed { reason: String },

    /// `create_page` was called on a session that never registered.
    #[error("session holds no access token; call ensure_ready() first")]
    NotRegistered,

    /// The publishing service rejected a call with a non-flood error.
    #[error("publishing service error: {message}")]
    Api { message: String },

    /// Every file failed to upload; a page would be empty and is not created.
    #[error("none of the {total} files uploaded successfully after {attempts} attempts each; no page was created")]
    NoUploadsSucceeded { total: usize, attempts: u32 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file.
///
/// Stored in [`crate::output::UploadResult`] when a file exhausts its upload
/// attempts. The overall batch continues unless ALL files fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum UploadError {
    /// Every attempt failed; the last failure is recorded.
    #[error("'{file}': upload failed after {attempts} attempts: {detail}")]
    Exhausted {
        file: String,
        attempts: u32,
        detail: String,
    },
}

/// A single-attempt transfer failure from a file host.
///
/// Both variants are retriable — the retry loop in
/// [`crate::pipeline::upload`] treats transport errors and non-success
/// statuses the same way.
#[derive(Debug, Error)]
pub enum HostError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The host answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// An error from the page-publishing service API.
///
/// `FloodWait` is special-cased by [`crate::session::Session::create_page`]:
/// it carries a server-mandated wait and is always retried after sleeping.
/// Everything else propagates to the caller unretried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rate-limit signal with a mandatory wait before retrying.
    #[error("flood control: wait {seconds}s before retrying")]
    FloodWait { seconds: u64 },

    /// The service answered `ok: false` with a non-flood error string.
    #[error("{method} rejected: {message}")]
    Rejected {
        method: &'static str,
        message: String,
    },

    /// The call failed below the API layer (network, timeout, bad JSON).
    #[error("{method} failed: {detail}")]
    Transport {
        method: &'static str,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_uploads_display() {
        let e = PublishError::NoUploadsSucceeded {
            total: 7,
            attempts: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains('7'), "got: {msg}");
        assert!(msg.contains("no page was created"), "got: {msg}");
    }

    #[test]
    fn upload_error_display() {
        let e = UploadError::Exhausted {
            file: "shot2.png".into(),
            attempts: 3,
            detail: "HTTP 503: unavailable".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("shot2.png"));
        assert!(msg.contains("3 attempts"));
    }

    #[test]
    fn flood_wait_display() {
        let e = ApiError::FloodWait { seconds: 5 };
        assert!(e.to_string().contains("5s"));
    }

    #[test]
    fn registration_failed_display() {
        let e = PublishError::RegistrationFailed {
            reason: "SHORT_NAME_REQUIRED".into(),
        };
        assert!(e.to_string().contains("SHORT_NAME_REQUIRED"));
    }
}
