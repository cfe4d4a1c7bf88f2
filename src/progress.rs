//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn PublishProgressCallback>`] via
//! [`crate::config::PublishConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline uploads each file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a database record, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a single callback can be
//! shared with other tasks in the host application.

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it works through the batch.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Uploads are strictly sequential, so events for one
/// run arrive in order from a single task.
pub trait PublishProgressCallback: Send + Sync {
    /// Called once after enumeration, before the first upload.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file's first upload attempt.
    ///
    /// `index` is 1-based and follows the publish order.
    fn on_upload_start(&self, index: usize, total_files: usize, file: &Path) {
        let _ = (index, total_files, file);
    }

    /// Called when a file's upload succeeded (possibly after retries).
    fn on_upload_complete(&self, index: usize, total_files: usize, url: &str) {
        let _ = (index, total_files, url);
    }

    /// Called when a file exhausted its attempts and was skipped.
    fn on_upload_error(&self, index: usize, total_files: usize, error: &str) {
        let _ = (index, total_files, error);
    }

    /// Called once after the page was created (or would have been).
    ///
    /// `uploaded` counts files that made it onto the page.
    fn on_batch_complete(&self, uploaded: usize, failed: usize) {
        let _ = (uploaded, failed);
    }
}

/// Convenience alias for the injected callback handle.
pub type ProgressCallback = Arc<dyn PublishProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        completed: AtomicUsize,
    }

    impl PublishProgressCallback for Counting {
        fn on_upload_complete(&self, _index: usize, _total: usize, _url: &str) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let cb = Counting {
            completed: AtomicUsize::new(0),
        };
        // None of these should panic, and only on_upload_complete counts.
        cb.on_batch_start(3);
        cb.on_upload_start(1, 3, Path::new("a.png"));
        cb.on_upload_complete(1, 3, "https://x/y.png");
        cb.on_upload_error(2, 3, "HTTP 500");
        cb.on_batch_complete(1, 1);
        assert_eq!(cb.completed.load(Ordering::SeqCst), 1);
    }
}
