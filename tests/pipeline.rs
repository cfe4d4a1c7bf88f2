//! Integration tests for the upload-and-publish pipeline.
//!
//! The network seams ([`FileHost`], [`PageService`]) are replaced with
//! scripted in-memory implementations, and every test that exercises retry
//! or flood-control timing runs on tokio's paused clock so "sleeps exactly
//! 2 seconds" is asserted against virtual time, instantly.

use snapgraph::pipeline::upload::upload_with_retry;
use snapgraph::{
    enumerate_images, publish_files, ApiError, FileHost, HostError, Identity, PageRequest,
    PageService, PublishConfig, PublishError, Session, TokenStore,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::time::{Duration, Instant};

// ── Mock services ────────────────────────────────────────────────────────────

/// Scripted file host: pops one outcome per call; once the script is empty,
/// echoes a URL derived from the file name (the all-success case).
#[derive(Default)]
struct ScriptedHost {
    script: Mutex<VecDeque<Result<String, ()>>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedHost {
    fn failing_times(n: usize) -> Self {
        let host = Self::default();
        host.script
            .lock()
            .unwrap()
            .extend(std::iter::repeat_with(|| Err(())).take(n));
        host
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

impl FileHost for ScriptedHost {
    async fn push(&self, file: &Path) -> Result<String, HostError> {
        self.calls.lock().unwrap().push(Instant::now());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(url)) => Ok(url),
            Some(Err(())) => Err(HostError::Status {
                status: 503,
                body: "service unavailable".into(),
            }),
            None => Ok(format!(
                "https://files.example/{}",
                file.file_name().unwrap().to_string_lossy()
            )),
        }
    }
}

/// Scripted page service: registration always issues the same token; page
/// creation pops one outcome per call (Err = flood-wait seconds), then
/// defaults to success.
#[derive(Default)]
struct ScriptedPages {
    account_calls: AtomicUsize,
    page_calls: AtomicUsize,
    tokens_seen: Mutex<Vec<String>>,
    bodies: Mutex<Vec<String>>,
    page_script: Mutex<VecDeque<Result<String, u64>>>,
}

impl ScriptedPages {
    fn flooding_once(seconds: u64, then_path: &str) -> Self {
        let pages = Self::default();
        {
            let mut script = pages.page_script.lock().unwrap();
            script.push_back(Err(seconds));
            script.push_back(Ok(then_path.to_string()));
        }
        pages
    }
}

const MOCK_TOKEN: &str = "tok-mock-1234";

impl PageService for &ScriptedPages {
    async fn create_account(&self, _identity: &Identity) -> Result<String, ApiError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MOCK_TOKEN.to_string())
    }

    async fn create_page(
        &self,
        access_token: &str,
        request: &PageRequest<'_>,
    ) -> Result<String, ApiError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.to_string());
        self.bodies
            .lock()
            .unwrap()
            .push(request.html_content.to_string());
        match self.page_script.lock().unwrap().pop_front() {
            Some(Err(seconds)) => Err(ApiError::FloodWait { seconds }),
            Some(Ok(path)) => Ok(path),
            None => Ok("mock-page".to_string()),
        }
    }
}

fn identity() -> Identity {
    Identity {
        short_name: "cafe0123".into(),
        author_name: "tester".into(),
        author_url: "https://example.com/tester".into(),
    }
}

fn write_files(dir: &TempDir, names: &[&str]) {
    for name in names {
        std::fs::write(dir.path().join(name), b"fake image bytes").unwrap();
    }
}

fn test_config(domain: &str) -> PublishConfig {
    PublishConfig::builder()
        .domain(domain)
        .max_upload_attempts(3)
        .upload_retry_delay_ms(2000)
        .upload_pause_ms(1000)
        .build()
        .unwrap()
}

// ── Uploader retry policy ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn upload_retries_twice_then_succeeds_with_configured_delay() {
    let host = ScriptedHost::failing_times(2);
    let result = upload_with_retry(&host, Path::new("shot1.png"), 3, 2000).await;

    assert_eq!(
        result.url.as_deref(),
        Some("https://files.example/shot1.png")
    );
    assert_eq!(result.attempts, 3);
    assert!(result.error.is_none());

    let times = host.call_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(2));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn upload_gives_up_after_exact_attempt_count() {
    let host = ScriptedHost::failing_times(10);
    let result = upload_with_retry(&host, Path::new("shot1.png"), 3, 2000).await;

    assert!(result.url.is_none());
    assert_eq!(result.attempts, 3);
    assert_eq!(host.call_times().len(), 3);
    let error = result.error.expect("terminal failure is recorded");
    assert!(error.to_string().contains("HTTP 503"));
}

// ── Zero-success guard ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn zero_successful_uploads_creates_no_page() {
    let dir = TempDir::new().unwrap();
    write_files(&dir, &["a.png", "b.png"]);
    let files = enumerate_images(dir.path()).await.unwrap();

    let host = ScriptedHost::failing_times(6); // 2 files × 3 attempts
    let pages = ScriptedPages::default();
    let mut session = Session::new(&pages, None, identity());

    let err = publish_files(&files, &mut session, &host, &test_config("graph.org"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PublishError::NoUploadsSucceeded {
            total: 2,
            attempts: 3
        }
    ));
    assert_eq!(pages.page_calls.load(Ordering::SeqCst), 0);
}

// ── Session bootstrap ────────────────────────────────────────────────────────

#[tokio::test]
async fn persisted_token_skips_registration() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"));
    store.save("persisted-tok").unwrap();

    let pages = ScriptedPages::default();
    let mut session = Session::new(&pages, Some(store), identity());
    assert!(session.is_ready());

    session.ensure_ready().await.unwrap();
    assert_eq!(pages.account_calls.load(Ordering::SeqCst), 0);

    let path = session.create_page("Screenshots", "<p>x</p>").await.unwrap();
    assert_eq!(path, "mock-page");
    assert_eq!(*pages.tokens_seen.lock().unwrap(), vec!["persisted-tok"]);
}

#[tokio::test]
async fn fresh_session_registers_once_and_persists() {
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("credentials.json");
    let store = TokenStore::new(&token_path);

    let pages = ScriptedPages::default();
    let mut session = Session::new(&pages, Some(store), identity());
    assert!(!session.is_ready());

    session.ensure_ready().await.unwrap();
    session.ensure_ready().await.unwrap(); // idempotent
    assert_eq!(pages.account_calls.load(Ordering::SeqCst), 1);

    // The fresh token is used for page creation…
    session.create_page("Screenshots", "<p>x</p>").await.unwrap();
    assert_eq!(*pages.tokens_seen.lock().unwrap(), vec![MOCK_TOKEN]);

    // …and landed in the store file.
    assert_eq!(
        TokenStore::new(&token_path).load().as_deref(),
        Some(MOCK_TOKEN)
    );
}

// ── Flood control ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn flood_wait_sleeps_server_mandated_duration_once() {
    let pages = ScriptedPages::flooding_once(2, "page-after-wait");
    let mut session = Session::new(&pages, None, identity());
    session.ensure_ready().await.unwrap();

    let start = Instant::now();
    let path = session.create_page("Screenshots", "<p>x</p>").await.unwrap();

    assert_eq!(path, "page-after-wait");
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(pages.page_calls.load(Ordering::SeqCst), 2);
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn directory_publishes_in_natural_order() {
    let dir = TempDir::new().unwrap();
    write_files(&dir, &["b.png", "a.png", "10.png", "2.png"]);

    let files = enumerate_images(dir.path()).await.unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["2.png", "10.png", "a.png", "b.png"]);

    let host = ScriptedHost::default(); // echoes per-file URLs
    let pages = ScriptedPages::default();
    let mut session = Session::new(&pages, None, identity());

    let output = publish_files(&files, &mut session, &host, &test_config("pages.example"))
        .await
        .unwrap();

    assert_eq!(output.page_url, "https://pages.example/mock-page");
    assert_eq!(output.page_path, "mock-page");
    assert_eq!(output.stats.uploaded, 4);
    assert_eq!(output.stats.failed, 0);

    let bodies = pages.bodies.lock().unwrap();
    let body = &bodies[0];
    assert_eq!(body.matches("<img").count(), 4);
    let pos = |needle: &str| {
        body.find(needle)
            .unwrap_or_else(|| panic!("missing fragment {needle} in {body}"))
    };
    assert!(pos("files.example/2.png") < pos("files.example/10.png"));
    assert!(pos("files.example/10.png") < pos("files.example/a.png"));
    assert!(pos("files.example/a.png") < pos("files.example/b.png"));
}

#[tokio::test(start_paused = true)]
async fn failed_files_are_skipped_but_page_still_publishes() {
    let dir = TempDir::new().unwrap();
    write_files(&dir, &["1.png", "2.png"]);
    let files = enumerate_images(dir.path()).await.unwrap();

    // First file burns all 3 attempts, second succeeds immediately.
    let host = ScriptedHost::failing_times(3);
    let pages = ScriptedPages::default();
    let mut session = Session::new(&pages, None, identity());

    let output = publish_files(&files, &mut session, &host, &test_config("graph.org"))
        .await
        .unwrap();

    assert_eq!(output.stats.uploaded, 1);
    assert_eq!(output.stats.failed, 1);
    assert!(!output.uploads[0].succeeded());
    assert!(output.uploads[1].succeeded());

    let bodies = pages.bodies.lock().unwrap();
    assert_eq!(bodies[0].matches("<img").count(), 1);
    assert!(bodies[0].contains("files.example/2.png"));
}
