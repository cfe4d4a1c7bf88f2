//! Batch-publish entry points.
//!
//! ## Run shape
//!
//! Both entry points funnel into [`publish_files`], which owns the run's
//! state machine:
//!
//! 1. make the session ready (registers once, or reuses a persisted token)
//! 2. upload files strictly in order, isolating per-file failures
//! 3. refuse to create a page when nothing uploaded
//! 4. assemble the HTML body and create the page, riding out flood control
//!
//! Uploads are deliberately sequential. The hosting endpoint is anonymous
//! and rate limits silently; one in-flight request plus a short pause after
//! each success keeps a large batch reliable, trading throughput for not
//! having half the batch rejected.

use crate::config::PublishConfig;
use crate::credentials::TokenStore;
use crate::error::PublishError;
use crate::output::{PublishOutput, PublishStats, UploadResult};
use crate::pipeline::upload::{FileHost, HttpFileHost};
use crate::pipeline::{assemble, input, order, render, upload};
use crate::session::{random_short_name, Session};
use crate::telegraph::{Identity, PageService, TelegraphClient};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Publish every file in a directory as one page.
///
/// Files are uploaded in natural filename order (`shot2.png` before
/// `shot10.png`). Returns the created page's absolute URL inside
/// [`PublishOutput`].
///
/// # Errors
/// Fatal conditions only: missing source, failed registration, zero
/// successful uploads, or a rejected page creation. Individual upload
/// failures are recorded in `output.uploads` and skipped.
pub async fn publish_from_directory(
    dir: impl AsRef<Path>,
    config: &PublishConfig,
) -> Result<PublishOutput, PublishError> {
    let dir = input::resolve_directory(dir.as_ref())?;
    let files = enumerate_images(&dir).await?;
    info!("publishing {} files from {}", files.len(), dir.display());

    let host = HttpFileHost::new(config.effective_upload_endpoint(), config.upload_timeout_secs)?;
    let mut session = default_session(config)?;
    publish_files(&files, &mut session, &host, config).await
}

/// Publish a PDF — local path or HTTP(S) URL — as one page, one image per
/// page of the document.
pub async fn publish_from_pdf(
    source: &str,
    config: &PublishConfig,
) -> Result<PublishOutput, PublishError> {
    let pdf = input::resolve_pdf(source, config.download_timeout_secs).await?;
    let rendered = render::render_pdf_pages(pdf.path(), config.max_rendered_pixels).await?;
    info!(
        "publishing {} rendered pages from {source}",
        rendered.files().len()
    );

    let host = HttpFileHost::new(config.effective_upload_endpoint(), config.upload_timeout_secs)?;
    let mut session = default_session(config)?;
    // `rendered` stays alive until publish_files returns; its temp files
    // are deleted on drop.
    publish_files(rendered.files(), &mut session, &host, config).await
}

/// Run the upload-and-publish state machine over an explicit file list.
///
/// The list is used as-is — callers wanting natural order sort first (the
/// directory entry point does). Exposed so custom [`FileHost`] /
/// [`PageService`] implementations can drive the same pipeline.
pub async fn publish_files<H: FileHost, S: PageService>(
    files: &[PathBuf],
    session: &mut Session<S>,
    host: &H,
    config: &PublishConfig,
) -> Result<PublishOutput, PublishError> {
    let total_start = Instant::now();

    session.ensure_ready().await?;

    if let Some(cb) = &config.progress_callback {
        cb.on_batch_start(files.len());
    }

    let upload_start = Instant::now();
    let mut uploads: Vec<UploadResult> = Vec::with_capacity(files.len());

    for (i, file) in files.iter().enumerate() {
        if let Some(cb) = &config.progress_callback {
            cb.on_upload_start(i + 1, files.len(), file);
        }

        let result = upload::upload_with_retry(
            host,
            file,
            config.max_upload_attempts,
            config.upload_retry_delay_ms,
        )
        .await;

        match (&result.url, &result.error) {
            (Some(url), _) => {
                if let Some(cb) = &config.progress_callback {
                    cb.on_upload_complete(i + 1, files.len(), url);
                }
                // Throttle: one request at a time is not enough on its own,
                // the anonymous host also wants breathing room between files.
                sleep(Duration::from_millis(config.upload_pause_ms)).await;
            }
            (None, error) => {
                let detail = error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "upload failed".to_string());
                warn!(file = %file.display(), "skipping file: {detail}");
                if let Some(cb) = &config.progress_callback {
                    cb.on_upload_error(i + 1, files.len(), &detail);
                }
            }
        }

        uploads.push(result);
    }

    let upload_duration_ms = upload_start.elapsed().as_millis() as u64;
    let uploaded = uploads.iter().filter(|u| u.succeeded()).count();
    let failed = uploads.len() - uploaded;

    if uploaded == 0 {
        // An empty page helps nobody; fail the run without touching the
        // page-creation API.
        return Err(PublishError::NoUploadsSucceeded {
            total: files.len(),
            attempts: config.max_upload_attempts,
        });
    }

    let html = assemble::assemble_document(&uploads, config);
    let page_path = session.create_page(&config.title, &html).await?;
    let page_url = format!("https://{}/{}", config.domain, page_path);

    info!(
        "published {uploaded}/{} files → {page_url}",
        files.len()
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_batch_complete(uploaded, failed);
    }

    Ok(PublishOutput {
        page_url,
        page_path,
        uploads,
        stats: PublishStats {
            total_files: files.len(),
            uploaded,
            failed,
            upload_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        },
    })
}

/// List the regular files of `dir` in natural filename order.
///
/// Subdirectories are skipped; everything else is a candidate — the hosting
/// endpoint is the judge of what it accepts.
pub async fn enumerate_images(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PublishError::Internal(format!("read_dir {}: {e}", dir.display())))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PublishError::Internal(format!("read_dir {}: {e}", dir.display())))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| PublishError::Internal(e.to_string()))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    order::sort_naturally(&mut files);
    Ok(files)
}

/// Session against the real publishing service, honouring the config's
/// persistence settings.
fn default_session(config: &PublishConfig) -> Result<Session<TelegraphClient>, PublishError> {
    let service = TelegraphClient::new(&config.domain, config.upload_timeout_secs)?;

    let store = if config.persist_token {
        match &config.token_path {
            Some(path) => Some(TokenStore::new(path.clone())),
            None => {
                let store = TokenStore::at_default_location();
                if store.is_none() {
                    warn!("no platform config directory; access token will not persist");
                }
                store
            }
        }
    } else {
        None
    };

    let identity = Identity {
        short_name: config
            .short_name
            .clone()
            .unwrap_or_else(random_short_name),
        author_name: config.author_name.clone(),
        author_url: config.author_url.clone(),
    };

    Ok(Session::new(service, store, identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enumerate_skips_subdirectories_and_sorts() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["shot10.png", "shot2.png", "shot1.png"] {
            std::fs::write(dir.path().join(name), b"png").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = enumerate_images(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["shot1.png", "shot2.png", "shot10.png"]);
    }

    #[tokio::test]
    async fn enumerate_missing_dir_errors() {
        assert!(enumerate_images(Path::new("/nonexistent/shots"))
            .await
            .is_err());
    }
}
