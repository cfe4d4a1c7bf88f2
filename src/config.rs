//! Configuration types for the upload-and-publish pipeline.
//!
//! All behaviour is controlled through [`PublishConfig`], built via its
//! [`PublishConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across calls and to diff two runs to understand why
//! their outputs differ.

use crate::error::PublishError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for publishing an image batch as a page.
///
/// Built via [`PublishConfig::builder()`] or using
/// [`PublishConfig::default()`].
///
/// # Example
/// ```rust
/// use snapgraph::PublishConfig;
///
/// let config = PublishConfig::builder()
///     .title("Episode 12 screenshots")
///     .author_name("arc")
///     .max_upload_attempts(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PublishConfig {
    /// Domain of the publishing service. Default: `graph.org`.
    ///
    /// The API lives at `https://api.<domain>` and published pages at
    /// `https://<domain>/<path>`.
    pub domain: String,

    /// Full URL of the anonymous file-hosting endpoint.
    /// If `None`, defaults to `https://<domain>/upload`.
    pub upload_endpoint: Option<String>,

    /// Page title, also used for the optional `<h4>` header line.
    /// Default: "Screenshots".
    pub title: String,

    /// Author name sent with registration and page creation. Default: "snapgraph".
    pub author_name: String,

    /// Author contact URL sent with registration and page creation.
    /// Default: empty (omitted from the page footer).
    pub author_url: String,

    /// Account short name used at registration. If `None`, a random 8-char
    /// hex string is generated per process, matching the throwaway-account
    /// behaviour of anonymous publishing.
    pub short_name: Option<String>,

    /// Total upload attempts per file (first try included). Default: 3.
    ///
    /// Transport errors and non-2xx statuses both count as retriable; after
    /// the last attempt the file is skipped and the batch continues.
    pub max_upload_attempts: u32,

    /// Fixed delay between upload attempts for the same file, in
    /// milliseconds. Default: 2000.
    ///
    /// The hosting endpoint gives no retry-after hint, so a fixed short pause
    /// is all that distinguishes a transient blip from a hammering client.
    pub upload_retry_delay_ms: u64,

    /// Pause after each successful upload, in milliseconds. Default: 1000.
    ///
    /// Deliberate throttling: the hosting endpoint is anonymous and rate
    /// limits silently. One second per file keeps a 50-screenshot batch
    /// under its radar at the cost of under a minute of wall clock.
    pub upload_pause_ms: u64,

    /// Per-request timeout for file uploads, in seconds. Default: 30.
    pub upload_timeout_secs: u64,

    /// Download timeout for PDF URL inputs, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum rendered page dimension (width or height) in pixels when
    /// rasterising a PDF. Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster would otherwise
    /// rasterise to a image large enough to exhaust memory and to exceed the
    /// hosting endpoint's upload limit.
    pub max_rendered_pixels: u32,

    /// Prepend a `<h4>` title line to the page body. Default: true.
    pub include_header: bool,

    /// Append a publish-date / author-credit footer. Default: true.
    pub include_footer: bool,

    /// Path of the persisted credential record. If `None`, defaults to
    /// `<config dir>/snapgraph/credentials.json`.
    pub token_path: Option<PathBuf>,

    /// Persist the access token across runs. Default: true.
    ///
    /// When false the session registers a fresh throwaway account per
    /// process and writes nothing to disk.
    pub persist_token: bool,

    /// Optional progress sink receiving per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            domain: "graph.org".to_string(),
            upload_endpoint: None,
            title: "Screenshots".to_string(),
            author_name: "snapgraph".to_string(),
            author_url: String::new(),
            short_name: None,
            max_upload_attempts: 3,
            upload_retry_delay_ms: 2000,
            upload_pause_ms: 1000,
            upload_timeout_secs: 30,
            download_timeout_secs: 120,
            max_rendered_pixels: 2000,
            include_header: true,
            include_footer: true,
            token_path: None,
            persist_token: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("domain", &self.domain)
            .field("upload_endpoint", &self.upload_endpoint)
            .field("title", &self.title)
            .field("author_name", &self.author_name)
            .field("author_url", &self.author_url)
            .field("short_name", &self.short_name)
            .field("max_upload_attempts", &self.max_upload_attempts)
            .field("upload_retry_delay_ms", &self.upload_retry_delay_ms)
            .field("upload_pause_ms", &self.upload_pause_ms)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("include_header", &self.include_header)
            .field("include_footer", &self.include_footer)
            .field("token_path", &self.token_path)
            .field("persist_token", &self.persist_token)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl PublishConfig {
    /// Create a new builder for `PublishConfig`.
    pub fn builder() -> PublishConfigBuilder {
        PublishConfigBuilder {
            config: Self::default(),
        }
    }

    /// The effective file-hosting endpoint URL.
    pub fn effective_upload_endpoint(&self) -> String {
        self.upload_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}/upload", self.domain))
    }
}

/// Builder for [`PublishConfig`].
#[derive(Debug)]
pub struct PublishConfigBuilder {
    config: PublishConfig,
}

impl PublishConfigBuilder {
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    pub fn upload_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.upload_endpoint = Some(url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn author_name(mut self, name: impl Into<String>) -> Self {
        self.config.author_name = name.into();
        self
    }

    pub fn author_url(mut self, url: impl Into<String>) -> Self {
        self.config.author_url = url.into();
        self
    }

    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.config.short_name = Some(name.into());
        self
    }

    pub fn max_upload_attempts(mut self, n: u32) -> Self {
        self.config.max_upload_attempts = n.max(1);
        self
    }

    pub fn upload_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.upload_retry_delay_ms = ms;
        self
    }

    pub fn upload_pause_ms(mut self, ms: u64) -> Self {
        self.config.upload_pause_ms = ms;
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn include_header(mut self, v: bool) -> Self {
        self.config.include_header = v;
        self
    }

    pub fn include_footer(mut self, v: bool) -> Self {
        self.config.include_footer = v;
        self
    }

    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.token_path = Some(path.into());
        self
    }

    pub fn persist_token(mut self, v: bool) -> Self {
        self.config.persist_token = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PublishConfig, PublishError> {
        let c = &self.config;
        if c.domain.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "domain must not be empty".into(),
            ));
        }
        if c.domain.contains('/') {
            return Err(PublishError::InvalidConfig(format!(
                "domain must be a bare host name, got '{}'",
                c.domain
            )));
        }
        if c.max_upload_attempts == 0 {
            return Err(PublishError::InvalidConfig(
                "max_upload_attempts must be ≥ 1".into(),
            ));
        }
        if c.title.trim().is_empty() {
            return Err(PublishError::InvalidConfig("title must not be empty".into()));
        }
        Ok(self.config)
    }
}
