//! # snapgraph
//!
//! Publish a directory of screenshots — or the pages of a PDF — as a single
//! Telegraph-style image page, and get back its public URL.
//!
//! ## Why this crate?
//!
//! Sharing a batch of screenshots usually means a zip file nobody opens or a
//! chat spammed with attachments. An anonymous Telegraph-style page turns
//! the batch into one scrollable link. The fiddly parts are everything
//! around the two HTTP calls: keeping upload order human-expected, riding
//! out flakey uploads without losing the batch, honouring the publishing
//! service's flood control, and not registering a new throwaway account on
//! every run. That pipeline is what this crate implements.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source
//!  │
//!  ├─ 1. Input    validate directory, or fetch local/remote PDF
//!  ├─ 2. Render   rasterise PDF pages to images (PDF mode only)
//!  ├─ 3. Order    natural filename sort ("shot2" before "shot10")
//!  ├─ 4. Upload   sequential multipart uploads, bounded retries per file
//!  ├─ 5. Assemble one <img> fragment per success, header/footer optional
//!  └─ 6. Publish  createPage with flood-control waits → page URL
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapgraph::{publish_from_directory, PublishConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PublishConfig::default();
//!     let output = publish_from_directory("./screenshots", &config).await?;
//!     println!("{}", output.page_url);
//!     eprintln!("{}/{} files published",
//!         output.stats.uploaded,
//!         output.stats.total_files);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `snapgraph` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! snapgraph = { version = "0.4", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! A single file that will not upload is skipped and reported in
//! [`PublishOutput::uploads`]; the page is still created from whatever
//! succeeded. Only run-level problems — missing source, failed account
//! registration, *zero* successful uploads — abort with [`PublishError`],
//! and in that case no page is created at all.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credentials;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod session;
pub mod telegraph;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PublishConfig, PublishConfigBuilder};
pub use credentials::TokenStore;
pub use error::{ApiError, HostError, PublishError, UploadError};
pub use output::{PublishOutput, PublishStats, UploadResult};
pub use pipeline::upload::{FileHost, HttpFileHost};
pub use progress::{ProgressCallback, PublishProgressCallback};
pub use publish::{enumerate_images, publish_files, publish_from_directory, publish_from_pdf};
pub use session::{random_short_name, Session};
pub use telegraph::{Identity, PageRequest, PageService, TelegraphClient};
