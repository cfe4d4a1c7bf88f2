//! Pipeline stages for the upload-and-publish run.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. point the uploader at a different host) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ order ──▶ upload ──▶ assemble
//! (dir/PDF)  (pdfium)  (natural)  (host ×N)  (HTML)
//! ```
//!
//! 1. [`input`]    — validate the source directory, or fetch a local/remote
//!    PDF to a temp file
//! 2. [`render`]   — rasterise PDF pages to per-page image files; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`order`]    — numeric-aware filename ordering so `shot2` precedes
//!    `shot10`
//! 4. [`upload`]   — sequential per-file transfer with bounded retries; the
//!    only stage with per-item network I/O
//! 5. [`assemble`] — concatenate the fragments into the page body

pub mod assemble;
pub mod input;
pub mod order;
pub mod render;
pub mod upload;
