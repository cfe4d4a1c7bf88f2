//! PDF rasterisation: render every page to an image file via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread designed for blocking operations, so the async runtime is not
//! stalled during CPU-heavy rendering.
//!
//! ## Why files, not in-memory images?
//!
//! The uploader's contract is "send a local file", the same for a rendered
//! page as for a screenshot on disk. Writing each page to
//! `page_<n>.png` in a `TempDir` lets the rest of the pipeline treat both
//! sources identically, and the zero-padded names keep page order under the
//! natural filename sort.

use crate::error::PublishError;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The rendered page files, in page order. Dropping this deletes them.
pub struct RenderedPages {
    files: Vec<PathBuf>,
    _temp_dir: TempDir,
}

impl RenderedPages {
    /// Per-page image paths in page order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Rasterise all pages of a PDF into PNG files.
///
/// `max_pixels` caps the longer edge of each rendered page; the other edge
/// scales proportionally, keeping memory and upload sizes bounded for
/// oversized pages.
pub async fn render_pdf_pages(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<RenderedPages, PublishError> {
    let path = pdf_path.to_path_buf();
    let temp_dir = TempDir::new().map_err(|e| PublishError::Internal(e.to_string()))?;
    let out_dir = temp_dir.path().to_path_buf();

    let files = tokio::task::spawn_blocking(move || render_blocking(&path, max_pixels, &out_dir))
        .await
        .map_err(|e| PublishError::Internal(format!("render task panicked: {e}")))??;

    Ok(RenderedPages {
        files,
        _temp_dir: temp_dir,
    })
}

fn render_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PublishError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| PublishError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {total_pages} pages");

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut files = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| PublishError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| PublishError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        let file = out_dir.join(format!("page_{:04}.png", idx + 1));
        image
            .save_with_format(&file, ImageFormat::Png)
            .map_err(|e| PublishError::RasterisationFailed {
                page: idx + 1,
                detail: format!("PNG write failed: {e}"),
            })?;

        debug!(
            "rendered page {} → {}x{} px, {}",
            idx + 1,
            image.width(),
            image.height(),
            file.display()
        );
        files.push(file);
    }

    Ok(files)
}
