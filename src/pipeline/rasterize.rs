//! Page rasterization: one image file per PDF page via `pdftoppm`.
//!
//! The rasterizer is an external collaborator: `pdftoppm` (poppler-utils)
//! renders each page at the configured DPI into
//! `<pages_dir>/<doc_id>-page-<NN>.<ext>`. The `-cropbox` flag makes the
//! rendered geometry match the box the PDF viewer shows, which is also the
//! space pdffigures2's 72-DPI coordinates refer to.

use crate::config::ExtractionConfig;
use crate::error::{CropError, FigcropError};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// File name of the rasterized image for a 1-indexed `page`.
///
/// Page numbers are zero-padded to two digits, matching pdftoppm's output
/// for documents under 100 pages. Larger page numbers get an explicit
/// [`CropError::PageNumberOverflow`] rather than a silently wrong filename.
pub fn page_image_name(doc_id: &str, page: u32, ext: &str) -> Result<String, CropError> {
    if page > 99 {
        return Err(CropError::PageNumberOverflow { page });
    }
    Ok(format!("{doc_id}-page-{page:02}.{ext}"))
}

/// Rasterize every page of `pdf_path` into `pages_dir`.
///
/// Returns the number of page images produced.
pub fn rasterize(
    pdf_path: &Path,
    pages_dir: &Path,
    doc_id: &str,
    config: &ExtractionConfig,
) -> Result<usize, FigcropError> {
    fs::create_dir_all(pages_dir).map_err(|source| FigcropError::OutputDirFailed {
        path: pages_dir.to_path_buf(),
        source,
    })?;

    let prefix = pages_dir.join(format!("{doc_id}-page"));
    debug!(
        "Rasterizing {} at {} DPI → {}",
        pdf_path.display(),
        config.raster_dpi,
        pages_dir.display()
    );

    let output = Command::new("pdftoppm")
        .arg(config.image_format.pdftoppm_flag())
        .arg("-r")
        .arg(config.raster_dpi.to_string())
        .arg("-cropbox")
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FigcropError::ToolNotFound {
                    tool: "pdftoppm".into(),
                    hint: "Install poppler-utils (apt install poppler-utils / brew install poppler)."
                        .into(),
                }
            } else {
                FigcropError::Internal(format!("failed to spawn pdftoppm: {e}"))
            }
        })?;

    if !output.status.success() {
        return Err(FigcropError::RasterizerFailed {
            path: pdf_path.to_path_buf(),
            status: output.status.code().unwrap_or(-1),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let pages = count_page_images(pages_dir, doc_id, config.image_format.ext())?;
    info!("Rasterized {} pages of {}", pages, pdf_path.display());
    Ok(pages)
}

/// Count the page images pdftoppm produced for this document.
fn count_page_images(pages_dir: &Path, doc_id: &str, ext: &str) -> Result<usize, FigcropError> {
    let prefix = format!("{doc_id}-page-");
    let suffix = format!(".{ext}");
    let entries = fs::read_dir(pages_dir)
        .map_err(|e| FigcropError::Internal(format!("read {}: {e}", pages_dir.display())))?;
    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(&suffix)
        })
        .count();
    Ok(count)
}
