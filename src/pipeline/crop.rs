//! Cropping pipeline: rasterized pages + figure records → crop files.
//!
//! For every record, the page image is located by its two-digit page name,
//! the record's boxes are rescaled into the raster's pixel space, and two
//! crops are written: the figure/table body under `figs/` and the caption
//! under `caps/`. Regionless captions produce only the caption crop.
//!
//! One record's failure never blocks the rest of the batch: each failure is
//! recorded in that record's [`RecordResult`] and processing continues, so
//! partial results stay usable. Result order always matches input order.
//!
//! Crop file names are `page-<page>-fig-<name>.<ext>`. They cannot collide
//! across figures on the same page only as long as figure names are unique
//! per page — an invariant inherited from the detector, not enforced here.

use crate::config::ExtractionConfig;
use crate::error::CropError;
use crate::figure::{BoundBox, Figure};
use crate::output::RecordResult;
use crate::pipeline::rasterize::page_image_name;
use crate::pipeline::scale::scale_boxes;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Crop every record against the page images in `<doc_dir>/pages`.
///
/// Writes region crops to `<doc_dir>/figs` and caption crops to
/// `<doc_dir>/caps`; recorded paths are relative to `doc_dir`. Page images
/// are opened once each and never mutated.
pub fn crop_figures(
    doc_dir: &Path,
    doc_id: &str,
    figures: &[Figure],
    config: &ExtractionConfig,
) -> Vec<RecordResult> {
    let total = figures.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total);
    }

    // Several records usually reference the same page; decode each page once.
    let mut page_cache: HashMap<u32, DynamicImage> = HashMap::new();
    let mut results = Vec::with_capacity(total);

    for (index, figure) in figures.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_record_start(index, total);
        }

        let result = match crop_record(doc_dir, doc_id, figure, config, &mut page_cache) {
            Ok((fig_path, cap_path)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_record_complete(index, total);
                }
                RecordResult {
                    figure: figure.clone(),
                    fig_path,
                    cap_path,
                    error: None,
                }
            }
            Err(e) => {
                warn!("{figure}: {e}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_record_error(index, total, &e.to_string());
                }
                RecordResult {
                    figure: figure.clone(),
                    fig_path: None,
                    cap_path: None,
                    error: Some(e),
                }
            }
        };
        results.push(result);
    }

    if let Some(ref cb) = config.progress_callback {
        let cropped = results.iter().filter(|r| r.error.is_none()).count();
        cb.on_extraction_complete(total, cropped);
    }
    results
}

/// Crop one record. Returns the relative `(fig_path, cap_path)` pair.
fn crop_record(
    doc_dir: &Path,
    doc_id: &str,
    figure: &Figure,
    config: &ExtractionConfig,
    page_cache: &mut HashMap<u32, DynamicImage>,
) -> Result<(Option<PathBuf>, Option<PathBuf>), CropError> {
    let page = figure.page();
    let ext = config.image_format.ext();
    let page_name = page_image_name(doc_id, page, ext)?;
    let page_path = doc_dir.join("pages").join(&page_name);

    if !page_cache.contains_key(&page) {
        if !page_path.is_file() {
            return Err(CropError::MissingPageImage {
                page,
                path: page_path,
            });
        }
        let img = image::open(&page_path).map_err(|e| CropError::ImageRead {
            page,
            detail: e.to_string(),
        })?;
        page_cache.insert(page, img);
    }
    let page_img = &page_cache[&page];

    let (caption_box, region_box) = scale_boxes(figure, f64::from(config.raster_dpi));
    let crop_name = format!("page-{}-fig-{}.{}", page, figure.name(), ext);

    let fig_path = match region_box {
        Some(b) => Some(save_crop(page_img, b, figure, "region", doc_dir, "figs", &crop_name)?),
        None => None,
    };
    let cap_path = match caption_box {
        Some(b) => Some(save_crop(page_img, b, figure, "caption", doc_dir, "caps", &crop_name)?),
        None => None,
    };

    debug!("{figure}: cropped (fig={fig_path:?}, cap={cap_path:?})");
    Ok((fig_path, cap_path))
}

/// Cut `bound` out of the page image and save it under `<doc_dir>/<subdir>`.
///
/// Returns the crop's path relative to `doc_dir`.
fn save_crop(
    page_img: &DynamicImage,
    bound: BoundBox,
    figure: &Figure,
    which: &str,
    doc_dir: &Path,
    subdir: &str,
    crop_name: &str,
) -> Result<PathBuf, CropError> {
    let (x, y, w, h) = bound
        .to_pixel_rect(page_img.width(), page_img.height())
        .ok_or_else(|| CropError::BoxOutsidePage {
            page: figure.page(),
            name: figure.name().to_string(),
            which: which.to_string(),
        })?;

    let rel = PathBuf::from(subdir).join(crop_name);
    let abs = doc_dir.join(&rel);
    // JPEG cannot carry an alpha channel; RGB8 is safe for both formats.
    page_img
        .crop_imm(x, y, w, h)
        .to_rgb8()
        .save(&abs)
        .map_err(|e| CropError::ImageWrite {
            path: abs.clone(),
            detail: e.to_string(),
        })?;
    Ok(rel)
}
