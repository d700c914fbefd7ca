//! Geometric rescaler: detector-DPI boxes → raster-DPI pixel boxes.
//!
//! The detector and the rasterizer typically operate at different
//! resolutions (72-DPI text-layer coordinates vs. e.g. 300-DPI rendered
//! images). All downstream pixel cropping must happen in the rasterizer's
//! coordinate space, so both boxes are rescaled by `target / detection_dpi`
//! just before cropping.

use crate::figure::{BoundBox, Figure};

/// Return the caption and region boxes of `figure` rescaled to `target_dpi`.
///
/// Pure and stateless: the record is never mutated; absent boxes stay
/// absent. A record with no `detection_dpi` has no boxes by invariant and
/// yields `(None, None)`.
pub fn scale_boxes(figure: &Figure, target_dpi: f64) -> (Option<BoundBox>, Option<BoundBox>) {
    let Some(detection_dpi) = figure.detection_dpi() else {
        return (None, None);
    };
    let ratio = target_dpi / detection_dpi;
    (
        figure.caption_box().map(|b| b.scale(ratio)),
        figure.region_box().map(|b| b.scale(ratio)),
    )
}
