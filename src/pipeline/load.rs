//! Region extraction loader: raw detector JSON → validated [`Figure`] records.
//!
//! pdffigures2 emits two shapes that must be normalized into one record
//! shape:
//!
//! 1. **Linked caption+region** entries under `figures`: a `regionBoundary`
//!    (figure/table body) and a `captionBoundary` (caption text), each as
//!    `{x1,y1,x2,y2}`.
//! 2. **Regionless caption** entries under `regionless-captions`: a caption
//!    whose figure body was not located; only a single `boundary` box, which
//!    becomes the caption box.
//!
//! Both merge into one iteration order — all linked entries first, then all
//! regionless entries, each group in detector output order. Raw page numbers
//! are 0-indexed; records are 1-indexed.

use crate::error::FigcropError;
use crate::figure::{BoundBox, Figure, FigureKind, DETECTION_DPI};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Outward expansion, in 72-DPI units, applied to every caption box.
///
/// The detector's text-layer-derived caption boxes are consistently a little
/// too tight relative to human-annotated ground truth; this constant
/// compensates empirically. Region boxes are never expanded.
pub const CAPTION_EXPANSION: f64 = 3.0;

#[derive(Deserialize)]
struct DetectorOutput {
    #[serde(default)]
    figures: Vec<RawLinked>,
    #[serde(default, rename = "regionless-captions")]
    regionless_captions: Vec<RawRegionless>,
}

#[derive(Deserialize)]
struct RawBoundary {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl From<&RawBoundary> for BoundBox {
    fn from(b: &RawBoundary) -> Self {
        BoundBox::new(b.x1, b.y1, b.x2, b.y2)
    }
}

#[derive(Deserialize)]
struct RawLinked {
    #[serde(rename = "figType")]
    fig_type: String,
    name: String,
    page: u32,
    #[serde(default)]
    caption: String,
    #[serde(rename = "regionBoundary")]
    region_boundary: RawBoundary,
    #[serde(rename = "captionBoundary")]
    caption_boundary: RawBoundary,
}

#[derive(Deserialize)]
struct RawRegionless {
    #[serde(rename = "figType")]
    fig_type: String,
    #[serde(default)]
    name: Option<String>,
    page: u32,
    boundary: RawBoundary,
    #[serde(default)]
    text: String,
}

/// Load and normalize a detector output file into an ordered record sequence.
///
/// A missing file means the detector found nothing (or was never run) and
/// yields an empty sequence, not an error. Malformed JSON or an unrecognized
/// `figType` fails the whole document — there is no recovery or guessing at
/// this boundary.
pub fn load_figures(path: &Path) -> Result<Vec<Figure>, FigcropError> {
    if !path.is_file() {
        debug!("No detector output at {}; treating as zero figures", path.display());
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path)
        .map_err(|e| FigcropError::Internal(format!("read {}: {e}", path.display())))?;
    let raw: DetectorOutput =
        serde_json::from_str(&data).map_err(|source| FigcropError::DetectorJson {
            path: path.to_path_buf(),
            source,
        })?;

    let mut figures = Vec::with_capacity(raw.figures.len() + raw.regionless_captions.len());

    for entry in &raw.figures {
        let kind: FigureKind = entry.fig_type.parse()?;
        figures.push(
            Figure::builder(kind, entry.name.clone(), entry.page + 1)
                .detection_dpi(DETECTION_DPI)
                .caption(entry.caption.clone())
                .caption_box(BoundBox::from(&entry.caption_boundary).expand(CAPTION_EXPANSION))
                .region_box(BoundBox::from(&entry.region_boundary))
                .build()?,
        );
    }

    for entry in &raw.regionless_captions {
        let kind: FigureKind = entry.fig_type.parse()?;
        let name = entry
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| label_from_caption(&entry.text))
            .ok_or_else(|| FigcropError::InvalidRecord {
                detail: format!(
                    "regionless caption on page {} has no name and none derivable from its text",
                    entry.page
                ),
            })?;
        figures.push(
            Figure::builder(kind, name, entry.page + 1)
                .detection_dpi(DETECTION_DPI)
                .caption(entry.text.clone())
                .caption_box(BoundBox::from(&entry.boundary).expand(CAPTION_EXPANSION))
                .build()?,
        );
    }

    info!(
        "Loaded {} figure records from {} ({} linked, {} regionless)",
        figures.len(),
        path.display(),
        raw.figures.len(),
        raw.regionless_captions.len()
    );
    Ok(figures)
}

/// Derive a figure name from its caption label, e.g. `"Table 2: X"` → `"2"`.
///
/// Detector output in the wild occasionally omits `name` on regionless
/// entries even though the caption text carries the label.
fn label_from_caption(text: &str) -> Option<String> {
    let label = text
        .split_whitespace()
        .nth(1)?
        .trim_end_matches([':', '.', ',']);
    (!label.is_empty()).then(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_file_yields_empty_sequence() {
        let figs = load_figures(Path::new("/nonexistent/figures.json")).unwrap();
        assert!(figs.is_empty());
    }

    #[test]
    fn linked_entry_scenario() {
        let f = write_json(
            r#"{
              "figures": [{
                "figType": "Figure", "name": "1", "page": 0,
                "caption": "Figure 1: results",
                "regionBoundary": {"x1": 10, "y1": 10, "x2": 50, "y2": 50},
                "captionBoundary": {"x1": 10, "y1": 60, "x2": 50, "y2": 70}
              }],
              "regionless-captions": []
            }"#,
        );
        let figs = load_figures(f.path()).unwrap();
        assert_eq!(figs.len(), 1);
        let fig = &figs[0];
        assert_eq!(fig.kind(), FigureKind::Figure);
        assert_eq!(fig.page(), 1);
        assert_eq!(fig.detection_dpi(), Some(72.0));
        assert_eq!(fig.region_box(), Some(BoundBox::new(10.0, 10.0, 50.0, 50.0)));
        // Caption box expanded by 3 units on each side, exactly once.
        assert_eq!(fig.caption_box(), Some(BoundBox::new(7.0, 57.0, 53.0, 73.0)));
    }

    #[test]
    fn regionless_entry_scenario() {
        let f = write_json(
            r#"{
              "figures": [],
              "regionless-captions": [{
                "figType": "Table", "page": 2,
                "boundary": {"x1": 0, "y1": 0, "x2": 20, "y2": 5},
                "text": "Table 2: X"
              }]
            }"#,
        );
        let figs = load_figures(f.path()).unwrap();
        assert_eq!(figs.len(), 1);
        let fig = &figs[0];
        assert_eq!(fig.kind(), FigureKind::Table);
        assert_eq!(fig.page(), 3);
        assert_eq!(fig.region_box(), None);
        assert_eq!(fig.caption_box(), Some(BoundBox::new(-3.0, -3.0, 23.0, 8.0)));
        assert_eq!(fig.name(), "2");
        assert_eq!(fig.caption(), Some("Table 2: X"));
    }

    #[test]
    fn linked_entries_precede_regionless_entries() {
        let f = write_json(
            r#"{
              "figures": [{
                "figType": "Figure", "name": "3", "page": 4, "caption": "Figure 3",
                "regionBoundary": {"x1": 1, "y1": 1, "x2": 2, "y2": 2},
                "captionBoundary": {"x1": 1, "y1": 3, "x2": 2, "y2": 4}
              }],
              "regionless-captions": [{
                "figType": "Figure", "name": "1", "page": 0,
                "boundary": {"x1": 0, "y1": 0, "x2": 5, "y2": 5},
                "text": "Figure 1: first"
              }]
            }"#,
        );
        let figs = load_figures(f.path()).unwrap();
        let names: Vec<_> = figs.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["3", "1"]);
        assert!(figs[0].region_box().is_some());
        assert!(figs[1].region_box().is_none());
    }

    #[test]
    fn unknown_fig_type_fails_whole_document() {
        let f = write_json(
            r#"{
              "figures": [{
                "figType": "Chart", "name": "1", "page": 0, "caption": "c",
                "regionBoundary": {"x1": 0, "y1": 0, "x2": 1, "y2": 1},
                "captionBoundary": {"x1": 0, "y1": 0, "x2": 1, "y2": 1}
              }],
              "regionless-captions": []
            }"#,
        );
        let err = load_figures(f.path()).unwrap_err();
        assert!(matches!(err, FigcropError::InvalidFigureType { value } if value == "Chart"));
    }

    #[test]
    fn malformed_json_is_a_detector_json_error() {
        let f = write_json("{ not json");
        let err = load_figures(f.path()).unwrap_err();
        assert!(matches!(err, FigcropError::DetectorJson { .. }));
    }

    #[test]
    fn unknown_keys_in_detector_output_are_ignored() {
        let f = write_json(
            r#"{
              "figures": [{
                "figType": "Figure", "name": "1", "page": 0, "caption": "c",
                "regionBoundary": {"x1": 0, "y1": 0, "x2": 1, "y2": 1},
                "captionBoundary": {"x1": 0, "y1": 0, "x2": 1, "y2": 1},
                "imageText": [], "renderURL": "fig1.png"
              }],
              "regionless-captions": []
            }"#,
        );
        assert_eq!(load_figures(f.path()).unwrap().len(), 1);
    }

    #[test]
    fn label_fallback() {
        assert_eq!(label_from_caption("Table 2: X"), Some("2".into()));
        assert_eq!(label_from_caption("Figure 10. Overview"), Some("10".into()));
        assert_eq!(label_from_caption("Table"), None);
        assert_eq!(label_from_caption(""), None);
    }
}
