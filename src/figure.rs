//! The figure record model: one detected figure or table on one PDF page.
//!
//! [`Figure`] is a validated value type. Every construction path — the
//! builder, serde deserialization — runs the same invariant checks, so a
//! `Figure` that exists is a `Figure` that is well-formed:
//!
//! * `page` is 1-indexed and strictly positive
//! * `page_width`/`page_height` are both present or both absent, and positive
//! * any bounding box implies `detection_dpi` is present (a box without a
//!   coordinate-space reference is meaningless)
//! * `name` is non-empty
//!
//! Records are read-only after construction: rescaling and other transforms
//! produce new box values (see [`crate::pipeline::scale`]) rather than
//! mutating the record in place.

use crate::error::FigcropError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resolution at which the external detector computes its bounding boxes.
///
/// pdffigures2 works in the PDF text layer's native 72-DPI coordinate space
/// regardless of the document's physical dimensions.
pub const DETECTION_DPI: f64 = 72.0;

/// Closed two-variant figure-type tag with stable external string form.
///
/// The external serialization is exactly `"Figure"` or `"Table"`; any other
/// string is rejected at the boundary with
/// [`FigcropError::InvalidFigureType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureKind {
    Figure,
    Table,
}

impl fmt::Display for FigureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FigureKind::Figure => f.write_str("Figure"),
            FigureKind::Table => f.write_str("Table"),
        }
    }
}

impl FromStr for FigureKind {
    type Err = FigcropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Figure" => Ok(FigureKind::Figure),
            "Table" => Ok(FigureKind::Table),
            other => Err(FigcropError::InvalidFigureType {
                value: other.to_string(),
            }),
        }
    }
}

/// Axis-aligned bounding rectangle `(x1, y1, x2, y2)`.
///
/// Coordinates are in the pixel space of whatever DPI the owning record's
/// `detection_dpi` names. Serialized as a flat 4-element array, matching the
/// manifest format consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Multiply every coordinate by `ratio`. Returns a new box.
    pub fn scale(&self, ratio: f64) -> Self {
        Self {
            x1: self.x1 * ratio,
            y1: self.y1 * ratio,
            x2: self.x2 * ratio,
            y2: self.y2 * ratio,
        }
    }

    /// Grow the box outward by `margin` units on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x1: self.x1 - margin,
            y1: self.y1 - margin,
            x2: self.x2 + margin,
            y2: self.y2 + margin,
        }
    }

    /// Clamp the box into an `img_w` × `img_h` image and convert to an
    /// `(x, y, width, height)` integer crop rectangle.
    ///
    /// Returns `None` when the clamped box is degenerate, i.e. it lies
    /// entirely outside the image or has no area.
    pub fn to_pixel_rect(&self, img_w: u32, img_h: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.max(0.0);
        let y1 = self.y1.max(0.0);
        let x2 = self.x2.min(img_w as f64);
        let y2 = self.y2.min(img_h as f64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        let x = x1.floor() as u32;
        let y = y1.floor() as u32;
        let w = ((x2.ceil() as u32).min(img_w) - x).max(1);
        let h = ((y2.ceil() as u32).min(img_h) - y).max(1);
        Some((x, y, w, h))
    }
}

impl From<[f64; 4]> for BoundBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundBox> for [f64; 4] {
    fn from(b: BoundBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Natural key of a figure record: `(kind, name, page)`.
///
/// Used for deduplication and lookup across a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FigureKey {
    pub kind: FigureKind,
    pub name: String,
    pub page: u32,
}

/// One detected figure or table and its geometry.
///
/// Constructed only through [`Figure::builder`], which validates every
/// invariant, or through serde (which routes through the same validation).
/// Field-wise value equality via `PartialEq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFigure")]
pub struct Figure {
    kind: FigureKind,
    name: String,
    page: u32,
    detection_dpi: Option<f64>,
    caption: Option<String>,
    page_width: Option<f64>,
    page_height: Option<f64>,
    caption_box: Option<BoundBox>,
    region_box: Option<BoundBox>,
}

impl Figure {
    /// Start building a record from its mandatory fields.
    pub fn builder(kind: FigureKind, name: impl Into<String>, page: u32) -> FigureBuilder {
        FigureBuilder {
            figure: Figure {
                kind,
                name: name.into(),
                page,
                detection_dpi: None,
                caption: None,
                page_width: None,
                page_height: None,
                caption_box: None,
                region_box: None,
            },
        }
    }

    pub fn kind(&self) -> FigureKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-indexed page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// DPI the bounding boxes were computed at; present whenever any box is.
    pub fn detection_dpi(&self) -> Option<f64> {
        self.detection_dpi
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn page_width(&self) -> Option<f64> {
        self.page_width
    }

    pub fn page_height(&self) -> Option<f64> {
        self.page_height
    }

    pub fn caption_box(&self) -> Option<BoundBox> {
        self.caption_box
    }

    /// Figure/table body box; absent for regionless captions.
    pub fn region_box(&self) -> Option<BoundBox> {
        self.region_box
    }

    /// The record's natural key `(kind, name, page)`.
    pub fn key(&self) -> FigureKey {
        FigureKey {
            kind: self.kind,
            name: self.name.clone(),
            page: self.page,
        }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} (page {})", self.kind, self.name, self.page)
    }
}

/// Builder for [`Figure`] with validation in [`FigureBuilder::build`].
#[derive(Debug)]
pub struct FigureBuilder {
    figure: Figure,
}

impl FigureBuilder {
    pub fn detection_dpi(mut self, dpi: f64) -> Self {
        self.figure.detection_dpi = Some(dpi);
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.figure.caption = Some(caption.into());
        self
    }

    pub fn page_size(mut self, width: f64, height: f64) -> Self {
        self.figure.page_width = Some(width);
        self.figure.page_height = Some(height);
        self
    }

    pub fn page_width(mut self, width: f64) -> Self {
        self.figure.page_width = Some(width);
        self
    }

    pub fn page_height(mut self, height: f64) -> Self {
        self.figure.page_height = Some(height);
        self
    }

    pub fn caption_box(mut self, b: BoundBox) -> Self {
        self.figure.caption_box = Some(b);
        self
    }

    pub fn region_box(mut self, b: BoundBox) -> Self {
        self.figure.region_box = Some(b);
        self
    }

    /// Validate every data-model invariant and produce the record.
    pub fn build(self) -> Result<Figure, FigcropError> {
        let f = &self.figure;
        if f.name.is_empty() {
            return Err(FigcropError::InvalidRecord {
                detail: "figure name must be non-empty".into(),
            });
        }
        if f.page == 0 {
            return Err(FigcropError::InvalidRecord {
                detail: "page number must be >= 1 (pages are 1-indexed)".into(),
            });
        }
        if f.page_width.is_some() != f.page_height.is_some() {
            return Err(FigcropError::InvalidRecord {
                detail: format!(
                    "page_width and page_height must be set together (width={:?}, height={:?})",
                    f.page_width, f.page_height
                ),
            });
        }
        if let Some(w) = f.page_width {
            if w <= 0.0 {
                return Err(FigcropError::InvalidRecord {
                    detail: format!("page_width must be positive, got {w}"),
                });
            }
        }
        if let Some(h) = f.page_height {
            if h <= 0.0 {
                return Err(FigcropError::InvalidRecord {
                    detail: format!("page_height must be positive, got {h}"),
                });
            }
        }
        if (f.caption_box.is_some() || f.region_box.is_some()) && f.detection_dpi.is_none() {
            return Err(FigcropError::InvalidRecord {
                detail: "a bounding box requires detection_dpi to name its coordinate space"
                    .into(),
            });
        }
        if let Some(dpi) = f.detection_dpi {
            if dpi <= 0.0 {
                return Err(FigcropError::InvalidRecord {
                    detail: format!("detection_dpi must be positive, got {dpi}"),
                });
            }
        }
        Ok(self.figure)
    }
}

/// Unvalidated wire shape; serde routes deserialization through
/// `TryFrom<RawFigure>` so invariant checks also run on loaded data.
#[derive(Deserialize)]
struct RawFigure {
    kind: FigureKind,
    name: String,
    page: u32,
    #[serde(default)]
    detection_dpi: Option<f64>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    page_width: Option<f64>,
    #[serde(default)]
    page_height: Option<f64>,
    #[serde(default)]
    caption_box: Option<BoundBox>,
    #[serde(default)]
    region_box: Option<BoundBox>,
}

impl TryFrom<RawFigure> for Figure {
    type Error = FigcropError;

    fn try_from(raw: RawFigure) -> Result<Self, Self::Error> {
        let mut b = Figure::builder(raw.kind, raw.name, raw.page);
        if let Some(dpi) = raw.detection_dpi {
            b = b.detection_dpi(dpi);
        }
        if let Some(c) = raw.caption {
            b = b.caption(c);
        }
        if let Some(w) = raw.page_width {
            b = b.page_width(w);
        }
        if let Some(h) = raw.page_height {
            b = b.page_height(h);
        }
        if let Some(cb) = raw.caption_box {
            b = b.caption_box(cb);
        }
        if let Some(rb) = raw.region_box {
            b = b.region_box(rb);
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Figure {
        Figure::builder(FigureKind::Figure, "1", 3)
            .detection_dpi(DETECTION_DPI)
            .caption("Figure 1: results")
            .page_size(612.0, 792.0)
            .caption_box(BoundBox::new(10.0, 60.0, 50.0, 70.0))
            .region_box(BoundBox::new(10.0, 10.0, 50.0, 50.0))
            .build()
            .unwrap()
    }

    #[test]
    fn kind_string_round_trip() {
        assert_eq!("Figure".parse::<FigureKind>().unwrap(), FigureKind::Figure);
        assert_eq!("Table".parse::<FigureKind>().unwrap(), FigureKind::Table);
        assert_eq!(FigureKind::Figure.to_string(), "Figure");
        assert_eq!(FigureKind::Table.to_string(), "Table");
    }

    #[test]
    fn kind_rejects_unknown_string() {
        let err = "figure".parse::<FigureKind>().unwrap_err();
        assert!(matches!(err, FigcropError::InvalidFigureType { .. }));
    }

    #[test]
    fn width_without_height_rejected() {
        let err = Figure::builder(FigureKind::Table, "2", 1)
            .page_width(612.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, FigcropError::InvalidRecord { .. }));
    }

    #[test]
    fn non_positive_dimensions_rejected() {
        assert!(Figure::builder(FigureKind::Figure, "1", 1)
            .page_size(0.0, 100.0)
            .build()
            .is_err());
        assert!(Figure::builder(FigureKind::Figure, "1", 1)
            .page_size(100.0, -1.0)
            .build()
            .is_err());
    }

    #[test]
    fn box_without_dpi_rejected() {
        let err = Figure::builder(FigureKind::Figure, "1", 1)
            .region_box(BoundBox::new(0.0, 0.0, 10.0, 10.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, FigcropError::InvalidRecord { .. }));
    }

    #[test]
    fn zero_page_rejected() {
        assert!(Figure::builder(FigureKind::Figure, "1", 0).build().is_err());
    }

    #[test]
    fn empty_name_rejected() {
        assert!(Figure::builder(FigureKind::Figure, "", 1).build().is_err());
    }

    #[test]
    fn value_equality() {
        assert_eq!(sample(), sample());
        let other = Figure::builder(FigureKind::Figure, "1", 4)
            .detection_dpi(DETECTION_DPI)
            .build()
            .unwrap();
        assert_ne!(sample(), other);
    }

    #[test]
    fn natural_key() {
        let key = sample().key();
        assert_eq!(
            key,
            FigureKey {
                kind: FigureKind::Figure,
                name: "1".into(),
                page: 3
            }
        );
    }

    #[test]
    fn serde_round_trip_preserves_equality() {
        let fig = sample();
        let json = serde_json::to_string(&fig).unwrap();
        let back: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(fig, back);
    }

    #[test]
    fn serde_kind_uses_canonical_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "Figure");
        assert_eq!(json["caption_box"], serde_json::json!([10.0, 60.0, 50.0, 70.0]));
    }

    #[test]
    fn deserialize_rejects_invariant_violations() {
        // Box present but no detection_dpi.
        let json = r#"{"kind":"Figure","name":"1","page":1,"region_box":[0,0,5,5]}"#;
        assert!(serde_json::from_str::<Figure>(json).is_err());
        // Width without height.
        let json = r#"{"kind":"Table","name":"2","page":1,"page_width":612.0}"#;
        assert!(serde_json::from_str::<Figure>(json).is_err());
    }

    #[test]
    fn bound_box_scale_and_expand() {
        let b = BoundBox::new(10.0, 10.0, 50.0, 50.0);
        let s = b.scale(2.0);
        assert_eq!(s, BoundBox::new(20.0, 20.0, 100.0, 100.0));
        let e = b.expand(3.0);
        assert_eq!(e, BoundBox::new(7.0, 7.0, 53.0, 53.0));
        // original untouched
        assert_eq!(b, BoundBox::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn pixel_rect_clamps_into_image() {
        let b = BoundBox::new(-3.0, -3.0, 23.0, 8.0);
        assert_eq!(b.to_pixel_rect(100, 100), Some((0, 0, 23, 8)));
        // Entirely outside.
        let off = BoundBox::new(200.0, 200.0, 300.0, 300.0);
        assert_eq!(off.to_pixel_rect(100, 100), None);
        // Degenerate.
        let flat = BoundBox::new(10.0, 10.0, 10.0, 40.0);
        assert_eq!(flat.to_pixel_rect(100, 100), None);
    }
}
