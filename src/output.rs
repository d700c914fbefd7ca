//! Output types: per-record crop results, the enriched manifest, and
//! run statistics.

use crate::error::CropError;
use crate::figure::Figure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of cropping one figure record.
///
/// `error` is `Some` when the record could not be cropped; the batch still
/// carries results for every other record (partial-failure tolerant policy).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordResult {
    /// The record as loaded (never mutated by cropping).
    pub figure: Figure,
    /// Relative path of the region crop; `None` for regionless captions or
    /// on failure.
    pub fig_path: Option<PathBuf>,
    /// Relative path of the caption crop; `None` on failure.
    pub cap_path: Option<PathBuf>,
    /// The failure, if this record could not be cropped.
    pub error: Option<CropError>,
}

/// One manifest row: the full serialized figure record plus the relative
/// paths of its two crops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(flatten)]
    pub figure: Figure,
    pub fig_path: Option<String>,
    pub cap_path: Option<String>,
}

/// The enriched manifest written next to the crops.
///
/// Entry order matches the loader's record order: linked caption+region
/// entries first, then regionless captions, each group in detector output
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub figures: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build the manifest from per-record crop results, preserving order.
    pub fn from_results(results: &[RecordResult]) -> Self {
        let figures = results
            .iter()
            .map(|r| ManifestEntry {
                figure: r.figure.clone(),
                fig_path: r.fig_path.as_ref().map(|p| p.display().to_string()),
                cap_path: r.cap_path.as_ref().map(|p| p.display().to_string()),
            })
            .collect();
        Self { figures }
    }
}

/// Statistics for a completed extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Figure records loaded from the detector output.
    pub total_figures: usize,
    /// Records whose crops were all written.
    pub cropped: usize,
    /// Records that failed with a [`CropError`].
    pub failed: usize,
    /// Page images produced by the rasterizer (0 for prepared inputs).
    pub pages_rasterized: usize,
    /// Wall-clock duration of the rasterization stage.
    pub rasterize_duration_ms: u64,
    /// Wall-clock duration of the detection stage.
    pub detect_duration_ms: u64,
    /// Wall-clock duration of the cropping stage.
    pub crop_duration_ms: u64,
    /// Total wall-clock duration.
    pub total_duration_ms: u64,
}

/// Everything produced by a successful extraction run.
///
/// "Successful" here means the document-level stages completed; individual
/// records may still have failed (see `failures` and `stats.failed`).
#[derive(Debug)]
pub struct ExtractionOutput {
    /// The enriched manifest, in loader order.
    pub manifest: Manifest,
    /// Where the manifest JSON was written.
    pub manifest_path: PathBuf,
    /// Per-record results, in loader order.
    pub results: Vec<RecordResult>,
    /// All record-level failures, in loader order.
    pub failures: Vec<CropError>,
    /// Run statistics.
    pub stats: ExtractionStats,
}
