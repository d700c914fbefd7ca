//! # figcrop
//!
//! Extract, rescale, and crop figure/table regions from PDF documents.
//!
//! ## Why this crate?
//!
//! OCR pipelines that transcribe PDF pages need the figures and tables as
//! separate image files, keyed back to their captions, so the transcribed
//! text can be re-linked to the right pictures. The detector (pdffigures2)
//! reports bounding boxes in the PDF text layer's 72-DPI space, while pages
//! are rasterized at a much higher DPI for legibility — this crate bridges
//! the two: it normalizes the detector's output into validated figure
//! records, rescales every box into the raster's pixel space, cuts the crops,
//! and writes an enriched manifest tying records to crop files.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Rasterize  pdftoppm renders each page to pages/<doc>-page-NN.jpg
//!  ├─ 2. Detect     pdffigures2 emits raw JSON (figures + regionless captions)
//!  ├─ 3. Load       normalize both JSON shapes into validated Figure records
//!  ├─ 4. Scale      72-DPI detector boxes → raster-DPI pixel boxes
//!  ├─ 5. Crop       region → figs/, caption → caps/ (per-record failures collected)
//!  └─ 6. Manifest   figures.json: every record + fig_path/cap_path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use figcrop::{extract, ExtractionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .detector_home("/opt/pdffigures2")
//!         .build()?;
//!     let output = extract("paper.pdf", "output", &config)?;
//!     println!("{} figures cropped, manifest at {}",
//!         output.stats.cropped,
//!         output.manifest_path.display());
//!     for failure in &output.failures {
//!         eprintln!("skipped: {failure}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Already ran the rasterizer and detector yourself? Use
//! [`extract_prepared`] to crop from their outputs without spawning any
//! subprocess.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `figcrop` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! figcrop = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod figure;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageImageFormat, COLOR_IMAGE_DPI};
pub use error::{CropError, FigcropError};
pub use extract::{extract, extract_prepared, MANIFEST_NAME};
pub use figure::{BoundBox, Figure, FigureKey, FigureKind, DETECTION_DPI};
pub use output::{ExtractionOutput, ExtractionStats, Manifest, ManifestEntry, RecordResult};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
