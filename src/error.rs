//! Error types for the figcrop library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FigcropError`] — **Fatal**: the extraction cannot proceed at all
//!   (bad input file, malformed detector output, invariant-violating record,
//!   missing external tool). Returned as `Err(FigcropError)` from the
//!   top-level `extract*` functions.
//!
//! * [`CropError`] — **Non-fatal**: a single figure record failed to crop
//!   (page image missing, box outside the page) but all other records are
//!   fine. Stored inside [`crate::output::RecordResult`] so callers can
//!   inspect partial success rather than losing the whole document to one
//!   bad record.
//!
//! The separation lets callers decide their own tolerance: abort when any
//! record fails, log and continue, or collect all failures for a post-run
//! report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the figcrop library.
///
/// Record-level cropping failures use [`CropError`] and are stored in
/// [`crate::output::RecordResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FigcropError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input PDF was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    PdfNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Detector output errors ────────────────────────────────────────────
    /// Detector JSON carried a figure-type tag outside the closed
    /// Figure/Table set. Never recovered from or guessed around.
    #[error("'{value}' is not a valid figure type (expected \"Figure\" or \"Table\")")]
    InvalidFigureType { value: String },

    /// A figure record violated a data-model invariant at construction.
    #[error("Invalid figure record: {detail}")]
    InvalidRecord { detail: String },

    /// Detector output file existed but could not be parsed as JSON.
    #[error("Failed to parse detector output '{path}': {source}")]
    DetectorJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── External tool errors ──────────────────────────────────────────────
    /// A required external executable is not on the PATH.
    #[error("Required executable '{tool}' was not found on the PATH.\n{hint}")]
    ToolNotFound { tool: String, hint: String },

    /// pdftoppm exited with a non-zero status.
    #[error("Rasterizer failed for '{path}' (exit status {status}): {detail}")]
    RasterizerFailed {
        path: PathBuf,
        status: i32,
        detail: String,
    },

    /// The pdffigures2 install directory is missing or carries no assembly jar.
    #[error("Figure detector home '{home}' is not usable: {detail}\nSet PDFFIGURES2_HOME or pass --detector-home.")]
    DetectorHomeInvalid { home: PathBuf, detail: String },

    /// pdffigures2 exited with a non-zero status.
    #[error("Figure detector failed for '{path}' (exit status {status})")]
    DetectorFailed { path: PathBuf, status: i32 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the enriched manifest file.
    #[error("Failed to write manifest '{path}': {source}")]
    ManifestWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create an output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single figure record.
///
/// Stored alongside [`crate::output::RecordResult`] when a record fails to
/// crop. The overall extraction continues across the remaining records and
/// failures are surfaced in aggregate afterwards.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum CropError {
    /// The rasterized page image a record refers to is absent.
    #[error("Page {page}: page image not found at '{path}'")]
    MissingPageImage { page: u32, path: PathBuf },

    /// Page number exceeds the two-digit page-image naming scheme.
    ///
    /// Raised explicitly instead of silently probing a wrong filename.
    #[error("Page {page}: exceeds the two-digit page-image naming scheme (max 99)")]
    PageNumberOverflow { page: u32 },

    /// A rescaled box lies entirely outside the page image.
    #[error("Page {page}: {which} box of figure '{name}' is outside the page image")]
    BoxOutsidePage {
        page: u32,
        name: String,
        which: String,
    },

    /// The page image exists but could not be decoded.
    #[error("Page {page}: failed to decode page image: {detail}")]
    ImageRead { page: u32, detail: String },

    /// A crop could not be encoded or written to disk.
    #[error("Failed to write crop '{path}': {detail}")]
    ImageWrite { path: PathBuf, detail: String },
}
