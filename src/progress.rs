//! Progress-callback trait for per-record cropping events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline crops each figure record.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log, or a database record
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a caller wrapping this
//! pipeline in a concurrent system can share one callback across pages.

use std::sync::Arc;

/// Called by the cropping pipeline as it processes each figure record.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline itself is single-threaded and invokes
/// these sequentially in record order.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any record is cropped.
    fn on_extraction_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called just before a record is cropped.
    ///
    /// `index` is 0-based position in the manifest order.
    fn on_record_start(&self, index: usize, total_records: usize) {
        let _ = (index, total_records);
    }

    /// Called when a record's crops were written successfully.
    fn on_record_complete(&self, index: usize, total_records: usize) {
        let _ = (index, total_records);
    }

    /// Called when a record fails to crop.
    fn on_record_error(&self, index: usize, total_records: usize, error: &str) {
        let _ = (index, total_records, error);
    }

    /// Called once after all records have been attempted.
    fn on_extraction_complete(&self, total_records: usize, cropped: usize) {
        let _ = (total_records, cropped);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
