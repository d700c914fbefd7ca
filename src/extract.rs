//! Top-level extraction entry points.
//!
//! [`extract`] drives the full chain for one document: validate the PDF,
//! rasterize pages (pdftoppm), detect figures (pdffigures2), load the
//! records, crop, and write the enriched manifest. [`extract_prepared`]
//! starts from already-produced collaborator outputs — no subprocesses —
//! which is also the form the integration tests exercise.
//!
//! Everything here is synchronous and single-threaded: the stages are
//! sequential file reads and writes, and the per-record crop loop owns the
//! one result accumulator.

use crate::config::ExtractionConfig;
use crate::error::FigcropError;
use crate::output::{ExtractionOutput, ExtractionStats, Manifest};
use crate::pipeline::{crop, detect::FigureDetector, load, rasterize};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// File name of the enriched manifest inside the document output directory.
pub const MANIFEST_NAME: &str = "figures.json";

/// Extract, rescale, and crop every detected figure of a PDF.
///
/// Output lands under `<output_root>/<doc_id>/` as `pages/` (rasterized
/// pages), `figs/` and `caps/` (crops), and [`MANIFEST_NAME`].
///
/// # Errors
/// Returns `Err(FigcropError)` only for document-level failures (bad input,
/// external tool failure, malformed detector output). Per-record crop
/// failures are collected in the returned output instead — check
/// `output.failures` / `output.stats.failed`.
pub fn extract(
    pdf_path: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, FigcropError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    info!("Starting extraction: {}", pdf_path.display());

    validate_pdf(pdf_path)?;
    let doc_id = doc_id(pdf_path)?;
    let doc_dir = output_root.as_ref().join(&doc_id);
    make_layout(&doc_dir)?;

    let mut stats = ExtractionStats::default();

    let rasterize_start = Instant::now();
    stats.pages_rasterized =
        rasterize::rasterize(pdf_path, &doc_dir.join("pages"), &doc_id, config)?;
    stats.rasterize_duration_ms = rasterize_start.elapsed().as_millis() as u64;

    let home = config
        .detector_home
        .clone()
        .ok_or_else(|| {
            FigcropError::InvalidConfig(
                "detector_home is required to run the figure detector".into(),
            )
        })?;
    let detect_start = Instant::now();
    let detections = FigureDetector::new(home)?.run(pdf_path, &doc_dir, &doc_id)?;
    stats.detect_duration_ms = detect_start.elapsed().as_millis() as u64;

    let mut output = crop_and_write(&doc_id, &doc_dir, &detections, config, stats)?;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    log_completion(&output);
    Ok(output)
}

/// Extract from collaborator outputs that already exist on disk.
///
/// `doc_dir` must contain a `pages/` directory with images named
/// `<doc_id>-page-<NN>.<ext>`; `detections_json` is the raw detector output
/// (may be absent, meaning zero figures). `figs/`, `caps/`, and the manifest
/// are written into `doc_dir`.
pub fn extract_prepared(
    doc_id: &str,
    doc_dir: impl AsRef<Path>,
    detections_json: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, FigcropError> {
    let total_start = Instant::now();
    let doc_dir = doc_dir.as_ref();
    make_layout(doc_dir)?;

    let stats = ExtractionStats::default();
    let mut output = crop_and_write(doc_id, doc_dir, detections_json.as_ref(), config, stats)?;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    log_completion(&output);
    Ok(output)
}

/// Shared tail of both entry points: load → crop → manifest.
fn crop_and_write(
    doc_id: &str,
    doc_dir: &Path,
    detections_json: &Path,
    config: &ExtractionConfig,
    mut stats: ExtractionStats,
) -> Result<ExtractionOutput, FigcropError> {
    let figures = load::load_figures(detections_json)?;
    stats.total_figures = figures.len();

    let crop_start = Instant::now();
    let results = crop::crop_figures(doc_dir, doc_id, &figures, config);
    stats.crop_duration_ms = crop_start.elapsed().as_millis() as u64;
    stats.cropped = results.iter().filter(|r| r.error.is_none()).count();
    stats.failed = results.len() - stats.cropped;

    let manifest = Manifest::from_results(&results);
    let manifest_path = doc_dir.join(MANIFEST_NAME);
    write_manifest(&manifest_path, &manifest)?;

    let failures = results.iter().filter_map(|r| r.error.clone()).collect();
    Ok(ExtractionOutput {
        manifest,
        manifest_path,
        results,
        failures,
        stats,
    })
}

/// Write the manifest atomically: temp file in the same directory, then
/// rename, so readers never observe a partial file.
fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), FigcropError> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| FigcropError::Internal(format!("serialize manifest: {e}")))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| FigcropError::ManifestWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| FigcropError::ManifestWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote manifest {}", path.display());
    Ok(())
}

/// Create the per-document output layout `{pages,figs,caps}`.
fn make_layout(doc_dir: &Path) -> Result<(), FigcropError> {
    for sub in ["pages", "figs", "caps"] {
        let dir = doc_dir.join(sub);
        fs::create_dir_all(&dir).map_err(|source| FigcropError::OutputDirFailed {
            path: dir,
            source,
        })?;
    }
    Ok(())
}

/// Validate the PDF exists and starts with the `%PDF` magic bytes.
fn validate_pdf(path: &Path) -> Result<(), FigcropError> {
    if !path.exists() {
        return Err(FigcropError::PdfNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut f = fs::File::open(path).map_err(|_| FigcropError::PdfNotFound {
        path: path.to_path_buf(),
    })?;
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(FigcropError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Document id: the PDF's file stem, used in every derived file name.
fn doc_id(pdf_path: &Path) -> Result<String, FigcropError> {
    pdf_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            FigcropError::Internal(format!(
                "cannot derive a document id from '{}'",
                pdf_path.display()
            ))
        })
}

fn log_completion(output: &ExtractionOutput) {
    info!(
        "Extraction complete: {}/{} records cropped, {} failed, {}ms, manifest at {}",
        output.stats.cropped,
        output.stats.total_figures,
        output.stats.failed,
        output.stats.total_duration_ms,
        output.manifest_path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_the_file_stem() {
        assert_eq!(doc_id(Path::new("pdf_dir/2308.13418.pdf")).unwrap(), "2308.13418");
        assert_eq!(doc_id(Path::new("paper.pdf")).unwrap(), "paper");
    }

    #[test]
    fn validate_rejects_missing_and_non_pdf_files() {
        assert!(matches!(
            validate_pdf(Path::new("/nonexistent.pdf")),
            Err(FigcropError::PdfNotFound { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("fake.pdf");
        fs::write(&bogus, b"hello world").unwrap();
        assert!(matches!(
            validate_pdf(&bogus),
            Err(FigcropError::NotAPdf { .. })
        ));

        let real = dir.path().join("real.pdf");
        fs::write(&real, b"%PDF-1.5\n").unwrap();
        assert!(validate_pdf(&real).is_ok());
    }

    #[test]
    fn manifest_write_is_atomic_rename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_NAME);
        write_manifest(&path, &Manifest::default()).unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());
        let back: Manifest =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(back.figures.is_empty());
    }
}
