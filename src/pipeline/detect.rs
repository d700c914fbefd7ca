//! Figure detection: run the external pdffigures2 tool against a PDF.
//!
//! pdffigures2 is a Scala tool; its install location is an explicit
//! configuration value resolved once by the surrounding orchestrator (the
//! CLI reads `PDFFIGURES2_HOME` a single time at startup) and handed to
//! [`FigureDetector::new`] — never read from the environment mid-pipeline.
//! The detector writes one JSON file per document; [`super::load`] parses it.

use crate::error::FigcropError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Handle on a validated pdffigures2 installation.
#[derive(Debug)]
pub struct FigureDetector {
    home: PathBuf,
    jar: PathBuf,
}

impl FigureDetector {
    /// Validate `home` and locate the assembly jar under it.
    ///
    /// Looks in `home` itself and in `home/target/scala-*/` (where sbt
    /// places `pdffigures2-assembly-*.jar`).
    pub fn new(home: impl Into<PathBuf>) -> Result<Self, FigcropError> {
        let home = home.into();
        if !home.is_dir() {
            return Err(FigcropError::DetectorHomeInvalid {
                home,
                detail: "not a directory".into(),
            });
        }
        let jar = find_assembly_jar(&home).ok_or_else(|| FigcropError::DetectorHomeInvalid {
            home: home.clone(),
            detail: "no pdffigures2*.jar found (run `sbt assembly` in the pdffigures2 checkout)"
                .into(),
        })?;
        debug!("Using detector jar {}", jar.display());
        Ok(Self { home, jar })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Run the detector on `pdf_path`, writing its JSON into `out_dir`.
    ///
    /// Returns the path of the JSON file the detector wrote (named after the
    /// document). The file may legitimately not exist afterwards when the
    /// detector found nothing; the loader treats that as zero figures.
    pub fn run(&self, pdf_path: &Path, out_dir: &Path, doc_id: &str) -> Result<PathBuf, FigcropError> {
        fs::create_dir_all(out_dir).map_err(|source| FigcropError::OutputDirFailed {
            path: out_dir.to_path_buf(),
            source,
        })?;

        // pdffigures2 treats -d as a filename prefix, so the trailing
        // separator is required to land inside out_dir.
        let data_prefix = format!("{}/", out_dir.display());

        info!("Running pdffigures2 on {}", pdf_path.display());
        let output = Command::new("java")
            .arg("-jar")
            .arg(&self.jar)
            .arg(pdf_path)
            .arg("-d")
            .arg(&data_prefix)
            .arg("-q")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FigcropError::ToolNotFound {
                        tool: "java".into(),
                        hint: "pdffigures2 needs a Java runtime (JRE 8+) on the PATH.".into(),
                    }
                } else {
                    FigcropError::Internal(format!("failed to spawn java: {e}"))
                }
            })?;

        if !output.status.success() {
            return Err(FigcropError::DetectorFailed {
                path: pdf_path.to_path_buf(),
                status: output.status.code().unwrap_or(-1),
            });
        }

        let json_path = out_dir.join(format!("{doc_id}.json"));
        if !json_path.is_file() {
            warn!(
                "Detector finished but wrote no output for {}; assuming zero figures",
                pdf_path.display()
            );
        }
        Ok(json_path)
    }
}

/// Search `home` and `home/target/scala-*/` for a pdffigures2 jar.
fn find_assembly_jar(home: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = vec![home.to_path_buf()];
    if let Ok(target) = fs::read_dir(home.join("target")) {
        for entry in target.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir()
                && path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with("scala-"))
                    .unwrap_or(false)
            {
                candidates.push(path);
            }
        }
    }
    for dir in candidates {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("pdffigures2") && name.ends_with(".jar") {
                return Some(entry.path());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_home_is_rejected() {
        let err = FigureDetector::new("/nonexistent/pdffigures2").unwrap_err();
        assert!(matches!(err, FigcropError::DetectorHomeInvalid { .. }));
    }

    #[test]
    fn home_without_jar_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = FigureDetector::new(dir.path()).unwrap_err();
        assert!(matches!(err, FigcropError::DetectorHomeInvalid { .. }));
    }

    #[test]
    fn finds_jar_in_home_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pdffigures2-assembly-0.1.0.jar"), b"x").unwrap();
        let det = FigureDetector::new(dir.path()).unwrap();
        assert_eq!(det.home(), dir.path());
    }

    #[test]
    fn finds_jar_under_sbt_target() {
        let dir = tempfile::tempdir().unwrap();
        let scala = dir.path().join("target").join("scala-2.12");
        fs::create_dir_all(&scala).unwrap();
        fs::write(scala.join("pdffigures2-assembly-0.1.0.jar"), b"x").unwrap();
        assert!(FigureDetector::new(dir.path()).is_ok());
    }
}
