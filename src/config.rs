//! Configuration types for figure extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: explicit detector home
//! The pdffigures2 install location is a configuration value resolved once by
//! the caller (the CLI reads `PDFFIGURES2_HOME` a single time at startup) and
//! passed in here — never read ad hoc from the environment mid-pipeline.

use crate::error::FigcropError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default DPI at which pages are rasterized for cropping.
///
/// 300 DPI keeps small caption text legible in the crops while staying within
/// sensible file sizes for letter/A4 pages.
pub const COLOR_IMAGE_DPI: u32 = 300;

/// File format of the rasterized page images and the crops cut from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageImageFormat {
    /// JPEG (default). Matches pdftoppm's `-jpeg` output; smaller pages.
    #[default]
    Jpeg,
    /// PNG. Lossless; prefer it when crops feed further pixel analysis.
    Png,
}

impl PageImageFormat {
    /// File extension without the leading dot.
    pub fn ext(&self) -> &'static str {
        match self {
            PageImageFormat::Jpeg => "jpg",
            PageImageFormat::Png => "png",
        }
    }

    /// The pdftoppm flag selecting this format.
    pub fn pdftoppm_flag(&self) -> &'static str {
        match self {
            PageImageFormat::Jpeg => "-jpeg",
            PageImageFormat::Png => "-png",
        }
    }
}

/// Configuration for a figure extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use figcrop::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .raster_dpi(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// DPI used when rasterizing PDF pages for cropping. Range: 72–600.
    /// Default: [`COLOR_IMAGE_DPI`] (300).
    ///
    /// The detector always reports boxes at 72 DPI; crops happen in this
    /// resolution's pixel space after rescaling. Higher values give sharper
    /// crops at the cost of disk space and rasterization time.
    pub raster_dpi: u32,

    /// Format of page images and crops. Default: JPEG.
    pub image_format: PageImageFormat,

    /// pdffigures2 install directory.
    ///
    /// Required by [`crate::extract::extract`] (which shells out to the
    /// detector); ignored by [`crate::extract::extract_prepared`], which
    /// consumes an already-produced detections file.
    pub detector_home: Option<PathBuf>,

    /// Per-record progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            raster_dpi: COLOR_IMAGE_DPI,
            image_format: PageImageFormat::default(),
            detector_home: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("raster_dpi", &self.raster_dpi)
            .field("image_format", &self.image_format)
            .field("detector_home", &self.detector_home)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn raster_dpi(mut self, dpi: u32) -> Self {
        self.config.raster_dpi = dpi;
        self
    }

    pub fn image_format(mut self, format: PageImageFormat) -> Self {
        self.config.image_format = format;
        self
    }

    pub fn detector_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.config.detector_home = Some(home.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, FigcropError> {
        let c = &self.config;
        if c.raster_dpi < 72 || c.raster_dpi > 600 {
            return Err(FigcropError::InvalidConfig(format!(
                "raster DPI must be 72–600, got {}",
                c.raster_dpi
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = ExtractionConfig::default();
        assert_eq!(c.raster_dpi, 300);
        assert_eq!(c.image_format, PageImageFormat::Jpeg);
        assert!(c.detector_home.is_none());
    }

    #[test]
    fn builder_rejects_out_of_range_dpi() {
        assert!(ExtractionConfig::builder().raster_dpi(50).build().is_err());
        assert!(ExtractionConfig::builder().raster_dpi(601).build().is_err());
        assert!(ExtractionConfig::builder().raster_dpi(72).build().is_ok());
    }

    #[test]
    fn format_extensions() {
        assert_eq!(PageImageFormat::Jpeg.ext(), "jpg");
        assert_eq!(PageImageFormat::Png.ext(), "png");
        assert_eq!(PageImageFormat::Jpeg.pdftoppm_flag(), "-jpeg");
    }
}
