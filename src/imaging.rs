//! Image operations: identify and thumbnail.
//!
//! Pure Rust via the `image` crate — no external binaries, nothing to
//! install. The [`ImageOps`] trait is the seam: production code uses
//! [`RustImaging`], tests drive the ingest pipeline with a recording mock
//! and never decode a pixel.
//!
//! Thumbnails are resized to fill a configured aspect ratio (Lanczos3),
//! center-cropped, and encoded as JPEG. Originals are never modified; the
//! library keeps them byte-for-byte as ingested.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read image {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Cannot write image {path}: {reason}")]
    Encode { path: String, reason: String },
}

/// Pixel dimensions of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Thumbnail geometry and encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailSpec {
    /// Crop aspect ratio as (width, height), e.g. `(4, 5)` for portrait.
    pub aspect: (u32, u32),
    /// Pixel size of the shorter edge.
    pub short_edge: u32,
    /// JPEG quality, 0-100.
    pub quality: u8,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            aspect: (4, 5),
            short_edge: 400,
            quality: 85,
        }
    }
}

impl ThumbnailSpec {
    /// Output dimensions: the short edge at `short_edge` pixels, the long
    /// edge scaled by the aspect ratio.
    pub fn crop_box(&self) -> (u32, u32) {
        let (aw, ah) = self.aspect;
        if aw <= ah {
            (self.short_edge, self.short_edge * ah / aw)
        } else {
            (self.short_edge * aw / ah, self.short_edge)
        }
    }
}

/// The two operations ingest needs from an imaging implementation.
pub trait ImageOps: Sync {
    /// Read an image's pixel dimensions without decoding the full frame.
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError>;

    /// Write a center-cropped JPEG thumbnail of `source` to `output`.
    fn thumbnail(
        &self,
        source: &Path,
        output: &Path,
        spec: &ThumbnailSpec,
    ) -> Result<(), ImagingError>;
}

/// Production implementation on the `image` crate.
#[derive(Debug, Default)]
pub struct RustImaging;

impl ImageOps for RustImaging {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| ImagingError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(
        &self,
        source: &Path,
        output: &Path,
        spec: &ThumbnailSpec,
    ) -> Result<(), ImagingError> {
        let img = image::open(source).map_err(|e| ImagingError::Decode {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        let (width, height) = spec.crop_box();
        let thumb = img.resize_to_fill(width, height, image::imageops::FilterType::Lanczos3);

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, spec.quality);
        // JPEG has no alpha; flatten before encoding.
        thumb
            .to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| ImagingError::Encode {
                path: output.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
