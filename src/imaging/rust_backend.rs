//! Pure Rust codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image::ImageReader` → `to_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use super::raster::RasterImage;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extensions accepted as input, lowercase.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Returns the set of image file extensions the resizer accepts.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// True when `path` has a supported extension (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| e.eq_ignore_ascii_case(s))
        })
}

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::Decode(format!("Failed to read dimensions of {}: {}", path.display(), e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<RasterImage, BackendError> {
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e)))?;
        Ok(RasterImage::from_rgb(img.to_rgb8()))
    }

    fn encode_jpeg(
        &self,
        image: &RasterImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        let (width, height) = image.dimensions();

        let encoded = JpegEncoder::new_with_quality(&mut writer, quality.value())
            .write_image(image.as_rgb().as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)));
        let encoded = encoded.and_then(|()| writer.flush().map_err(BackendError::Io));

        if encoded.is_err() {
            // No partial output on failure
            drop(writer);
            let _ = std::fs::remove_file(path);
        }
        encoded
    }
}
