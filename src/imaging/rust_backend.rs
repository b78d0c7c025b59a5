//! Pure Rust storage backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode → PNG, TIFF, WebP | `DynamicImage::save_with_format` (lossless) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
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

/// Map an output extension onto an encoder the build has compiled in.
fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "tif" | "tiff" => Ok(ImageFormat::Tiff),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            other
        ))),
    }
}

/// JPEG has no alpha channel; flatten before encoding.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        match output_format(path)? {
            ImageFormat::Jpeg => save_jpeg(image, path, quality),
            format => image.save_with_format(path, format).map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to encode {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, create_test_png, gradient};

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn load_png_fixture() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fixture.png");
        create_test_png(&path, 64, 36);

        let backend = RustBackend::new();
        assert_eq!(backend.identify(&path).unwrap().as_tuple(), (64, 36));
        let loaded = backend.load(&path).unwrap();
        assert_eq!(loaded.to_rgb8(), gradient(64, 36).to_rgb8());
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn load_nonexistent_file_is_io_error() {
        let backend = RustBackend::new();
        let result = backend.load(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn save_png_then_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");

        let backend = RustBackend::new();
        backend
            .save(&gradient(96, 54), &path, Quality::default())
            .unwrap();

        let loaded = backend.load(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (96, 54));
        // PNG is lossless
        assert_eq!(loaded.to_rgb8(), gradient(96, 54).to_rgb8());
    }

    #[test]
    fn save_jpeg_flattens_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        let rgba = DynamicImage::ImageRgba8(gradient(40, 30).to_rgba8());

        let backend = RustBackend::new();
        backend.save(&rgba, &path, Quality::new(90)).unwrap();

        assert!(path.exists());
        assert_eq!(backend.identify(&path).unwrap().as_tuple(), (40, 30));
    }

    #[test]
    fn save_unsupported_format_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.avif");

        let backend = RustBackend::new();
        let result = backend.save(&gradient(10, 10), &path, Quality::default());
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!path.exists());
    }

    #[test]
    fn output_format_is_case_insensitive() {
        assert_eq!(
            output_format(Path::new("a.JPG")).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            output_format(Path::new("a.Tiff")).unwrap(),
            ImageFormat::Tiff
        );
    }
}
