//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three operations that touch storage:
//! identify, load, and save. All pixel work happens in memory on
//! [`DynamicImage`]s, so the composition steps can run against a mock that
//! never reads or writes a file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::params::Quality;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image storage backends.
pub trait ImageBackend {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image from disk.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode an image to disk, choosing the format from the extension.
    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality)
    -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Mock backend that serves in-memory images and records saves.
    #[derive(Default)]
    pub struct MockBackend {
        pub images: RefCell<HashMap<PathBuf, DynamicImage>>,
        pub operations: RefCell<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Load(String),
        Save {
            path: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `image` for loads and identifies of `path`.
        pub fn with_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
            let backend = Self::new();
            backend.images.borrow_mut().insert(path.into(), image);
            backend
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.borrow().clone()
        }

        /// Paths passed to `save`, in call order.
        pub fn saved_paths(&self) -> Vec<String> {
            self.operations
                .borrow()
                .iter()
                .filter_map(|op| match op {
                    RecordedOp::Save { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect()
        }

        fn lookup(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.images.borrow().get(path).cloned().ok_or_else(|| {
                BackendError::ProcessingFailed(format!("No mock image for {}", path.display()))
            })
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .borrow_mut()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            let image = self.lookup(path)?;
            Ok(Dimensions {
                width: image.width(),
                height: image.height(),
            })
        }

        fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .borrow_mut()
                .push(RecordedOp::Load(path.to_string_lossy().to_string()));
            self.lookup(path)
        }

        fn save(
            &self,
            image: &DynamicImage,
            path: &Path,
            quality: Quality,
        ) -> Result<(), BackendError> {
            self.operations.borrow_mut().push(RecordedOp::Save {
                path: path.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });
            // Saved outputs become loadable, like files on disk
            self.images
                .borrow_mut()
                .insert(path.to_path_buf(), image.clone());
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend =
            MockBackend::with_image("/test/image.jpg", DynamicImage::new_rgb8(800, 600));

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_load_missing_errors() {
        let backend = MockBackend::new();
        let result = backend.load(Path::new("/nope.png"));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn mock_records_save_and_serves_it_back() {
        let backend = MockBackend::new();

        backend
            .save(
                &DynamicImage::new_rgb8(64, 36),
                Path::new("/out/a_cropped.jpg"),
                Quality::new(95),
            )
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(
            ops[0],
            RecordedOp::Save {
                path: "/out/a_cropped.jpg".into(),
                width: 64,
                height: 36,
                quality: 95,
            }
        );
        let reloaded = backend.load(Path::new("/out/a_cropped.jpg")).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (64, 36));
    }
}
