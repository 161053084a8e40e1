//! Image codec backend trait and shared types.
//!
//! The geometry code never touches files. Decoding a path into a
//! [`RasterImage`] and encoding one back to JPEG go through [`ImageBackend`],
//! so the pipeline and the save retry logic can be tested with a mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::Quality;
use super::raster::RasterImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Read image dimensions from the file header.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode a file into RGB pixels.
    fn decode(&self, path: &Path) -> Result<RasterImage, BackendError>;

    /// Encode `image` as JPEG and write it to `path`.
    fn encode_jpeg(
        &self,
        image: &RasterImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock backend that serves canned images and records encode calls.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub images: Mutex<HashMap<PathBuf, RasterImage>>,
        /// Number of upcoming encode calls that fail; `usize::MAX` fails forever.
        pub encode_failures: Mutex<usize>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(PathBuf),
        Decode(PathBuf),
        Encode {
            path: PathBuf,
            width: u32,
            height: u32,
            quality: u8,
            ok: bool,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_image(self, path: impl Into<PathBuf>, image: RasterImage) -> Self {
            self.images.lock().unwrap().insert(path.into(), image);
            self
        }

        pub fn failing_encodes(self, count: usize) -> Self {
            *self.encode_failures.lock().unwrap() = count;
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Paths passed to `encode_jpeg`, in call order.
        pub fn encoded_paths(&self) -> Vec<PathBuf> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { path, .. } => Some(path),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_path_buf()));
            self.images
                .lock()
                .unwrap()
                .get(path)
                .map(|img| Dimensions {
                    width: img.width(),
                    height: img.height(),
                })
                .ok_or_else(|| BackendError::Decode(format!("no mock image for {}", path.display())))
        }

        fn decode(&self, path: &Path) -> Result<RasterImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_path_buf()));
            self.images
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| BackendError::Decode(format!("no mock image for {}", path.display())))
        }

        fn encode_jpeg(
            &self,
            image: &RasterImage,
            path: &Path,
            quality: Quality,
        ) -> Result<(), BackendError> {
            let ok = {
                let mut failures = self.encode_failures.lock().unwrap();
                if *failures == 0 {
                    true
                } else {
                    if *failures != usize::MAX {
                        *failures -= 1;
                    }
                    false
                }
            };
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
                ok,
            });
            if ok {
                Ok(())
            } else {
                Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock write refused",
                )))
            }
        }
    }

    #[test]
    fn mock_records_decode() {
        let img = RasterImage::filled(8, 6, crate::imaging::Color::WHITE);
        let backend = MockBackend::new().with_image("/in/a.jpg", img);

        let decoded = backend.decode(Path::new("/in/a.jpg")).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Decode("/in/a.jpg".into())]
        );
    }

    #[test]
    fn mock_decode_unknown_path_errors() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.decode(Path::new("/missing.png")),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn mock_fails_requested_number_of_encodes() {
        let img = RasterImage::filled(2, 2, crate::imaging::Color::BLACK);
        let backend = MockBackend::new().failing_encodes(1);

        assert!(backend.encode_jpeg(&img, Path::new("/a.jpg"), Quality::new(80)).is_err());
        assert!(backend.encode_jpeg(&img, Path::new("/b.jpg"), Quality::new(80)).is_ok());

        let ops = backend.get_operations();
        assert!(matches!(&ops[0], RecordedOp::Encode { ok: false, quality: 80, .. }));
        assert!(matches!(&ops[1], RecordedOp::Encode { ok: true, width: 2, .. }));
    }
}
