//! Image processing backend trait and shared types.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! recording `MockBackend` from this module's test submodule.

use super::params::ThumbnailParams;
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

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions without decoding the pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute a thumbnail operation (resize to fill + center crop).
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::{Quality, Sharpening};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        /// When set, `thumbnail` fails for sources whose path ends with it.
        pub fail_on: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Thumbnail {
            source: String,
            output: String,
            crop_width: u32,
            crop_height: u32,
            quality: u32,
            sharpening: Option<(f32, i32)>,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_on(suffix: &str) -> Self {
            Self {
                fail_on: Some(suffix.to_string()),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn thumbnail_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Thumbnail { .. }))
                .count()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
            let source = params.source.to_string_lossy().to_string();
            if let Some(suffix) = &self.fail_on
                && source.ends_with(suffix.as_str())
            {
                return Err(BackendError::ProcessingFailed(format!(
                    "Failed to decode {source}"
                )));
            }
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source,
                output: params.output.to_string_lossy().to_string(),
                crop_width: params.crop_width,
                crop_height: params.crop_height,
                quality: params.quality.value(),
                sharpening: params.sharpening.map(|s| (s.sigma, s.threshold)),
            });
            // Echo the source bytes so tests can tell thumbnails apart
            let bytes =
                std::fs::read(&params.source).unwrap_or_else(|_| b"mock thumbnail".to_vec());
            std::fs::write(&params.output, bytes)?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_records_thumbnail_with_sharpening() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new();

        backend
            .thumbnail(&ThumbnailParams {
                source: "/source.jpg".into(),
                output: tmp.path().join("thumb.jpg"),
                crop_width: 300,
                crop_height: 300,
                quality: Quality::new(67),
                sharpening: Some(Sharpening::light()),
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail {
                crop_width: 300,
                crop_height: 300,
                quality: 67,
                sharpening: Some((0.5, 0)),
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_matching_source() {
        let backend = MockBackend::failing_on("broken.jpg");
        let result = backend.thumbnail(&ThumbnailParams {
            source: "/in/broken.jpg".into(),
            output: "/out/broken.jpg".into(),
            crop_width: 10,
            crop_height: 10,
            quality: Quality::default(),
            sharpening: None,
        });
        assert!(result.is_err());
        assert_eq!(backend.thumbnail_count(), 0);
    }
}
