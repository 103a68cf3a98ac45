//! Image copies and thumbnail generation.
//!
//! Stage 2 of the build pipeline. Takes the manifest from the scan stage,
//! copies every original into the output directory and renders a thumbnail
//! for it.
//!
//! ## Output Structure
//!
//! ```text
//! output/
//! ├── .thumb-cache.json     # Cache manifest (see crate::cache)
//! ├── images/
//! │   ├── IMG_0001.jpg      # Byte-for-byte copy of the original
//! │   └── beach.png
//! └── thumbs/
//!     ├── IMG_0001.jpg      # 300x300 centre crop, same format as the original
//!     └── beach.png
//! ```
//!
//! ## Default Configuration
//!
//! ```text
//! Thumbnail aspect: 1:1
//! Thumbnail size: 300px (on the short edge)
//! Quality: 67
//! Sharpening: off
//! ```
//!
//! Any thumbnail failure aborts the build: a gallery with missing thumbnails
//! is broken in ways the generated HTML can't hide.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, ThumbnailConfig, create_thumbnail, plan_thumbnail,
};
use crate::scan::Manifest;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory (inside the output directory) holding copies of the originals.
pub const IMAGES_DIR: &str = "images";
/// Directory (inside the output directory) holding thumbnails.
pub const THUMBS_DIR: &str = "thumbs";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create thumbnail for {path}: {source}")]
    Thumbnail {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// How a thumbnail was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Existing file at the expected path was reused.
    Cached,
    /// An identical thumbnail existed under another name and was copied.
    Copied,
    /// The thumbnail was rendered from the original.
    Encoded,
}

/// Progress events emitted while processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    PhotoProcessed {
        /// 1-based position in scan order.
        index: usize,
        filename: String,
        thumbnail: VariantStatus,
    },
}

/// Totals for one process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub photos: usize,
    pub cache: CacheStats,
}

pub fn process(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    on_event: impl FnMut(&ProcessEvent),
) -> Result<ProcessSummary, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(
        &backend,
        manifest,
        source_root,
        output_dir,
        use_cache,
        on_event,
    )
}

/// Process photos using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    mut on_event: impl FnMut(&ProcessEvent),
) -> Result<ProcessSummary, ProcessError> {
    let images_dir = output_dir.join(IMAGES_DIR);
    let thumbs_dir = output_dir.join(THUMBS_DIR);
    std::fs::create_dir_all(&images_dir)?;
    std::fs::create_dir_all(&thumbs_dir)?;

    let previous = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    let mut current = CacheManifest::empty();
    let mut stats = CacheStats::default();

    let thumb_config = ThumbnailConfig::from(&manifest.config.thumbnails);
    let params_hash = thumbnail_params_hash(&thumb_config);

    for (i, photo) in manifest.photos.iter().enumerate() {
        let source = source_root.join(&photo.filename);

        let copy_target = images_dir.join(&photo.filename);
        std::fs::copy(&source, &copy_target).map_err(|e| ProcessError::Copy {
            path: source.clone(),
            source: e,
        })?;

        let source_hash = cache::hash_file(&source).map_err(|e| ProcessError::Read {
            path: source.clone(),
            source: e,
        })?;
        let thumb_rel = format!("{THUMBS_DIR}/{}", photo.filename);
        let thumb_path = output_dir.join(&thumb_rel);

        let status = if previous.is_fresh(&thumb_rel, &source_hash, &params_hash, output_dir) {
            stats.hit();
            VariantStatus::Cached
        } else {
            // A stored path rewritten earlier in this run no longer holds
            // the content the previous manifest recorded for it
            let reusable = previous
                .find_cached(&source_hash, &params_hash, output_dir)
                .filter(|stored| !current.holds_other(stored, &source_hash, &params_hash));
            match reusable {
                Some(stored) => {
                    std::fs::copy(output_dir.join(&stored), &thumb_path)?;
                    stats.copy();
                    VariantStatus::Copied
                }
                None => {
                    create_thumbnail(backend, &source, &thumb_path, &thumb_config).map_err(
                        |e| ProcessError::Thumbnail {
                            path: source.clone(),
                            source: e,
                        },
                    )?;
                    stats.miss();
                    VariantStatus::Encoded
                }
            }
        };

        current.insert(thumb_rel, source_hash, params_hash.clone());
        on_event(&ProcessEvent::PhotoProcessed {
            index: i + 1,
            filename: photo.filename.clone(),
            thumbnail: status,
        });
    }

    current.save(output_dir)?;

    Ok(ProcessSummary {
        photos: manifest.photos.len(),
        cache: stats,
    })
}

fn thumbnail_params_hash(config: &ThumbnailConfig) -> String {
    let params = plan_thumbnail(Path::new(""), Path::new(""), config);
    cache::hash_thumbnail_params(
        (params.crop_width, params.crop_height),
        params.quality.value(),
        params.sharpening.map(|s| (s.sigma, s.threshold)),
    )
}

/// A photo whose header could not be read.
#[derive(Debug)]
pub struct UnreadableImage {
    pub filename: String,
    pub error: BackendError,
}

/// Read every photo's dimensions without writing anything. Returns the
/// photos that would make the thumbnail step fail, in scan order.
pub fn check_images(manifest: &Manifest, source_root: &Path) -> Vec<UnreadableImage> {
    check_images_with_backend(&RustBackend::new(), manifest, source_root)
}

pub fn check_images_with_backend(
    backend: &impl ImageBackend,
    manifest: &Manifest,
    source_root: &Path,
) -> Vec<UnreadableImage> {
    manifest
        .photos
        .iter()
        .filter_map(|photo| match backend.identify(&source_root.join(&photo.filename)) {
            Ok(dims) => {
                debug!(
                    file = %photo.filename,
                    width = dims.width,
                    height = dims.height,
                    "image readable"
                );
                None
            }
            Err(error) => Some(UnreadableImage {
                filename: photo.filename.clone(),
                error,
            }),
        })
        .collect()
}
