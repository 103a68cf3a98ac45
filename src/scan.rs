//! Photo discovery and metadata extraction.
//!
//! Stage 1 of the build pipeline. Lists the photos in the input directory,
//! reads their metadata through a [`MetadataExtractor`], and produces the
//! [`Manifest`] that the process and generate stages consume.
//!
//! ## Input Directory
//!
//! ```text
//! images/
//! ├── config.toml        # Site configuration (optional, never a photo)
//! ├── .DS_Store          # Hidden files are ignored
//! ├── IMG_0001.jpg
//! ├── IMG_0002.JPG       # Extensions match case-insensitively
//! ├── beach.png
//! └── drafts/            # Subdirectories are not scanned
//! ```
//!
//! ## Ordering
//!
//! Photos are listed in file-name byte order. That order is the scan order:
//! it decides detail-page prev/next links, the order photos appear on tag
//! pages, and which photo keeps the plain slug when two stems collide.
//!
//! ## Failures
//!
//! - Missing input directory: [`ScanError::InputMissing`], before anything
//!   else is touched.
//! - Extractor unavailable (e.g. `exiftool` not installed): fatal.
//! - Extraction failing for one photo: logged with `warn!`, the photo is kept
//!   with empty metadata and listed in [`Manifest::extraction_failures`].

use crate::config::{self, PhotosConfig, SiteConfig};
use crate::extract::{self, ExtractError, MetadataExtractor};
use crate::naming::SlugAllocator;
use crate::types::{Photo, PhotoMetadata};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {0}")]
    InputMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to list input directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Metadata error: {0}")]
    Extract(#[from] ExtractError),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// Photos in scan order.
    pub photos: Vec<Photo>,
    /// File names whose metadata could not be read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extraction_failures: Vec<String>,
    pub config: SiteConfig,
}

/// Scan `root` with the config and extractor it configures.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    ensure_input_dir(root)?;
    let config = config::load_config(root)?;
    let extractor = extract::extractor_for(&config);
    scan_with_extractor(root, config, extractor.as_ref())
}

/// Scan `root` using an explicit extractor.
pub fn scan_with_extractor(
    root: &Path,
    config: SiteConfig,
    extractor: &dyn MetadataExtractor,
) -> Result<Manifest, ScanError> {
    ensure_input_dir(root)?;
    extractor.ensure_available()?;

    let filenames = collect_photos(root, &config.photos)?;
    debug!(count = filenames.len(), extractor = extractor.name(), "found photos");

    let mut slugs = SlugAllocator::new();
    let mut photos = Vec::with_capacity(filenames.len());
    let mut extraction_failures = Vec::new();

    for filename in filenames {
        let metadata = match extractor.extract(&root.join(&filename)) {
            Ok(metadata) => metadata,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(
                    file = %filename,
                    error = %e,
                    "could not read metadata, treating photo as untagged"
                );
                extraction_failures.push(filename.clone());
                PhotoMetadata::default()
            }
        };

        let stem = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let slug = slugs.allocate(stem, "photo");

        photos.push(Photo {
            filename,
            slug,
            metadata,
        });
    }

    Ok(Manifest {
        photos,
        extraction_failures,
        config,
    })
}

fn ensure_input_dir(root: &Path) -> Result<(), ScanError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(ScanError::InputMissing(root.to_path_buf()))
    }
}

/// File names of the photos directly inside `root`, in byte order.
fn collect_photos(root: &Path, photos: &PhotosConfig) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
            continue;
        };
        if name.starts_with('.') || name == config::CONFIG_FILENAME {
            continue;
        }
        let accepted = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| photos.accepts(ext));
        if accepted {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
