//! Shared test utilities for the keyword-gallery test suite.
//!
//! Builders for scan-stage data (`Photo`, `Manifest`), a scripted
//! [`MetadataExtractor`], and byte-level fixtures for IPTC parsing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_files(tmp.path(), &["a.jpg", "b.jpg"]);
//! let stub = StubExtractor::new().with_keywords("a.jpg", &["sea"]);
//! let manifest = scan_with_extractor(tmp.path(), SiteConfig::default(), &stub).unwrap();
//! assert_eq!(filenames(&manifest.photos), vec!["a.jpg", "b.jpg"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::{ImageEncoder, RgbImage};

use crate::config::SiteConfig;
use crate::extract::{ExtractError, MetadataExtractor};
use crate::scan::Manifest;
use crate::types::{Photo, PhotoMetadata};

// =========================================================================
// Scan data builders
// =========================================================================

/// A photo with the given keywords and a slug derived from its stem.
pub fn photo(filename: &str, keywords: &[&str]) -> Photo {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let slug = match slug::slugify(stem) {
        s if s.is_empty() => "photo".to_string(),
        s => s,
    };
    Photo {
        filename: filename.to_string(),
        slug,
        metadata: PhotoMetadata {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        },
    }
}

pub fn manifest_of(photos: Vec<Photo>, config: SiteConfig) -> Manifest {
    Manifest {
        photos,
        extraction_failures: Vec::new(),
        config,
    }
}

/// File names in manifest order.
pub fn filenames(photos: &[Photo]) -> Vec<&str> {
    photos.iter().map(|p| p.filename.as_str()).collect()
}

/// Create files whose contents are their own names, so every file hashes
/// differently.
pub fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

// =========================================================================
// Scripted extractor
// =========================================================================

/// Extractor that answers from a lookup table keyed by file name.
#[derive(Default)]
pub struct StubExtractor {
    keywords: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    unavailable: bool,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor whose availability check fails like a missing tool.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_keywords(mut self, filename: &str, keywords: &[&str]) -> Self {
        self.keywords.insert(
            filename.to_string(),
            keywords.iter().map(|k| k.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_string());
        self
    }
}

impl MetadataExtractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    fn ensure_available(&self) -> Result<(), ExtractError> {
        if self.unavailable {
            Err(ExtractError::ToolNotFound("stub".to_string()))
        } else {
            Ok(())
        }
    }

    fn extract(&self, path: &Path) -> Result<PhotoMetadata, ExtractError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.failing.contains(name) {
            return Err(ExtractError::Parse {
                path: path.to_path_buf(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(PhotoMetadata {
            keywords: self.keywords.get(name).cloned().unwrap_or_default(),
            ..Default::default()
        })
    }
}

// =========================================================================
// Binary fixtures
// =========================================================================

/// Encode Record 2 IPTC-IIM datasets.
pub fn iptc_iim(datasets: &[(u8, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (dataset, value) in datasets {
        out.extend_from_slice(&[0x1C, 0x02, *dataset]);
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// A JPEG marker stream with an APP13 segment carrying the datasets.
/// Not decodable as an image; enough for metadata parsing.
pub fn jpeg_with_iptc(datasets: &[(u8, &str)]) -> Vec<u8> {
    let iim = iptc_iim(datasets);

    let mut resource = Vec::new();
    resource.extend_from_slice(b"Photoshop 3.0\0");
    resource.extend_from_slice(b"8BIM");
    resource.extend_from_slice(&0x0404u16.to_be_bytes());
    // Empty Pascal name, padded to even length
    resource.extend_from_slice(&[0x00, 0x00]);
    resource.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    resource.extend_from_slice(&iim);
    if iim.len() % 2 == 1 {
        resource.push(0x00);
    }

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xED];
    jpeg.extend_from_slice(&((resource.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&resource);
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9]);
    jpeg
}

/// Write a decodable gradient JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}
