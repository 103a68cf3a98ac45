//! [`MetadataExtractor`] that reads IPTC directly from the file, with no
//! external tool. Covers JPEG and TIFF; other formats come back untagged.

use super::iptc_parser::read_iptc;
use super::{ExtractError, MetadataExtractor};
use crate::metadata::{self, dedupe_keywords};
use crate::types::PhotoMetadata;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct NativeIptc {
    date_format: String,
}

impl NativeIptc {
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }
}

impl MetadataExtractor for NativeIptc {
    fn name(&self) -> &str {
        "native"
    }

    fn extract(&self, path: &Path) -> Result<PhotoMetadata, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let iptc = read_iptc(&ext, &bytes);
        Ok(PhotoMetadata {
            keywords: dedupe_keywords(iptc.keywords),
            city: iptc.city,
            state: iptc.province_state,
            date: iptc
                .date_created
                .and_then(|d| metadata::format_date(&d, &self.date_format)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::jpeg_with_iptc;
    use tempfile::TempDir;

    #[test]
    fn extracts_all_fields_from_jpeg() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("IMG_1.JPG");
        let jpeg = jpeg_with_iptc(&[
            (25, "street"),
            (25, "night"),
            (25, "street"),
            (90, "Berlin"),
            (55, "20230501"),
        ]);
        std::fs::write(&path, jpeg).unwrap();

        let meta = NativeIptc::new("%d.%m.%Y").extract(&path).unwrap();
        assert_eq!(meta.keywords, vec!["street", "night"]);
        assert_eq!(meta.city.as_deref(), Some("Berlin"));
        assert_eq!(meta.state, None);
        assert_eq!(meta.date.as_deref(), Some("01.05.2023"));
    }

    #[test]
    fn png_has_no_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shot.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        let meta = NativeIptc::new("%Y-%m-%d").extract(&path).unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn unreadable_file_is_recoverable_error() {
        let err = NativeIptc::new("%Y-%m-%d")
            .extract(Path::new("/nonexistent/a.jpg"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert!(!err.is_fatal());
    }
}
