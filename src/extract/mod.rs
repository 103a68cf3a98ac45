//! Metadata extraction behind a capability trait.
//!
//! The gallery only needs four things from a photo: keywords, city,
//! province/state and capture date. Where they come from is the
//! [`MetadataExtractor`]'s business:
//!
//! | Backend | Source | Formats |
//! |---|---|---|
//! | [`ExifTool`] | `exiftool -j` subprocess, one call per photo | anything exiftool reads |
//! | [`NativeIptc`] | built-in IPTC-IIM reader | JPEG (APP13), TIFF (IFD 33723/34377) |
//!
//! The scan stage picks a backend with [`extractor_for`] and never looks at
//! which one it got, so the tag index and caption code are independent of
//! the metadata source.
//!
//! ## Failure model
//!
//! [`MetadataExtractor::ensure_available`] runs once before any photo is
//! read; a missing external tool is fatal. Errors from
//! [`MetadataExtractor::extract`] are per photo and recoverable: the scan
//! stage logs them and carries on with empty metadata.

mod exiftool;
pub(crate) mod iptc_parser;
mod native;

pub use exiftool::{ExifTool, parse_exiftool_output};
pub use native::NativeIptc;

use crate::config::{ExtractorBackend, SiteConfig};
use crate::types::PhotoMetadata;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(
        "metadata tool '{0}' not found on PATH (install it, or set extractor.backend = \"native\")"
    )]
    ToolNotFound(String),
    #[error("{tool} failed on {path}: {message}")]
    ToolFailed {
        tool: String,
        path: PathBuf,
        message: String,
    },
    #[error("could not parse metadata for {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Whether the error stops the whole run rather than a single photo.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::ToolNotFound(_))
    }
}

/// Reads gallery metadata from a photo file.
pub trait MetadataExtractor {
    /// Short backend name for log and console output.
    fn name(&self) -> &str;

    /// Check that the backend can run at all (e.g. the external tool is
    /// installed). Called once per run, before any photo is read.
    fn ensure_available(&self) -> Result<(), ExtractError> {
        Ok(())
    }

    /// Read keywords, location and capture date from one photo.
    fn extract(&self, path: &Path) -> Result<PhotoMetadata, ExtractError>;
}

/// Build the extractor selected by `[extractor] backend`.
pub fn extractor_for(config: &SiteConfig) -> Box<dyn MetadataExtractor> {
    match config.extractor.backend {
        ExtractorBackend::Exiftool => Box::new(ExifTool::new(
            &config.extractor,
            &config.caption.date_format,
        )),
        ExtractorBackend::Native => Box::new(NativeIptc::new(&config.caption.date_format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_tool_is_fatal() {
        assert!(ExtractError::ToolNotFound("exiftool".into()).is_fatal());
        assert!(
            !ExtractError::ToolFailed {
                tool: "exiftool".into(),
                path: "a.jpg".into(),
                message: "boom".into(),
            }
            .is_fatal()
        );
        assert!(
            !ExtractError::Parse {
                path: "a.jpg".into(),
                message: "bad json".into(),
            }
            .is_fatal()
        );
    }

    #[test]
    fn extractor_for_follows_backend_setting() {
        let mut config = SiteConfig::default();
        assert_eq!(extractor_for(&config).name(), "exiftool");

        config.extractor.backend = ExtractorBackend::Native;
        assert_eq!(extractor_for(&config).name(), "native");
    }

    #[test]
    fn error_messages_name_the_file() {
        let err = ExtractError::ToolFailed {
            tool: "exiftool".into(),
            path: "images/broken.jpg".into(),
            message: "File format error".into(),
        };
        assert!(err.to_string().contains("images/broken.jpg"));
    }
}
