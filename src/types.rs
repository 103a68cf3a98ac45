//! Shared types used across all pipeline stages.
//!
//! A [`Photo`] is produced once by the scan stage and never mutated again:
//! the process and generate stages only read it.

use serde::{Deserialize, Serialize};

/// Metadata fields the gallery cares about, as returned by a
/// [`MetadataExtractor`](crate::extract::MetadataExtractor).
///
/// Every field is optional. An empty `keywords` list means the photo is
/// untagged; absent location/date fields are simply left out of the caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Keywords in the order the extractor reported them, trimmed and
    /// de-duplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Capture date, already rendered for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl PhotoMetadata {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.city.is_none()
            && self.state.is_none()
            && self.date.is_none()
    }
}

/// A single photo found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// File name inside the input directory (e.g. `IMG_0042.jpg`).
    pub filename: String,
    /// URL-safe identifier, unique within one run. Detail pages live at
    /// `photos/<slug>.html`.
    pub slug: String,
    #[serde(default)]
    pub metadata: PhotoMetadata,
}

impl Photo {
    pub fn keywords(&self) -> &[String] {
        &self.metadata.keywords
    }

    pub fn is_tagged(&self) -> bool {
        !self.metadata.keywords.is_empty()
    }
}
