//! Site configuration module.
//!
//! Handles loading, validating, and merging the optional `config.toml` that
//! sits next to the photos in the input directory. Stock defaults are the
//! base layer; the user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! images/
//! ├── config.toml      # optional, never treated as a photo
//! ├── IMG_0001.jpg
//! └── IMG_0002.jpg
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Gallery"
//!
//! [extractor]
//! backend = "exiftool"          # "exiftool" or "native" (built-in IPTC reader)
//! program = "exiftool"
//! keywords_field = "Keywords"
//! city_field = "City"
//! state_field = "Province-State"
//! date_field = "DateTimeOriginal"
//!
//! [photos]
//! extensions = ["jpg", "jpeg", "png"]
//!
//! [caption]
//! date_format = "%Y-%m-%d"
//!
//! [thumbnails]
//! aspect_ratio = [1, 1]
//! size = 300                    # short edge in pixels
//! quality = 67
//! sharpen = false
//!
//! [tag_cloud]
//! levels = 5
//!
//! [pages]
//! tag_navigation = false
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the input directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide labels.
    pub site: SiteInfo,
    /// Which metadata extractor to run and which fields it reads.
    pub extractor: ExtractorConfig,
    /// Which files in the input directory count as photos.
    pub photos: PhotosConfig,
    /// Caption rendering.
    pub caption: CaptionConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Landing page tag cloud.
    pub tag_cloud: TagCloudConfig,
    /// Optional extra pages.
    pub pages: PagesConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 0-100".into(),
            ));
        }
        if self.thumbnails.aspect_ratio[0] == 0 || self.thumbnails.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.aspect_ratio values must be non-zero".into(),
            ));
        }
        if self.thumbnails.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.size must be non-zero".into(),
            ));
        }
        if self.tag_cloud.levels == 0 {
            return Err(ConfigError::Validation(
                "tag_cloud.levels must be at least 1".into(),
            ));
        }
        if self.photos.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "photos.extensions must not be empty".into(),
            ));
        }
        if self.extractor.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "extractor.program must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.caption.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "caption.date_format is not a valid strftime pattern: {}",
                self.caption.date_format
            )));
        }
        Ok(())
    }
}

/// Site-wide labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Shown in the landing page heading and every breadcrumb.
    pub title: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Gallery".to_string(),
        }
    }
}

/// Metadata backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    /// Shell out to `exiftool -j`.
    #[default]
    Exiftool,
    /// Built-in IPTC-IIM reader (JPEG and TIFF only).
    Native,
}

/// Metadata extractor settings.
///
/// The `*_field` keys name exiftool JSON fields and only apply to the
/// `exiftool` backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    pub backend: ExtractorBackend,
    /// exiftool executable, looked up on `PATH` unless it is a path.
    pub program: String,
    pub keywords_field: String,
    pub city_field: String,
    pub state_field: String,
    pub date_field: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::default(),
            program: "exiftool".to_string(),
            keywords_field: "Keywords".to_string(),
            city_field: "City".to_string(),
            state_field: "Province-State".to_string(),
            date_field: "DateTimeOriginal".to_string(),
        }
    }
}

/// Photo discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// File extensions (case-insensitive, without the dot) treated as photos.
    pub extensions: Vec<String>,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

impl PhotosConfig {
    /// Whether a file extension is one of the configured photo extensions.
    pub fn accepts(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Caption rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// strftime pattern applied to capture dates that parse as EXIF/IPTC dates.
    pub date_format: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Aspect ratio as `[width, height]`; `[1, 1]` gives square thumbnails.
    pub aspect_ratio: [u32; 2],
    /// Length of the short edge in pixels.
    pub size: u32,
    /// JPEG encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    /// Apply a light unsharp mask after downscaling.
    pub sharpen: bool,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: [1, 1],
            size: 300,
            quality: 67,
            sharpen: false,
        }
    }
}

/// Tag cloud settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagCloudConfig {
    /// Number of emphasis steps; the most used tag gets the top step.
    pub levels: u8,
}

impl Default for TagCloudConfig {
    fn default() -> Self {
        Self { levels: 5 }
    }
}

/// Optional page sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Also write one page per (tag, photo) pair whose prev/next links stay
    /// inside the tag.
    pub tag_navigation: bool,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Captions, breadcrumbs and tag counts.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of the
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# keyword-gallery configuration
# =============================
# Place this file in the input directory (next to the photos).
# All settings are optional; values shown below are the defaults.
# Unknown keys will cause an error.

[site]
# Title shown on the landing page and in every breadcrumb.
title = "Gallery"

# ---------------------------------------------------------------------------
# Metadata extraction
# ---------------------------------------------------------------------------
[extractor]
# "exiftool" runs the external exiftool program for every photo.
# "native" uses the built-in IPTC reader (JPEG/TIFF, no external tool).
backend = "exiftool"

# exiftool executable (name on PATH, or a full path).
program = "exiftool"

# exiftool JSON fields to read. Only used by the exiftool backend.
keywords_field = "Keywords"
city_field = "City"
state_field = "Province-State"
date_field = "DateTimeOriginal"

# ---------------------------------------------------------------------------
# Photo discovery
# ---------------------------------------------------------------------------
[photos]
# File extensions treated as photos (case-insensitive).
extensions = ["jpg", "jpeg", "png"]

# ---------------------------------------------------------------------------
# Captions
# ---------------------------------------------------------------------------
[caption]
# strftime pattern for capture dates. Dates that cannot be parsed are
# shown exactly as stored in the file.
date_format = "%Y-%m-%d"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Aspect ratio as [width, height]. [1, 1] gives square thumbnails.
aspect_ratio = [1, 1]

# Length of the short edge in pixels.
size = 300

# JPEG quality (0 = worst, 100 = best).
quality = 67

# Light unsharp mask after downscaling.
sharpen = false

# ---------------------------------------------------------------------------
# Tag cloud
# ---------------------------------------------------------------------------
[tag_cloud]
# Number of emphasis steps between the least and most used tag.
levels = 5

# ---------------------------------------------------------------------------
# Extra pages
# ---------------------------------------------------------------------------
[pages]
# Also write a page per (tag, photo) pair whose prev/next links stay
# inside the tag.
tag_navigation = false

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Captions, breadcrumbs, tag counts
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

/// Generate the thumbnail-size custom property used by the grid layout.
pub fn generate_layout_css(thumbnails: &ThumbnailsConfig) -> String {
    let [w, h] = thumbnails.aspect_ratio;
    format!(
        ":root {{\n    --thumb-size: {}px;\n    --thumb-aspect: {} / {};\n}}",
        thumbnails.size, w, h
    )
}
