//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they take
//! configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_thumbnail_dimensions;
use super::params::{Quality, Sharpening, ThumbnailParams};
use crate::config::ThumbnailsConfig;
use std::path::Path;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub aspect: (u32, u32),
    pub short_edge: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            aspect: (1, 1),
            short_edge: 300,
            quality: Quality::default(),
            sharpening: None,
        }
    }
}

impl From<&ThumbnailsConfig> for ThumbnailConfig {
    fn from(config: &ThumbnailsConfig) -> Self {
        Self {
            aspect: (config.aspect_ratio[0], config.aspect_ratio[1]),
            short_edge: config.size,
            quality: Quality::new(config.quality),
            sharpening: config.sharpen.then(Sharpening::light),
        }
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output_path: &Path,
    config: &ThumbnailConfig,
) -> ThumbnailParams {
    let (crop_w, crop_h) = calculate_thumbnail_dimensions(config.aspect, config.short_edge);

    ThumbnailParams {
        source: source.to_path_buf(),
        output: output_path.to_path_buf(),
        crop_width: crop_w,
        crop_height: crop_h,
        quality: config.quality,
        sharpening: config.sharpening,
    }
}

/// Create a thumbnail at `output_path`. The output format follows the
/// output file's extension.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output_path: &Path,
    config: &ThumbnailConfig,
) -> Result<ThumbnailParams, BackendError> {
    let params = plan_thumbnail(source, output_path, config);
    backend.thumbnail(&params)?;
    Ok(params)
}
