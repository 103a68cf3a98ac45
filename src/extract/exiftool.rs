//! [`MetadataExtractor`] backed by the `exiftool` CLI.
//!
//! Runs `exiftool -j -<Field>... <file>` once per photo and maps the first
//! object of the JSON array through [`metadata::from_exiftool_fields`].
//! Only the four configured tags are requested, which keeps the JSON small.

use super::{ExtractError, MetadataExtractor};
use crate::config::ExtractorConfig;
use crate::metadata;
use crate::types::PhotoMetadata;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// An extractor that shells out to exiftool.
#[derive(Debug, Clone)]
pub struct ExifTool {
    fields: ExtractorConfig,
    date_format: String,
}

impl ExifTool {
    pub fn new(fields: &ExtractorConfig, date_format: &str) -> Self {
        Self {
            fields: fields.clone(),
            date_format: date_format.to_string(),
        }
    }

    fn program(&self) -> &str {
        &self.fields.program
    }

    fn tag_args(&self) -> Vec<String> {
        [
            &self.fields.keywords_field,
            &self.fields.city_field,
            &self.fields.state_field,
            &self.fields.date_field,
        ]
        .into_iter()
        .map(|field| format!("-{field}"))
        .collect()
    }
}

impl MetadataExtractor for ExifTool {
    fn name(&self) -> &str {
        "exiftool"
    }

    fn ensure_available(&self) -> Result<(), ExtractError> {
        which::which(self.program())
            .map(|found| debug!(path = %found.display(), "using exiftool"))
            .map_err(|_| ExtractError::ToolNotFound(self.program().to_string()))
    }

    fn extract(&self, path: &Path) -> Result<PhotoMetadata, ExtractError> {
        debug!(file = %path.display(), "running exiftool");
        let output = Command::new(self.program())
            .arg("-j")
            .args(self.tag_args())
            .arg(path)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractError::ToolNotFound(self.program().to_string()),
                _ => ExtractError::Io {
                    path: path.to_path_buf(),
                    source: e,
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        // exiftool exits non-zero on unreadable files but may still print a
        // JSON object carrying an "Error" tag, so stdout is checked first.
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(ExtractError::ToolFailed {
                tool: self.program().to_string(),
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let fields = parse_exiftool_output(&stdout).map_err(|message| ExtractError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        if let Some(Value::String(error)) = fields.get("Error") {
            return Err(ExtractError::ToolFailed {
                tool: self.program().to_string(),
                path: path.to_path_buf(),
                message: error.clone(),
            });
        }

        Ok(metadata::from_exiftool_fields(
            &fields,
            &self.fields,
            &self.date_format,
        ))
    }
}

/// Parse `exiftool -j` output and return the object for the first file.
pub fn parse_exiftool_output(stdout: &str) -> Result<Map<String, Value>, String> {
    let objects: Vec<Map<String, Value>> =
        serde_json::from_str(stdout).map_err(|e| format!("exiftool JSON parse error: {e}"))?;
    objects
        .into_iter()
        .next()
        .ok_or_else(|| "exiftool returned no results".to_string())
}
