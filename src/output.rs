//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Every photo is shown by its positional index and file name, with what the
//! build learned about it (keywords, caption, cache status) as indented
//! context lines. Tags are shown by name with their photo count.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Photos
//! 001 IMG_0001.jpg
//!     Keywords: beach, sunset
//!     Caption: Nice, Provence, 2023-05-01
//! 002 IMG_0002.jpg
//!     (untagged)
//!
//! Tags
//!     beach (1 photo)
//!     sunset (1 photo)
//!
//! Metadata unreadable
//!     IMG_0003.jpg
//! ```
//!
//! ## Process
//!
//! ```text
//! 001 IMG_0001.jpg
//!     thumbnail: cached
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! beach (1 photo) → tags/beach.html
//! sunset (1 photo) → tags/sunset.html
//!
//! Generated 2 tag pages, 2 photo pages
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::caption::compose_caption;
use crate::generate::GenerateSummary;
use crate::index::build_index;
use crate::process::{ProcessEvent, VariantStatus};
use crate::scan::Manifest;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output: every photo with its metadata, then the tags.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Photos".to_string());
    for (i, photo) in manifest.photos.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), photo.filename));
        if photo.is_tagged() {
            lines.push(format!("    Keywords: {}", photo.keywords().join(", ")));
        } else {
            lines.push("    (untagged)".to_string());
        }
        let caption = compose_caption(photo);
        if !caption.is_empty() {
            lines.push(format!("    Caption: {}", caption));
        }
    }

    let index = build_index(&manifest.photos);
    lines.push(String::new());
    lines.push("Tags".to_string());
    if index.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (tag, members) in index.iter() {
        lines.push(format!("    {} ({})", tag, plural(members.len(), "photo")));
    }

    if !manifest.extraction_failures.is_empty() {
        lines.push(String::new());
        lines.push("Metadata unreadable".to_string());
        for filename in &manifest.extraction_failures {
            lines.push(format!("    {}", filename));
        }
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::PhotoProcessed {
            index,
            filename,
            thumbnail,
        } => {
            let status = match thumbnail {
                VariantStatus::Cached => "cached",
                VariantStatus::Copied => "copied",
                VariantStatus::Encoded => "encoded",
            };
            vec![
                format!("{} {}", format_index(*index), filename),
                format!("    thumbnail: {}", status),
            ]
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output: each written tag page with its path.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];

    for page in &summary.tag_pages {
        lines.push(format!(
            "{} ({}) \u{2192} {}",
            page.tag,
            plural(page.photos, "photo"),
            page.path
        ));
    }

    lines.push(String::new());
    let mut totals = format!(
        "Generated {}, {}",
        plural(summary.tag_pages.len(), "tag page"),
        plural(summary.photo_pages, "photo page")
    );
    if summary.tag_navigation_pages > 0 {
        totals.push_str(&format!(
            ", {}",
            plural(summary.tag_navigation_pages, "tag navigation page")
        ));
    }
    lines.push(totals);

    if summary.untagged > 0 {
        lines.push(format!(
            "{} not on any tag page",
            plural(summary.untagged, "untagged photo")
        ));
    }

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}
