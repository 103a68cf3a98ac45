//! # Keyword Gallery
//!
//! A static site generator that turns a flat directory of photos into a
//! browsable gallery organised by the keywords embedded in the photos.
//! The photos themselves are the data source: IPTC keywords become tags,
//! city, state and capture date become the caption.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan      images/   →  Manifest       (files + metadata → structured data)
//! 2. Process   Manifest  →  output/images/  output/thumbs/
//! 3. Generate  Manifest  →  output/*.html
//! ```
//!
//! The scan stage is the only one that talks to the metadata backend. Process
//! and generate read the [`scan::Manifest`] and nothing else, so they can be
//! tested without exiftool and without real image files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: lists photos, reads their metadata, produces the manifest |
//! | [`process`] | Stage 2: copies originals and renders cached thumbnails |
//! | [`generate`] | Stage 3: renders landing, tag, and photo pages with Maud |
//! | [`extract`] | Metadata backends: the `exiftool` CLI and a built-in IPTC reader |
//! | [`metadata`] | Normalising raw metadata values: keywords, blanks, dates |
//! | [`index`] | Grouping photos by keyword, tag cloud weights |
//! | [`caption`] | Caption text from location and date |
//! | [`naming`] | Unique URL slugs for tags and photos |
//! | [`imaging`] | Pure-Rust thumbnail cropping and encoding |
//! | [`cache`] | Content-addressed thumbnail cache |
//! | [`config`] | `config.toml` loading, validation, and CSS generation |
//! | [`types`] | `Photo` and `PhotoMetadata`, shared by every stage |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Site Layout
//!
//! ```text
//! output/
//! ├── index.html              # Tag cloud
//! ├── tags/<tag>.html         # One page per keyword
//! ├── photos/<photo>.html     # One page per photo
//! ├── images/                 # Copies of the originals
//! └── thumbs/                 # Thumbnails
//! ```
//!
//! Every link between pages is relative, so the output directory can be
//! served from any URL prefix or opened straight from disk.

pub mod cache;
pub mod caption;
pub mod config;
pub mod extract;
pub mod generate;
pub mod imaging;
pub mod index;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
