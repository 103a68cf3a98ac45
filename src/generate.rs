//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the scan manifest, groups photos by
//! keyword and writes the static HTML pages.
//!
//! ## Generated Pages
//!
//! - **Landing page** (`index.html`): tag cloud, one link per tag, sized by
//!   how many photos carry it
//! - **Tag pages** (`tags/<tag-slug>.html`): thumbnails of exactly the photos
//!   carrying that tag, in scan order
//! - **Photo pages** (`photos/<photo-slug>.html`): full image, caption, tag
//!   links, prev/next in scan order. Every photo gets one, untagged or not.
//! - **Tag navigation pages** (`photos/<tag-slug>/<photo-slug>.html`, only
//!   with `pages.tag_navigation = true`): the same photo page with prev/next
//!   restricted to one tag. Tag pages then link here instead.
//!
//! ## Output Structure
//!
//! ```text
//! output/
//! ├── index.html
//! ├── tags/
//! │   ├── beach.html
//! │   └── night.html
//! ├── photos/
//! │   ├── img-0001.html
//! │   ├── img-0002.html
//! │   └── beach/                 # tag navigation only
//! │       └── img-0001.html
//! ├── images/                    # written by the process stage
//! └── thumbs/
//! ```
//!
//! `tags/` and `photos/` are deleted and rewritten on every run, so pages of
//! tags that no longer exist don't linger. All links are relative; the site
//! works from any path prefix and straight from disk.
//!
//! ## Determinism
//!
//! Pages depend only on the manifest: no timestamps, and every list is
//! rendered in index order. Re-running on unchanged input rewrites
//! byte-identical files.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors and thumbnail size injected from config)
//! - `static/nav.js`: Arrow-key navigation on photo pages
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::caption::compose_caption;
use crate::config::{self, SiteConfig};
use crate::index::{self, TagIndex, build_index};
use crate::process::{IMAGES_DIR, THUMBS_DIR};
use crate::scan::Manifest;
use crate::types::Photo;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory (inside the output directory) holding tag pages.
pub const TAGS_DIR: &str = "tags";
/// Directory (inside the output directory) holding photo pages.
pub const PHOTOS_DIR: &str = "photos";

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/nav.js");

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A written tag page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPage {
    pub tag: String,
    /// Path relative to the output directory.
    pub path: String,
    pub photos: usize,
}

/// What the generate stage wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Tag pages in tag order.
    pub tag_pages: Vec<TagPage>,
    pub photo_pages: usize,
    pub tag_navigation_pages: usize,
    /// Photos that appear on no tag page.
    pub untagged: usize,
}

/// Shared inputs for every page renderer, computed once per run.
struct Site<'a> {
    config: &'a SiteConfig,
    photos: &'a [Photo],
    index: TagIndex,
    tag_slugs: BTreeMap<String, String>,
    css: String,
}

/// Neighbours of a photo in whichever sequence the page navigates.
#[derive(Clone, Copy)]
struct Neighbours<'a> {
    prev: Option<&'a Photo>,
    next: Option<&'a Photo>,
}

pub fn generate(manifest: &Manifest, output_dir: &Path) -> Result<GenerateSummary, GenerateError> {
    let index = build_index(&manifest.photos);
    let tag_slugs = index.slugs();
    let css = format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&manifest.config.colors),
        config::generate_layout_css(&manifest.config.thumbnails),
        CSS_STATIC
    );
    let site = Site {
        config: &manifest.config,
        photos: &manifest.photos,
        index,
        tag_slugs,
        css,
    };
    let photos = site.photos;

    fs::create_dir_all(output_dir)?;
    let tags_dir = output_dir.join(TAGS_DIR);
    let photos_dir = output_dir.join(PHOTOS_DIR);
    for dir in [&tags_dir, &photos_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
    }

    let untagged = index::untagged(photos).len();
    write_page(&output_dir.join("index.html"), render_index(&site, untagged))?;

    let mut tag_pages = Vec::with_capacity(site.index.len());
    for (tag, members) in site.index.iter() {
        let path = format!("{TAGS_DIR}/{}.html", site.tag_slugs[tag]);
        write_page(&output_dir.join(&path), render_tag_page(&site, tag, members))?;
        tag_pages.push(TagPage {
            tag: tag.to_string(),
            path,
            photos: members.len(),
        });
    }

    for (pos, photo) in photos.iter().enumerate() {
        let neighbours = Neighbours {
            prev: pos.checked_sub(1).map(|i| &photos[i]),
            next: photos.get(pos + 1),
        };
        write_page(
            &photos_dir.join(format!("{}.html", photo.slug)),
            render_photo_page(&site, photo, neighbours, None),
        )?;
    }

    let mut tag_navigation_pages = 0;
    if site.config.pages.tag_navigation {
        for (tag, members) in site.index.iter() {
            let dir = photos_dir.join(&site.tag_slugs[tag]);
            fs::create_dir_all(&dir)?;
            for (i, &pos) in members.iter().enumerate() {
                let photo = &photos[pos];
                let neighbours = Neighbours {
                    prev: i.checked_sub(1).map(|j| &photos[members[j]]),
                    next: members.get(i + 1).map(|&j| &photos[j]),
                };
                write_page(
                    &dir.join(format!("{}.html", photo.slug)),
                    render_photo_page(&site, photo, neighbours, Some(tag)),
                )?;
                tag_navigation_pages += 1;
            }
        }
    }

    Ok(GenerateSummary {
        tag_pages,
        photo_pages: photos.len(),
        tag_navigation_pages,
        untagged,
    })
}

fn write_page(path: &Path, page: Markup) -> Result<(), GenerateError> {
    fs::write(path, page.into_string()).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Percent-encode a file name for use as one URL path segment.
fn url_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for b in name.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Relative prefix from a page `depth` directories below the output root.
fn root_prefix(depth: usize) -> String {
    "../".repeat(depth)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb
fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

fn page_title(site: &Site, subject: &str) -> String {
    format!("{} · {}", subject, site.config.site.title)
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the landing page with the tag cloud
fn render_index(site: &Site, untagged: usize) -> Markup {
    let cloud = site.index.cloud(site.config.tag_cloud.levels);
    let breadcrumb = html! { (site.config.site.title) };

    let content = html! {
        (site_header(breadcrumb))
        main.index-page {
            h1 { (site.config.site.title) }
            @if cloud.is_empty() {
                p.muted { "No tagged photos." }
            } @else {
                ul.tag-cloud {
                    @for entry in &cloud {
                        li {
                            a href={ (TAGS_DIR) "/" (entry.slug) ".html" }
                                style={ "--weight: " (entry.weight) } {
                                (entry.tag)
                            }
                            span.tag-count { (entry.count) }
                        }
                    }
                }
            }
            p.muted {
                (site.photos.len()) " photos, " (cloud.len()) " tags"
                @if untagged > 0 {
                    ", " (untagged) " untagged"
                }
            }
        }
    };

    base_document(&site.config.site.title, &site.css, None, content)
}

/// Renders a tag page with the thumbnails of its photos
fn render_tag_page(site: &Site, tag: &str, members: &[usize]) -> Markup {
    let root = root_prefix(1);
    let tag_slug = &site.tag_slugs[tag];

    let breadcrumb = html! {
        a href={ (root) "index.html" } rel="up" { (site.config.site.title) }
        " › "
        (tag)
    };

    let content = html! {
        (site_header(breadcrumb))
        main.tag-page {
            h1 { (tag) }
            p.muted { (members.len()) " photos" }
            div.thumbnail-grid {
                @for &pos in members {
                    @let photo = &site.photos[pos];
                    @let href = if site.config.pages.tag_navigation {
                        format!("{root}{PHOTOS_DIR}/{tag_slug}/{}.html", photo.slug)
                    } else {
                        format!("{root}{PHOTOS_DIR}/{}.html", photo.slug)
                    };
                    a.thumb-link href=(href) {
                        img src={ (root) (THUMBS_DIR) "/" (url_segment(&photo.filename)) }
                            alt=(alt_text(photo)) loading="lazy";
                    }
                }
            }
        }
    };

    base_document(&page_title(site, tag), &site.css, None, content)
}

fn alt_text(photo: &Photo) -> String {
    match compose_caption(photo) {
        caption if caption.is_empty() => photo.filename.clone(),
        caption => caption,
    }
}

/// Renders a photo page. `within_tag` selects the per-tag variant that
/// lives one directory deeper and navigates inside that tag.
fn render_photo_page(
    site: &Site,
    photo: &Photo,
    neighbours: Neighbours,
    within_tag: Option<&str>,
) -> Markup {
    let root = root_prefix(if within_tag.is_some() { 2 } else { 1 });
    let caption = compose_caption(photo);
    let tag_href = |tag: &str| format!("{root}{TAGS_DIR}/{}.html", site.tag_slugs[tag]);

    let up_href = match within_tag {
        Some(tag) => tag_href(tag),
        None => format!("{root}index.html"),
    };

    let breadcrumb = html! {
        a href={ (root) "index.html" } { (site.config.site.title) }
        @if let Some(tag) = within_tag {
            " › "
            a href=(tag_href(tag)) { (tag) }
        }
        " › "
        (photo.filename)
    };

    let content = html! {
        (site_header(breadcrumb))
        main.photo-page {
            figure.photo-frame {
                img src={ (root) (IMAGES_DIR) "/" (url_segment(&photo.filename)) }
                    alt=(alt_text(photo));
                @if !caption.is_empty() {
                    figcaption { (caption) }
                }
            }
            @if photo.is_tagged() {
                ul.photo-tags {
                    @for keyword in photo.keywords() {
                        li { a href=(tag_href(keyword)) { (keyword) } }
                    }
                }
            }
            nav.photo-nav {
                @if let Some(prev) = neighbours.prev {
                    a href={ (prev.slug) ".html" } rel="prev" { "← Previous" }
                } @else {
                    span.disabled { "← Previous" }
                }
                a href=(up_href) rel="up" { (within_tag.unwrap_or("Index")) }
                @if let Some(next) = neighbours.next {
                    a href={ (next.slug) ".html" } rel="next" { "Next →" }
                } @else {
                    span.disabled { "Next →" }
                }
            }
        }
        script { (PreEscaped(JS)) }
    };

    base_document(
        &page_title(site, &photo.filename),
        &site.css,
        Some("photo-view"),
        content,
    )
}
