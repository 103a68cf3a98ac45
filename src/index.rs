//! Tag index: which photos carry which keyword.
//!
//! The index maps every keyword found during the scan to the photos that
//! carry it. Photos are referenced by their position in the scan order, so
//! the index is cheap to build and always agrees with the photo list it was
//! built from.
//!
//! ## Ordering
//!
//! - Tags iterate in lexicographic (UTF-8 byte) order.
//! - Photos within a tag keep scan order, which is file-name byte order.
//!
//! ## Invariants
//!
//! - Every tag has at least one photo.
//! - A photo is listed under each of its keywords exactly once and under no
//!   other tag. Photos without keywords appear nowhere in the index.

use crate::naming::SlugAllocator;
use crate::types::Photo;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<usize>>,
}

/// One tag as shown in the landing page's tag cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudEntry {
    pub tag: String,
    pub slug: String,
    pub count: usize,
    /// Emphasis level, `1..=levels`.
    pub weight: u8,
}

/// Group photos by keyword.
pub fn build_index(photos: &[Photo]) -> TagIndex {
    let mut tags: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (pos, photo) in photos.iter().enumerate() {
        for keyword in photo.keywords() {
            let members = tags.entry(keyword.clone()).or_default();
            // Positions arrive in increasing order, so a repeat keyword on
            // the same photo can only ever match the last entry.
            if members.last() != Some(&pos) {
                members.push(pos);
            }
        }
    }
    TagIndex { tags }
}

/// Positions of photos that carry no keywords, in scan order.
pub fn untagged(photos: &[Photo]) -> Vec<usize> {
    photos
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_tagged())
        .map(|(pos, _)| pos)
        .collect()
}

impl TagIndex {
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Tags with the scan positions of their photos.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.tags.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn get(&self, tag: &str) -> Option<&[usize]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// A unique, file-name-safe slug for every tag.
    ///
    /// Slugs are allocated in tag order, so when two tags collapse to the
    /// same slug the lexicographically smaller one keeps the plain form.
    pub fn slugs(&self) -> BTreeMap<String, String> {
        let mut allocator = SlugAllocator::new();
        self.tags
            .keys()
            .map(|tag| (tag.clone(), allocator.allocate(tag, "tag")))
            .collect()
    }

    /// Tag cloud entries in tag order.
    ///
    /// Weights scale linearly from 1 (smallest count) to `levels` (largest
    /// count). When every tag has the same count they all get weight 1.
    pub fn cloud(&self, levels: u8) -> Vec<CloudEntry> {
        let levels = levels.max(1);
        let min = self.tags.values().map(Vec::len).min().unwrap_or(0);
        let max = self.tags.values().map(Vec::len).max().unwrap_or(0);
        let slugs = self.slugs();

        self.tags
            .iter()
            .map(|(tag, photos)| {
                let weight = if max == min {
                    1
                } else {
                    let steps = usize::from(levels - 1);
                    1 + ((photos.len() - min) * steps + (max - min) / 2) / (max - min)
                };
                CloudEntry {
                    tag: tag.clone(),
                    slug: slugs[tag].clone(),
                    count: photos.len(),
                    weight: weight as u8,
                }
            })
            .collect()
    }
}
