//! Centralized slug assignment for tags and photos.
//!
//! Page file names are derived from user-controlled strings (keywords and
//! photo file stems), so two different inputs can collapse to the same
//! slug: `Berlin` and `berlin`, or `a.jpg` and `a.png`. A [`SlugAllocator`]
//! hands out slugs in the order it is asked and suffixes later duplicates:
//!
//! - `"Berlin"` → `berlin`
//! - `"berlin"` → `berlin-2`
//! - `"Straße am Meer"` → `strasse-am-meer`
//! - `"!!!"` → the fallback base (`tag`, `photo`)
//!
//! Callers feed names in a stable order (lexicographic tags, scan-order
//! photos), which makes the suffixes stable across runs.

use std::collections::HashSet;

/// Assigns unique slugs within one namespace.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    used: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `name` and make it unique among slugs already allocated.
    /// Names with no sluggable characters use `fallback` as the base.
    pub fn allocate(&mut self, name: &str, fallback: &str) -> String {
        let base = match slug::slugify(name) {
            s if s.is_empty() => fallback.to_string(),
            s => s,
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
