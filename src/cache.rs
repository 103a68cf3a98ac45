//! Thumbnail cache for incremental builds.
//!
//! Decoding a full-size photo and re-encoding it as a thumbnail is the slow
//! part of a build. This module lets the process stage skip that work when
//! neither the source photo nor the thumbnail settings have changed since
//! the last run.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `source_hash` and `params_hash`, not by output file path, so renaming a
//! photo does not invalidate its thumbnail.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` and copies.
//! - **`params_hash`**: SHA-256 of the crop size, quality and sharpening.
//!   Changing any thumbnail setting re-encodes every thumbnail.
//!
//! A cache hit requires an entry with matching hashes **and** the
//! previously written file still on disk. When the content matches but the
//! stored path differs, the cached file is copied instead of re-encoded,
//! unless the current run has already written other content to that path.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.thumb-cache.json`. Each run
//! reads the previous manifest for lookups and writes a fresh one holding
//! exactly the thumbnails of the current photo set. Entries live in a
//! `BTreeMap`, so an unchanged input produces a byte-identical manifest.
//!
//! ## Bypassing the cache
//!
//! `build --no-cache` loads an empty manifest, so every thumbnail is
//! re-encoded and the old files are overwritten.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".thumb-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping output paths (relative to the output
/// directory) to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
    /// Runtime reverse index: `"{source_hash}:{params_hash}"` → output_path.
    /// Built at load time, maintained on insert. Never serialized.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(manifest_path(output_dir)) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = build_content_index(&manifest.entries);
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(manifest_path(output_dir), json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a cached output file by content hashes.
    ///
    /// Returns `Some(stored_output_path)` if an entry with matching hashes
    /// exists **and** the file is still on disk. The returned path may
    /// differ from the caller's expected output path; the caller copies the
    /// file over when it does.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let content_key = format!("{}:{}", source_hash, params_hash);
        let stored_path = self.content_index.get(&content_key)?;
        if output_dir.join(stored_path).exists() {
            Some(stored_path.clone())
        } else {
            None
        }
    }

    /// Whether `output_path` already holds the output for these hashes.
    pub fn is_fresh(
        &self,
        output_path: &str,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> bool {
        self.entries.get(output_path).is_some_and(|entry| {
            entry.source_hash == source_hash && entry.params_hash == params_hash
        }) && output_dir.join(output_path).exists()
    }

    /// Whether `output_path` is recorded with hashes other than these.
    pub fn holds_other(&self, output_path: &str, source_hash: &str, params_hash: &str) -> bool {
        self.entries.get(output_path).is_some_and(|entry| {
            entry.source_hash != source_hash || entry.params_hash != params_hash
        })
    }

    /// Record a cache entry for an output file.
    ///
    /// When several outputs share the same content, lookups resolve to the
    /// first one recorded.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let content_key = format!("{}:{}", source_hash, params_hash);
        self.content_index
            .entry(content_key)
            .or_insert_with(|| output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// Build the content_index reverse map from the entries map.
///
/// Entries iterate in path order, so duplicate content resolves to the
/// smallest path.
fn build_content_index(entries: &BTreeMap<String, CacheEntry>) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for (output_path, entry) in entries {
        let content_key = format!("{}:{}", entry.source_hash, entry.params_hash);
        index.entry(content_key).or_insert_with(|| output_path.clone());
    }
    index
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the settings that shape a thumbnail.
pub fn hash_thumbnail_params(
    crop: (u32, u32),
    quality: u32,
    sharpening: Option<(f32, i32)>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"thumbnail\0");
    hasher.update(crop.0.to_le_bytes());
    hasher.update(crop.1.to_le_bytes());
    hasher.update(quality.to_le_bytes());
    match sharpening {
        Some((sigma, threshold)) => {
            hasher.update(b"\x01");
            hasher.update(sigma.to_le_bytes());
            hasher.update(threshold.to_le_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 || self.copies > 0 {
            if self.copies > 0 {
                write!(
                    f,
                    "{} cached, {} copied, {} encoded ({} total)",
                    self.hits,
                    self.copies,
                    self.misses,
                    self.total()
                )
            } else {
                write!(
                    f,
                    "{} cached, {} encoded ({} total)",
                    self.hits,
                    self.misses,
                    self.total()
                )
            }
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}

/// Resolve the cache manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // CacheManifest basics
    // =========================================================================

    #[test]
    fn empty_manifest_has_no_entries() {
        let m = CacheManifest::empty();
        assert_eq!(m.version, MANIFEST_VERSION);
        assert!(m.is_empty());
        assert!(m.content_index.is_empty());
    }

    #[test]
    fn find_cached_hit() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("thumbs/a.jpg".into(), "src123".into(), "prm456".into());

        let out = tmp.path().join("thumbs");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("a.jpg"), "data").unwrap();

        assert_eq!(
            m.find_cached("src123", "prm456", tmp.path()),
            Some("thumbs/a.jpg".to_string())
        );
    }

    #[test]
    fn find_cached_miss_wrong_hashes() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("out.jpg".into(), "hash_a".into(), "params_a".into());
        fs::write(tmp.path().join("out.jpg"), "data").unwrap();

        assert_eq!(m.find_cached("hash_b", "params_a", tmp.path()), None);
        assert_eq!(m.find_cached("hash_a", "params_b", tmp.path()), None);
    }

    #[test]
    fn find_cached_miss_file_deleted() {
        let mut m = CacheManifest::empty();
        m.insert("gone.jpg".into(), "h".into(), "p".into());
        let tmp = TempDir::new().unwrap();
        assert_eq!(m.find_cached("h", "p", tmp.path()), None);
    }

    #[test]
    fn is_fresh_requires_matching_entry_and_file() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("a.jpg".into(), "s".into(), "p".into());
        m.insert("b.jpg".into(), "s".into(), "p".into());
        fs::write(tmp.path().join("b.jpg"), "data").unwrap();

        assert!(m.is_fresh("b.jpg", "s", "p", tmp.path()));
        assert!(!m.is_fresh("b.jpg", "s", "other", tmp.path()));
        // Entry exists but the file is gone
        assert!(!m.is_fresh("a.jpg", "s", "p", tmp.path()));
        assert!(!m.is_fresh("c.jpg", "s", "p", tmp.path()));
    }

    #[test]
    fn holds_other_only_for_conflicting_entries() {
        let mut m = CacheManifest::empty();
        m.insert("a.jpg".into(), "s".into(), "p".into());

        assert!(!m.holds_other("a.jpg", "s", "p"));
        assert!(m.holds_other("a.jpg", "t", "p"));
        assert!(m.holds_other("a.jpg", "s", "q"));
        assert!(!m.holds_other("b.jpg", "t", "q"));
    }

    #[test]
    fn duplicate_content_resolves_to_first_path() {
        let mut m = CacheManifest::empty();
        m.insert("thumbs/a.jpg".into(), "same".into(), "p".into());
        m.insert("thumbs/b.jpg".into(), "same".into(), "p".into());

        assert_eq!(m.len(), 2);
        assert_eq!(
            m.content_index.get("same:p"),
            Some(&"thumbs/a.jpg".to_string())
        );
    }

    #[test]
    fn content_index_rebuilt_on_load() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("thumbs/y.jpg".into(), "s".into(), "p".into());
        m.insert("thumbs/x.jpg".into(), "s".into(), "p".into());
        m.insert("thumbs/z.jpg".into(), "s2".into(), "p2".into());
        m.save(tmp.path()).unwrap();

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(
            loaded.content_index.get("s:p"),
            Some(&"thumbs/x.jpg".to_string())
        );
        assert_eq!(
            loaded.content_index.get("s2:p2"),
            Some(&"thumbs/z.jpg".to_string())
        );
    }

    // =========================================================================
    // Save / Load
    // =========================================================================

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("x.jpg".into(), "s1".into(), "p1".into());
        m.insert("y.jpg".into(), "s2".into(), "p2".into());

        m.save(tmp.path()).unwrap();
        let loaded = CacheManifest::load(tmp.path());

        assert_eq!(loaded.version, MANIFEST_VERSION);
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.entries["x.jpg"],
            CacheEntry {
                source_hash: "s1".into(),
                params_hash: "p1".into()
            }
        );
    }

    #[test]
    fn saved_manifest_is_independent_of_insert_order() {
        let tmp_a = TempDir::new().unwrap();
        let tmp_b = TempDir::new().unwrap();

        let mut a = CacheManifest::empty();
        a.insert("thumbs/1.jpg".into(), "s1".into(), "p".into());
        a.insert("thumbs/2.jpg".into(), "s2".into(), "p".into());
        a.save(tmp_a.path()).unwrap();

        let mut b = CacheManifest::empty();
        b.insert("thumbs/2.jpg".into(), "s2".into(), "p".into());
        b.insert("thumbs/1.jpg".into(), "s1".into(), "p".into());
        b.save(tmp_b.path()).unwrap();

        assert_eq!(
            fs::read(manifest_path(tmp_a.path())).unwrap(),
            fs::read(manifest_path(tmp_b.path())).unwrap()
        );
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(manifest_path(tmp.path()), "not json").unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"a": {{"source_hash":"h","params_hash":"p"}}}}}}"#,
            MANIFEST_VERSION + 1
        );
        fs::write(manifest_path(tmp.path()), json).unwrap();
        assert!(CacheManifest::load(tmp.path()).is_empty());
    }

    // =========================================================================
    // Hash functions
    // =========================================================================

    #[test]
    fn hash_file_deterministic_and_content_sensitive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.bin");

        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        assert_eq!(h1, hash_file(&path).unwrap());
        assert_eq!(h1.len(), 64);

        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
    }

    #[test]
    fn hash_thumbnail_params_deterministic() {
        assert_eq!(
            hash_thumbnail_params((300, 300), 67, Some((0.5, 0))),
            hash_thumbnail_params((300, 300), 67, Some((0.5, 0)))
        );
    }

    #[test]
    fn hash_thumbnail_params_varies_with_every_input() {
        let base = hash_thumbnail_params((300, 300), 67, None);
        assert_ne!(base, hash_thumbnail_params((320, 180), 67, None));
        assert_ne!(base, hash_thumbnail_params((300, 300), 90, None));
        assert_ne!(base, hash_thumbnail_params((300, 300), 67, Some((0.5, 0))));
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats {
            hits: 5,
            copies: 0,
            misses: 2,
        };
        assert_eq!(format!("{}", s), "5 cached, 2 encoded (7 total)");
    }

    #[test]
    fn cache_stats_display_with_copies() {
        let s = CacheStats {
            hits: 3,
            copies: 2,
            misses: 1,
        };
        assert_eq!(format!("{}", s), "3 cached, 2 copied, 1 encoded (6 total)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let mut s = CacheStats::default();
        s.miss();
        s.miss();
        s.miss();
        assert_eq!(format!("{}", s), "3 encoded");
    }
}
