//! Persisted mapping from source URL to downloaded file.
//!
//! The cache file is a JSON array of `{url, path}` objects. It is rewritten
//! in full after cleanup and after every appended entry. There is no
//! protection against concurrent writers: the last writer wins.

use pptxer_core::{CacheEntry, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Download cache owned by a single downloader run.
#[derive(Debug, Default)]
pub struct DownloadCache {
    file: Option<PathBuf>,
    entries: Vec<CacheEntry>,
}

impl DownloadCache {
    /// A cache that is never read nor persisted.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Load the cache at `cache_file`, dropping entries whose file is gone.
    ///
    /// `None` disables caching. A missing file is created with an empty
    /// array. The cleaned entries are written back before returning.
    pub fn load_cleaned(cache_file: Option<&Path>) -> Result<Self> {
        let file = match cache_file {
            Some(file) => file,
            None => {
                log::debug!("No cache file configured. Caching is disabled");
                return Ok(Self::disabled());
            }
        };

        let entries: Vec<CacheEntry> = if file.exists() {
            let content = fs::read_to_string(file)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            log::info!("{} does not exist. Will create an empty cache", file.display());
            Vec::new()
        };

        let loaded = entries.len();
        let entries: Vec<CacheEntry> = entries.into_iter().filter(CacheEntry::is_valid).collect();
        if entries.len() < loaded {
            log::debug!(
                "Removed {} cache entries whose files no longer exist",
                loaded - entries.len()
            );
        }

        let cache = Self {
            file: Some(file.to_path_buf()),
            entries,
        };
        cache.persist()?;
        Ok(cache)
    }

    /// Whether entries are persisted to a file.
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry recorded for `url`, if any.
    pub fn lookup(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.iter().find(|entry| entry.url == url)
    }

    /// Record a completed download and rewrite the cache file.
    pub fn append(&mut self, entry: CacheEntry) -> Result<()> {
        log::debug!("Caching {} -> {}", entry.url, entry.path.display());
        self.entries.push(entry);
        self.persist()
    }

    /// Write all entries, replacing the file via a sibling temp file.
    fn persist(&self) -> Result<()> {
        let file = match &self.file {
            Some(file) => file,
            None => return Ok(()),
        };

        if let Some(dir) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut tmp = file.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string(&self.entries)?)?;
        fs::rename(&tmp, file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) -> PathBuf {
        fs::write(path, b"pptx").unwrap();
        path.to_path_buf()
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = DownloadCache::load_cleaned(None).unwrap();
        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
        cache.append(CacheEntry::new("https://a", "a.pptx")).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("state").join("cache.json");

        let cache = DownloadCache::load_cleaned(Some(&file)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(fs::read_to_string(&file).unwrap(), "[]");
    }

    #[test]
    fn test_append_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = DownloadCache::load_cleaned(Some(&file)).unwrap();
        let mut paths = Vec::new();
        for i in 0..3 {
            let path = touch(&dir.path().join(format!("deck{}.pptx", i)));
            cache
                .append(CacheEntry::new(format!("https://example.com/{}", i), &path))
                .unwrap();
            paths.push(path);
        }

        let reloaded = DownloadCache::load_cleaned(Some(&file)).unwrap();
        assert_eq!(reloaded.entries(), cache.entries());
        assert_eq!(
            reloaded.lookup("https://example.com/1").map(|e| e.path.clone()),
            Some(paths[1].clone())
        );
        assert!(reloaded.lookup("https://example.com/9").is_none());
    }

    #[test]
    fn test_deleted_files_are_purged_for_good() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = DownloadCache::load_cleaned(Some(&file)).unwrap();
        let keep = touch(&dir.path().join("keep.pptx"));
        let gone = touch(&dir.path().join("gone.pptx"));
        cache.append(CacheEntry::new("https://keep", &keep)).unwrap();
        cache.append(CacheEntry::new("https://gone", &gone)).unwrap();

        fs::remove_file(&gone).unwrap();
        let reloaded = DownloadCache::load_cleaned(Some(&file)).unwrap();
        assert_eq!(reloaded.entries(), &[CacheEntry::new("https://keep", &keep)]);

        // Recreating the file must not resurrect the purged entry.
        touch(&gone);
        let again = DownloadCache::load_cleaned(Some(&file)).unwrap();
        assert_eq!(again.len(), 1);
        assert!(again.lookup("https://gone").is_none());
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");
        let deck = touch(&dir.path().join("deck.pptx"));

        let mut cache = DownloadCache::load_cleaned(Some(&file)).unwrap();
        cache.append(CacheEntry::new("https://x/deck.pptx", &deck)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(json[0]["url"], "https://x/deck.pptx");
        assert_eq!(json[0]["path"], deck.to_str().unwrap());
    }

    #[test]
    fn test_corrupt_cache_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");
        fs::write(&file, "{not an array").unwrap();
        assert!(DownloadCache::load_cleaned(Some(&file)).is_err());
    }
}
