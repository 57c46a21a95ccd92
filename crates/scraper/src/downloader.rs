//! Keyword search, cache-aware download and file persistence.

use crate::cache::DownloadCache;
use crate::http::{FetchedResponse, Fetcher};
use crate::search::SearchProvider;
use pptxer_core::{
    ensure_path_correctness, CacheEntry, Error, Result, ScraperConfig, PRESENTATION_EXTENSION,
};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;
use url::Url;

/// Longest file name (in characters) kept before the extension check.
const MAX_FILE_NAME_CHARS: usize = 248;

/// Used when neither the header nor the URL yields a name.
const FALLBACK_FILE_NAME: &str = "presentation";

/// Regex to pull the plain `filename=` parameter out of `content-disposition`.
static CONTENT_DISPOSITION_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|;)\s*filename\s*=\s*([^;]+)").unwrap());

/// Tunables for one downloader.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Pause between two keyword searches.
    pub search_delay: Duration,

    /// Results requested from the search provider per keyword.
    pub max_results_per_keyword: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            search_delay: Duration::from_secs(30),
            max_results_per_keyword: 100,
        }
    }
}

impl From<&ScraperConfig> for DownloadSettings {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            search_delay: Duration::from_secs(config.search_delay_secs),
            max_results_per_keyword: config.max_results_per_keyword,
        }
    }
}

/// Finds presentations by keyword and downloads the ones not cached yet.
pub struct PresentationDownloader<S, F> {
    search: S,
    fetcher: F,
    settings: DownloadSettings,
}

impl<S: SearchProvider, F: Fetcher> PresentationDownloader<S, F> {
    pub fn new(search: S, fetcher: F) -> Self {
        Self {
            search,
            fetcher,
            settings: DownloadSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DownloadSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Search for presentations matching `search_keywords`, download them
    /// into `download_dir` and return their local paths.
    ///
    /// Cached downloads come first, followed by newly downloaded files in
    /// discovery order. A URL that fails to download is logged and skipped.
    pub fn scrape_presentations_to_dir(
        &self,
        search_keywords: &[String],
        download_dir: Option<&Path>,
        cache_file: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        if search_keywords.is_empty() {
            return Err(Error::InvalidArgument(
                "search keywords must contain at least one keyword".to_string(),
            ));
        }
        let download_dir = resolve_download_dir(search_keywords, download_dir);
        log::info!(
            "Will start scraping with search_keywords = {:?}, download_dir = {}, cache_file = {:?}",
            search_keywords,
            download_dir.display(),
            cache_file
        );

        let mut cache = DownloadCache::load_cleaned(cache_file)?;
        let urls = self.scrape_presentation_urls(search_keywords);
        let (mut paths, misses) = partition_by_cache(&urls, &cache);
        log::info!(
            "{} out of {} are already cached. Will attempt to download those that aren't cached",
            paths.len(),
            paths.len() + misses.len()
        );

        for url in misses {
            match self.download(&url, &download_dir) {
                Ok(path) => {
                    if let Err(e) = cache.append(CacheEntry::new(url.as_str(), &path)) {
                        log::warn!("Unable to record {} in the download cache: {}", url, e);
                    }
                    paths.push(path);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    log::info!("Due to an error downloading the file, will skip {}", url);
                }
            }
        }

        Ok(paths)
    }

    /// Run one search per keyword and collect every result URL.
    fn scrape_presentation_urls(&self, search_keywords: &[String]) -> Vec<String> {
        let mut urls = Vec::new();

        for (i, keyword) in search_keywords.iter().enumerate() {
            let query = search_query(keyword);
            log::info!("Searching for '{}'", query);
            match self
                .search
                .search(&query, self.settings.max_results_per_keyword)
            {
                Ok(results) => {
                    log::debug!("'{}' returned {} results", query, results.len());
                    urls.extend(results);
                }
                Err(e) => log::warn!("Skipping keyword '{}': {}", keyword, e),
            }

            if i + 1 < search_keywords.len() && !self.settings.search_delay.is_zero() {
                log::info!(
                    "Will sleep for {} seconds to avoid rate limit",
                    self.settings.search_delay.as_secs()
                );
                thread::sleep(self.settings.search_delay);
            }
        }

        urls
    }

    /// Fetch `url` and write the body to a fresh file under `download_dir`.
    fn download(&self, url: &str, download_dir: &Path) -> Result<PathBuf> {
        let response = self.fetcher.get(url)?;
        if !response.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let file_name = filename_from_response(&response);
        let path = ensure_path_correctness(&download_dir.join(file_name))?;
        fs::write(&path, &response.body)?;
        log::info!("Downloaded {} to {}", url, path.display());
        Ok(path)
    }
}

/// `"<keyword> filetype:pptx"`
pub fn search_query(keyword: &str) -> String {
    format!("{} filetype:{}", keyword, PRESENTATION_EXTENSION)
}

/// An empty or absent directory defaults to the keywords joined with `_`.
fn resolve_download_dir(search_keywords: &[String], download_dir: Option<&Path>) -> PathBuf {
    match download_dir.filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(search_keywords.join("_")),
    }
}

/// Split unique URLs into cached paths and URLs that still need fetching.
fn partition_by_cache(urls: &[String], cache: &DownloadCache) -> (Vec<PathBuf>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    let mut misses = Vec::new();

    for url in urls {
        if !seen.insert(url.as_str()) {
            continue;
        }
        match cache.lookup(url) {
            Some(entry) => hits.push(entry.path.clone()),
            None => misses.push(url.clone()),
        }
    }

    (hits, misses)
}

/// Derive a local file name for a downloaded presentation.
///
/// Prefers the `content-disposition` file name, then the last segment of the
/// final URL. The name is reduced to its last path component, truncated, and
/// always ends in `.pptx`.
pub fn filename_from_response(response: &FetchedResponse) -> String {
    let from_header = response
        .content_disposition
        .as_deref()
        .and_then(|cd| CONTENT_DISPOSITION_FILENAME.captures(cd))
        .map(|caps| caps[1].to_string());

    let raw = match from_header {
        Some(name) => {
            log::debug!("File name retrieved from content-disposition header: {}", name);
            name
        }
        None => file_name_from_url(&response.final_url),
    };

    let name = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let name = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
    let name = if name.is_empty() { FALLBACK_FILE_NAME } else { name };

    let mut file_name: String = name.chars().take(MAX_FILE_NAME_CHARS).collect();
    let extension = format!(".{}", PRESENTATION_EXTENSION);
    if !file_name.to_lowercase().ends_with(&extension) {
        file_name.push_str(&extension);
    }
    log::debug!("Final file name: {}", file_name);
    file_name
}

/// Last path segment of `url`, ignoring query and fragment.
fn file_name_from_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let path = url.split(|c| c == '?' || c == '#').next().unwrap_or_default();
            path.rsplit('/').next().unwrap_or_default().to_string()
        }
    }
}
