//! Bootstrap configuration file.
//!
//! The file is plain JSON with camelCase keys. It is read once by the CLI and
//! its values are passed explicitly into the pipelines.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// User-editable defaults for the download pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperConfig {
    /// Keywords searched when none are given on the command line.
    pub search_keywords: Vec<String>,

    /// Download cache file. `null` disables caching.
    pub presentations_download_cache_file_path: Option<PathBuf>,

    /// Directory downloaded presentations are written to.
    pub download_directory: PathBuf,

    /// Pause between keyword searches.
    pub search_delay_secs: u64,

    /// Timeout for a single presentation download.
    pub request_timeout_secs: u64,

    /// Upper bound of search results requested per keyword.
    pub max_results_per_keyword: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_keywords: vec![
                "Search Query 1".to_string(),
                "Search Query 2".to_string(),
                "Search Query 3 after:2019".to_string(),
            ],
            presentations_download_cache_file_path: Some(PathBuf::from(
                "presentation_download_cache.json",
            )),
            download_directory: PathBuf::from("presentations/"),
            search_delay_secs: 30,
            request_timeout_secs: 10,
            max_results_per_keyword: 100,
        }
    }
}

impl ScraperConfig {
    /// Read the config at `path`, writing the built-in defaults there first
    /// if the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config = serde_json::from_str(&content)?;
            log::debug!("Loaded config from {}", path.display());
            return Ok(config);
        }

        log::info!(
            "{} does not exist. Will create it with default values",
            path.display()
        );
        let config = Self::default();
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(&config)?)?;
        Ok(config)
    }
}
