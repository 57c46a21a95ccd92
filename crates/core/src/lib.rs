//! Core domain types, path sanitizing, length statistics and configuration
//! for presentation scraping and text extraction.

pub mod config;
pub mod error;
pub mod paths;
pub mod stats;
pub mod types;

pub use config::{ScraperConfig, DEFAULT_CONFIG_FILE};
pub use error::{Error, Result};
pub use paths::ensure_path_correctness;
pub use stats::{calculate_length_stats, LabeledLengthStats, LengthStats, StatValue};
pub use types::{
    CacheEntry, PresentationDocument, PresentationFormat, Slide, PRESENTATION_EXTENSION,
};
