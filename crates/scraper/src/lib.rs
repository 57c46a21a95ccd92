//! Download-and-cache pipeline for presentation files.
//!
//! Keywords are turned into `filetype:pptx` searches, the result URLs are
//! checked against a self-cleaning download cache, and everything not cached
//! yet is fetched and written to disk.

pub mod cache;
pub mod downloader;
pub mod headers;
pub mod http;
pub mod search;

pub use cache::DownloadCache;
pub use downloader::{
    filename_from_response, search_query, DownloadSettings, PresentationDownloader,
};
pub use http::{FetchedResponse, Fetcher, HttpFetcher};
pub use search::{DuckDuckGoSearch, SearchProvider};
