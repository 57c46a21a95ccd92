//! Keyword search for presentation URLs.

use crate::headers::random_headers;
use pptxer_core::{Error, Result};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// HTML endpoint of DuckDuckGo, which needs no API key.
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Result pages requested per query at most.
const MAX_PAGES: usize = 5;

/// Answers a free-text query with result URLs.
pub trait SearchProvider {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

/// [`SearchProvider`] that scrapes the DuckDuckGo HTML results page.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::SearchError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
        })
    }

    /// Query a different results endpoint (same HTML layout).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn fetch_page(&self, query: &str, offset: usize) -> Result<String> {
        let offset = offset.to_string();
        let url = Url::parse_with_params(&self.endpoint, &[("q", query), ("s", offset.as_str())])
            .map_err(|e| Error::SearchError(format!("Invalid search endpoint: {}", e)))?;

        self.client
            .get(url)
            .headers(random_headers())
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| {
                Error::SearchError(format!("Search request for '{}' failed: {}", query, e))
            })
    }
}

impl SearchProvider for DuckDuckGoSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();

        for page in 0..MAX_PAGES {
            if urls.len() >= max_results {
                break;
            }

            let html = self.fetch_page(query, urls.len())?;
            let before = urls.len();
            for link in parse_result_links(&html)? {
                if urls.len() >= max_results {
                    break;
                }
                if !urls.contains(&link) {
                    urls.push(link);
                }
            }

            log::debug!(
                "Page {} for '{}' added {} results",
                page + 1,
                query,
                urls.len() - before
            );
            if urls.len() == before {
                break;
            }
        }

        Ok(urls)
    }
}

/// Extract target URLs from a DuckDuckGo HTML results page.
pub fn parse_result_links(html: &str) -> Result<Vec<String>> {
    let selector = Selector::parse("a.result__a")
        .map_err(|e| Error::SearchError(format!("Invalid result selector: {}", e)))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(decode_result_href)
        .collect())
}

/// Result links point at a `/l/?uddg=<target>` redirect; unwrap it.
fn decode_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
        return Some(target.into_owned());
    }
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
