//! Blocking HTTP fetch of presentation files.

use crate::headers::random_headers;
use pptxer_core::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;
use std::time::Duration;

/// The parts of an HTTP response the downloader needs.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    /// URL after following redirects.
    pub final_url: String,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of the downloader.
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<FetchedResponse>;
}

/// [`Fetcher`] backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TransportError {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchedResponse> {
        let transport = |e: reqwest::Error| Error::TransportError {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .headers(random_headers())
            .send()
            .map_err(transport)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(transport)?.to_vec();

        log::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedResponse {
            status,
            final_url,
            content_disposition,
            body,
        })
    }
}
