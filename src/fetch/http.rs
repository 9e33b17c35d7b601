// src/fetch/http.rs

//! Plain HTTP fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::fetch::PageFetcher;
use crate::models::CrawlerConfig;

/// Fetches pages with a configured reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}
