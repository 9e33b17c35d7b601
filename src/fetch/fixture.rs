//! In-memory fetcher for offline runs and tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::fetch::PageFetcher;

/// Serves canned bodies by exact URL and records every request.
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.insert(url.into(), body.into());
    }

    /// Register a file's contents as the body for `url`.
    pub fn insert_file(&mut self, url: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let body = fs::read_to_string(path)?;
        self.insert(url, body);
        Ok(())
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "no fixture registered"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_pages_and_records_requests() {
        let fetcher = FixtureFetcher::new().with_page("https://a/", "<p>a</p>");

        assert_eq!(fetcher.fetch_text("https://a/").await.unwrap(), "<p>a</p>");
        assert!(matches!(
            fetcher.fetch_text("https://b/").await,
            Err(AppError::Fetch { .. })
        ));
        assert_eq!(fetcher.requests(), vec!["https://a/", "https://b/"]);
    }

    #[test]
    fn insert_file_reads_body() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("page.html");
        fs::write(&path, "<html></html>").unwrap();

        let mut fetcher = FixtureFetcher::new();
        fetcher.insert_file("https://a/", &path).unwrap();
        assert!(fetcher.insert_file("https://b/", tmp.path().join("nope")).is_err());
        assert_eq!(fetcher.pages.len(), 1);
    }
}
