//! Headless Chrome fetcher for script-rendered pages.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::fetch::PageFetcher;
use crate::models::CrawlerConfig;

/// Renders each URL in a fresh tab and returns the resulting DOM as HTML.
pub struct BrowserFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    render_wait: Duration,
}

impl BrowserFetcher {
    /// Launch a headless browser.
    pub async fn launch(config: &CrawlerConfig) -> Result<Self> {
        let browser_config = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(config.timeout_secs))
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| AppError::config(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::fetch("chrome", e))?;

        // The CDP event loop must be polled for the browser to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            render_wait: Duration::from_millis(config.render_wait_ms),
        })
    }

    /// Close the browser and stop its event loop.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            log::warn!("Browser did not close cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("Rendering {}", url);
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let rendered = async {
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::fetch(url, e))?;
            tokio::time::sleep(self.render_wait).await;
            page.content().await.map_err(|e| AppError::fetch(url, e))
        }
        .await;

        if let Err(e) = page.close().await {
            log::debug!("Failed to close tab for {}: {}", url, e);
        }
        rendered
    }
}
