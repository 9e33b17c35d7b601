//! Page fetching boundary.
//!
//! A [`PageFetcher`] turns a URL into page source. Everything downstream works
//! on a parsed [`Page`], so the extraction code never knows whether the HTML
//! came over HTTP, from a headless browser, or from an in-memory fixture.

#[cfg(feature = "browser")]
mod browser;
mod fixture;
mod http;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::utils::collapse_whitespace;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use fixture::FixtureFetcher;
pub use http::HttpFetcher;

/// Source of page bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body at `url` as text.
    ///
    /// Fails with [`AppError::Fetch`] when the page cannot be retrieved.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetch a page and parse it as HTML.
pub async fn fetch_page<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Page> {
    let body = fetcher.fetch_text(url).await?;
    Ok(Page::parse(url, &body))
}

/// A parsed HTML page and the URL it came from.
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// First element matching `selector`, or [`AppError::ElementNotFound`].
    pub fn find(&self, selector: &str) -> Result<ElementRef<'_>> {
        let sel = parse_selector(selector)?;
        self.document
            .select(&sel)
            .next()
            .ok_or_else(|| AppError::element_not_found(selector, &self.url))
    }

    /// All elements matching `selector`, possibly none.
    pub fn find_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.document.select(&sel).collect())
    }
}

/// Visible text of an element with whitespace collapsed.
pub fn text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Attribute value of an element, if set.
pub fn attribute(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
