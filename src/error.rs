// src/error.rs

//! Unified error handling for the scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Link pattern is not a valid regex
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page could not be fetched or navigated to
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// An expected structural element is missing from the page
    #[error("Element not found: '{selector}' on {context}")]
    ElementNotFound { selector: String, context: String },

    /// A collected link does not have the expected shape
    #[error("Invalid link {url}: {message}")]
    InvalidLink { url: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a missing-element error.
    pub fn element_not_found(selector: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            context: context.into(),
        }
    }

    /// Create an invalid-link error.
    pub fn invalid_link(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidLink {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error is limited to one page (network, page structure or
    /// a malformed link to it).
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::ElementNotFound { .. }
                | Self::InvalidLink { .. }
                | Self::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_failures_are_classified() {
        assert!(AppError::fetch("https://example.com", "timeout").is_page_failure());
        assert!(AppError::element_not_found("table", "https://example.com").is_page_failure());
        assert!(AppError::invalid_link("https://example.com/TeamStats", "no suffix").is_page_failure());
        assert!(!AppError::validation("bad header").is_page_failure());
    }

    #[test]
    fn element_not_found_message_names_selector() {
        let err = AppError::element_not_found("#matchlogs_for", "https://example.com/a");
        assert_eq!(
            err.to_string(),
            "Element not found: '#matchlogs_for' on https://example.com/a"
        );
    }
}
