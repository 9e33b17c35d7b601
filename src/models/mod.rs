// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod rating;
mod row;
mod schema;
mod selectors;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, JoinConfig, MatchesConfig, RatingsConfig, SinkConfig, TeamStatsConfig,
};
pub use rating::{NameNormalizer, RatingBook, RatingTable};
pub use row::{NormalizedRow, RawRow};
pub use schema::{
    MATCH_CARD_FIELDS, MATCH_LOG_FIELDS, MATCH_RESULTS_HEADER, RowSchema, TEAM_FIELD,
};
pub use selectors::{LinkSelectors, TableSelectors};
