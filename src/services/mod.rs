//! Service layer for the scraper.
//!
//! This module contains the business logic for:
//! - Row and link extraction (`extract_rows`, `extract_links`)
//! - Row validation and keying (`normalize`, `team_from_url`)
//! - Rating tables (`fetch_ratings`, `parse_rating_csv`)
//! - Rating annotation (`annotate`)

mod extractor;
mod joiner;
mod normalizer;
mod ratings;

pub use extractor::{extract_links, extract_rows};
pub use joiner::{JoinFields, JoinReport, LookupMiss, annotate};
pub use normalizer::{Normalized, normalize, team_from_url};
pub use ratings::{fetch_ratings, parse_rating_csv};
