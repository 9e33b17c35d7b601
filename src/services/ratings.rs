//! Club rating source.
//!
//! The rating site serves a CSV snapshot per date; one snapshot is taken per
//! season and loaded into a [`RatingTable`].

use crate::error::{AppError, Result};
use crate::fetch::PageFetcher;
use crate::models::{NameNormalizer, RatingTable, RatingsConfig};

/// Parse a rating CSV document into a season's table.
///
/// Rows with an empty name or rating are skipped. When both `country_column`
/// and `country` are set (and non-empty), only matching rows are kept.
pub fn parse_rating_csv(
    season: &str,
    text: &str,
    config: &RatingsConfig,
    normalizer: &NameNormalizer,
) -> Result<RatingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            AppError::validation(format!("rating source has no '{name}' column"))
        })
    };
    let name_idx = column(&config.name_column)?;
    let rating_idx = column(&config.rating_column)?;
    let country_filter = match (&config.country_column, &config.country) {
        (Some(col), Some(value)) if !col.is_empty() && !value.is_empty() => {
            Some((column(col)?, value.as_str()))
        }
        _ => None,
    };

    let mut table = RatingTable::new(season, normalizer.clone());
    for record in reader.records() {
        let record = record?;
        if let Some((idx, value)) = country_filter {
            if record.get(idx) != Some(value) {
                continue;
            }
        }
        match (record.get(name_idx), record.get(rating_idx)) {
            (Some(name), Some(rating)) if !name.is_empty() && !rating.is_empty() => {
                table.insert(name, rating);
            }
            _ => continue,
        }
    }

    log::info!("Loaded {} ratings for season {}", table.len(), season);
    Ok(table)
}

/// Fetch and parse the rating table for one season.
pub async fn fetch_ratings<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &RatingsConfig,
    season: &str,
    normalizer: &NameNormalizer,
) -> Result<RatingTable> {
    let url = config.url_for(season);
    log::info!("Fetching ratings for season {} from {}", season, url);
    let text = fetcher.fetch_text(&url).await?;
    parse_rating_csv(season, &text, config, normalizer)
}
