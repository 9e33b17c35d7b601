// src/pipeline/matches.rs

//! Match results pipeline.

use std::ops::RangeInclusive;

use crate::error::Result;
use crate::fetch::{PageFetcher, fetch_page};
use crate::models::{Config, RowSchema};
use crate::services::{extract_rows, normalize};
use crate::storage::RowSink;

use super::{
    RunSummary, UnitOutcome, UnitPolicy, check_sink_header, handle_unit_error, pause, write_rows,
};

/// Scrape match cards for each week of a season into `sink`.
///
/// The sink should use the `season, match_week, home_team, away_team, score`
/// layout.
pub async fn run_matches<F, S>(
    config: &Config,
    fetcher: &F,
    sink: &mut S,
    season: &str,
    weeks: RangeInclusive<u32>,
    policy: UnitPolicy,
) -> Result<RunSummary>
where
    F: PageFetcher + ?Sized,
    S: RowSink + ?Sized,
{
    let schema = RowSchema::match_cards();
    let mut produced: Vec<&str> = schema.fields().iter().map(String::as_str).collect();
    produced.extend(["season", "match_week"]);
    check_sink_header(&*sink, &produced)?;

    let mut summary = RunSummary::start();
    let dedup_key = config
        .sink
        .dedup
        .then_some(config.sink.match_key.as_slice());

    log::info!(
        "Scraping match results for season {} weeks {}-{}",
        season,
        weeks.start(),
        weeks.end()
    );

    for (i, week) in weeks.enumerate() {
        if i > 0 {
            pause(config.crawler.request_delay_ms).await;
        }
        summary.units += 1;

        let url = config.matches.url_for(season, week);
        match scrape_week(config, fetcher, sink, &schema, season, week, &url, dedup_key).await {
            Ok(outcome) => summary.record(&outcome),
            Err(e) => handle_unit_error(policy, &mut summary, &format!("week {week}"), e)?,
        }
    }

    Ok(summary.finish(&format!("Match results {season}")))
}

#[allow(clippy::too_many_arguments)]
async fn scrape_week<F, S>(
    config: &Config,
    fetcher: &F,
    sink: &mut S,
    schema: &RowSchema,
    season: &str,
    week: u32,
    url: &str,
    dedup_key: Option<&[String]>,
) -> Result<UnitOutcome>
where
    F: PageFetcher + ?Sized,
    S: RowSink + ?Sized,
{
    let page = fetch_page(fetcher, url).await?;
    let raw = extract_rows(&page, &config.matches.table)?;
    let extracted = raw.len();

    let week = week.to_string();
    let normalized = normalize(raw, schema, &[("season", season), ("match_week", &week)]);
    let written = write_rows(sink, &normalized.rows, dedup_key)?;

    log::info!(
        "Week {}: {} cards, {} kept, {} dropped",
        week,
        extracted,
        normalized.rows.len(),
        normalized.dropped
    );

    Ok(UnitOutcome {
        extracted,
        dropped: normalized.dropped,
        written,
    })
}
