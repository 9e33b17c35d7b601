//! Team match-log pipeline.

use crate::error::{AppError, Result};
use crate::fetch::{PageFetcher, fetch_page};
use crate::models::{Config, RowSchema, TEAM_FIELD};
use crate::services::{extract_links, extract_rows, normalize, team_from_url};
use crate::storage::RowSink;

use super::{
    RunSummary, UnitOutcome, UnitPolicy, check_sink_header, handle_unit_error, pause, write_rows,
};

/// Scrape the match log of every team linked from the season's league table.
///
/// The league table page itself is required: failing to fetch it or to find
/// the link container is returned as an error. Each team page is then one
/// unit of work. The sink should use the match-log fields plus `team`.
pub async fn run_team_stats<F, S>(
    config: &Config,
    fetcher: &F,
    sink: &mut S,
    season: &str,
    policy: UnitPolicy,
) -> Result<RunSummary>
where
    F: PageFetcher + ?Sized,
    S: RowSink + ?Sized,
{
    let schema = RowSchema::match_logs();
    let mut produced: Vec<&str> = schema.fields().iter().map(String::as_str).collect();
    produced.push(TEAM_FIELD);
    check_sink_header(&*sink, &produced)?;

    let mut summary = RunSummary::start();
    let dedup_key = config
        .sink
        .dedup
        .then_some(config.sink.team_stats_key.as_slice());

    let index_url = config.team_stats.index_url(season);
    log::info!("Collecting team links from {}", index_url);
    let links = {
        let page = fetch_page(fetcher, &index_url).await?;
        extract_links(&page, &config.team_stats.links)?
    };

    if links.is_empty() {
        log::warn!("No team links found on {}", index_url);
    } else {
        log::info!("Found {} teams", links.len());
    }

    for link in &links {
        summary.units += 1;

        let Some(team) = team_from_url(link, &config.team_stats.url_suffix) else {
            let error = AppError::invalid_link(
                link.as_str(),
                format!(
                    "no '{}' suffix to derive a team name from",
                    config.team_stats.url_suffix
                ),
            );
            handle_unit_error(policy, &mut summary, link, error)?;
            continue;
        };

        pause(config.crawler.request_delay_ms).await;
        match scrape_team(config, fetcher, sink, &schema, &team, link, dedup_key).await {
            Ok(outcome) => summary.record(&outcome),
            Err(e) => handle_unit_error(policy, &mut summary, &team, e)?,
        }
    }

    Ok(summary.finish(&format!("Team match logs {season}")))
}

async fn scrape_team<F, S>(
    config: &Config,
    fetcher: &F,
    sink: &mut S,
    schema: &RowSchema,
    team: &str,
    url: &str,
    dedup_key: Option<&[String]>,
) -> Result<UnitOutcome>
where
    F: PageFetcher + ?Sized,
    S: RowSink + ?Sized,
{
    let page = fetch_page(fetcher, url).await?;
    let raw = extract_rows(&page, &config.team_stats.table)?;
    let extracted = raw.len();

    let normalized = normalize(raw, schema, &[(TEAM_FIELD, team)]);
    let written = write_rows(sink, &normalized.rows, dedup_key)?;

    log::info!(
        "{}: {} rows, {} kept, {} dropped",
        team,
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
