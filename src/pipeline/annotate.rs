//! Rating annotation pipeline.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::fetch::PageFetcher;
use crate::models::{Config, NameNormalizer, RatingBook};
use crate::services::{JoinFields, JoinReport, annotate, fetch_ratings};
use crate::storage::{CsvSink, read_rows};

use super::{UnitPolicy, pause, write_rows};

/// Reload match results from `input`, attach ratings, and append the
/// annotated rows to `output`.
///
/// One rating table is fetched per distinct season in the input. Under
/// [`UnitPolicy::Skip`] a season whose table cannot be fetched or parsed is
/// left out of the book, and its rows get the absent marker.
pub async fn run_annotate<F>(
    config: &Config,
    fetcher: &F,
    input: &Path,
    output: &Path,
    policy: UnitPolicy,
) -> Result<JoinReport>
where
    F: PageFetcher + ?Sized,
{
    if same_file(input, output)? {
        return Err(AppError::config(
            "annotated output must be a different file from the input",
        ));
    }

    let fields = JoinFields::from_config(&config.join);
    let (header, mut rows) = read_rows(input)?;
    for field in [&fields.season, &fields.home, &fields.away] {
        if !header.contains(field) {
            return Err(AppError::validation(format!(
                "{} has no '{}' column",
                input.display(),
                field
            )));
        }
    }
    log::info!("Loaded {} rows from {}", rows.len(), input.display());

    let mut seasons: Vec<String> = Vec::new();
    for row in &rows {
        if let Some(season) = row.get(&fields.season) {
            if !seasons.iter().any(|s| s == season) {
                seasons.push(season.to_string());
            }
        }
    }

    let normalizer = NameNormalizer::from_config(&config.join);
    let mut book = RatingBook::new();
    for (i, season) in seasons.iter().enumerate() {
        if i > 0 {
            pause(config.crawler.request_delay_ms).await;
        }
        match fetch_ratings(fetcher, &config.ratings, season, &normalizer).await {
            Ok(table) => book.insert(table),
            Err(e) if policy == UnitPolicy::Skip => {
                log::warn!("No ratings for season {}: {}", season, e);
            }
            Err(e) => return Err(e),
        }
    }

    let report = annotate(&mut rows, &book, &fields, &config.join.absent_marker);

    let out_header = header.extended(&[&fields.home_output, &fields.away_output]);
    let mut sink = CsvSink::open(output, out_header)?;
    let dedup_key = config
        .sink
        .dedup
        .then_some(config.sink.match_key.as_slice());
    let written = write_rows(&mut sink, &rows, dedup_key)?;
    log::info!("Wrote {} annotated rows to {}", written, sink.path().display());

    Ok(report)
}

fn same_file(input: &Path, output: &Path) -> Result<bool> {
    if input == output {
        return Ok(true);
    }
    if !output.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(input)? == fs::canonicalize(output)?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::fetch::FixtureFetcher;
    use crate::models::{NormalizedRow, RowSchema};
    use crate::storage::RowSink;

    fn match_row(season: &str, week: &str, home: &str, away: &str) -> NormalizedRow {
        [
            ("season", season),
            ("match_week", week),
            ("home_team", home),
            ("away_team", away),
            ("score", "1 - 0"),
        ]
        .into_iter()
        .collect()
    }

    fn write_input(path: &Path) {
        let mut sink = CsvSink::open(path, RowSchema::match_results()).unwrap();
        sink.append(&[
            match_row("2021", "1", "Arsenal FC", "Manchester City"),
            match_row("2012", "1", "Luton Town", "Arsenal"),
            match_row("2013", "1", "Arsenal", "Chelsea"),
        ])
        .unwrap();
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.crawler.request_delay_ms = 0;
        config
    }

    #[tokio::test]
    async fn annotates_with_per_season_tables() {
        let config = config();
        let fetcher = FixtureFetcher::new()
            .with_page(
                config.ratings.url_for("2021"),
                "Rank,Club,Country,Level,Elo,From,To\n\
                 1,Man City,ENG,1,2050,2021-07-30,2021-08-14\n\
                 2,Arsenal,ENG,1,1900,2021-07-30,2021-08-14\n",
            )
            .with_page(
                config.ratings.url_for("2012"),
                "Rank,Club,Country,Level,Elo,From,To\n\
                 1,Arsenal,ENG,1,1800,2012-07-30,2012-08-14\n",
            );

        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("matches.csv");
        let output = tmp.path().join("matches_elo.csv");
        write_input(&input);

        let report = run_annotate(&config, &fetcher, &input, &output, UnitPolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.hits, 3);
        // Luton in 2012, both sides of the 2013 row
        assert_eq!(report.misses.len(), 3);

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(
            content,
            "season,match_week,home_team,away_team,score,home_elo,away_elo\n\
             2021,1,Arsenal FC,Manchester City,1 - 0,1900,2050\n\
             2012,1,Luton Town,Arsenal,1 - 0,NA,1800\n\
             2013,1,Arsenal,Chelsea,1 - 0,NA,NA\n"
        );
    }

    #[tokio::test]
    async fn abort_policy_fails_on_missing_season() {
        let config = config();
        let fetcher = FixtureFetcher::new();
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("matches.csv");
        write_input(&input);

        let result = run_annotate(
            &config,
            &fetcher,
            &input,
            &tmp.path().join("out.csv"),
            UnitPolicy::Abort,
        )
        .await;
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }

    #[tokio::test]
    async fn unusable_season_document_only_blanks_that_season() {
        let config = config();
        let fetcher = FixtureFetcher::new()
            .with_page(
                config.ratings.url_for("2021"),
                "Rank,Club,Country,Level,Elo,From,To\n\
                 1,Man City,ENG,1,2050,2021-07-30,2021-08-14\n\
                 2,Arsenal,ENG,1,1900,2021-07-30,2021-08-14\n",
            )
            .with_page(
                config.ratings.url_for("2012"),
                "<html>Service unavailable</html>",
            );

        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("matches.csv");
        let output = tmp.path().join("matches_elo.csv");
        write_input(&input);

        let report = run_annotate(&config, &fetcher, &input, &output, UnitPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report.hits, 2);

        let (_, rows) = read_rows(&output).unwrap();
        assert_eq!(rows[0].get("home_elo"), Some("1900"));
        assert_eq!(rows[0].get("away_elo"), Some("2050"));
        assert_eq!(rows[1].get("home_elo"), Some("NA"));
        assert_eq!(rows[1].get("away_elo"), Some("NA"));
    }

    #[tokio::test]
    async fn unusable_season_document_aborts_under_abort_policy() {
        let config = config();
        let fetcher = FixtureFetcher::new()
            .with_page(config.ratings.url_for("2021"), "<html>Service unavailable</html>");
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("matches.csv");
        let output = tmp.path().join("out.csv");
        write_input(&input);

        let result = run_annotate(&config, &fetcher, &input, &output, UnitPolicy::Abort).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn rejects_output_naming_the_input_file() {
        let config = config();
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("matches.csv");
        write_input(&input);
        let before = fs::read_to_string(&input).unwrap();

        fs::create_dir(tmp.path().join("elo")).unwrap();
        let output = tmp.path().join("elo").join("..").join("matches.csv");
        assert_ne!(input, output);
        let result = run_annotate(
            &config,
            &FixtureFetcher::new(),
            &input,
            &output,
            UnitPolicy::Skip,
        )
        .await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(fs::read_to_string(&input).unwrap(), before);
    }

    #[tokio::test]
    async fn rejects_input_without_join_columns() {
        let config = config();
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("team_stats.csv");
        fs::write(&input, "date,team\n2024-08-17,Arsenal\n").unwrap();

        let result = run_annotate(
            &config,
            &FixtureFetcher::new(),
            &input,
            &tmp.path().join("out.csv"),
            UnitPolicy::Skip,
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
