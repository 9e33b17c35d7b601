//! Attaches season ratings to match rows.

use crate::models::{JoinConfig, NormalizedRow, RatingBook};

/// Which row fields take part in the join.
#[derive(Debug, Clone)]
pub struct JoinFields {
    pub season: String,
    pub home: String,
    pub away: String,
    pub home_output: String,
    pub away_output: String,
}

impl JoinFields {
    pub fn from_config(config: &JoinConfig) -> Self {
        Self {
            season: config.season_field.clone(),
            home: config.home_field.clone(),
            away: config.away_field.clone(),
            home_output: config.home_output.clone(),
            away_output: config.away_output.clone(),
        }
    }

    /// (input field, output field) pairs in column order.
    fn pairs(&self) -> [(&str, &str); 2] {
        [
            (self.home.as_str(), self.home_output.as_str()),
            (self.away.as_str(), self.away_output.as_str()),
        ]
    }
}

/// A name that had no rating for its season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMiss {
    pub row: usize,
    pub season: String,
    pub field: String,
    pub name: String,
}

/// Outcome of an [`annotate`] pass.
#[derive(Debug, Default)]
pub struct JoinReport {
    pub rows: usize,
    pub hits: usize,
    pub misses: Vec<LookupMiss>,
}

/// Look up the home and away ratings of every row.
///
/// Each row's own season selects the table. A name missing from the table, a
/// season without a table, or a row lacking the season or name field each
/// produce `absent_marker` in that output field only; no other field of the
/// row is touched.
pub fn annotate(
    rows: &mut [NormalizedRow],
    book: &RatingBook,
    fields: &JoinFields,
    absent_marker: &str,
) -> JoinReport {
    let mut report = JoinReport {
        rows: rows.len(),
        ..JoinReport::default()
    };

    for (idx, row) in rows.iter_mut().enumerate() {
        let season = row.get(&fields.season).unwrap_or_default().to_string();
        let table = book.table(&season);

        for (input, output) in fields.pairs() {
            let name = row.get(input).unwrap_or_default().to_string();
            let rating = table.and_then(|t| t.get(&name)).map(str::to_string);

            match rating {
                Some(rating) => {
                    report.hits += 1;
                    row.insert(output, rating);
                }
                None => {
                    log::warn!("No rating for '{}' in season {}", name, season);
                    report.misses.push(LookupMiss {
                        row: idx,
                        season: season.clone(),
                        field: input.to_string(),
                        name,
                    });
                    row.insert(output, absent_marker);
                }
            }
        }
    }

    log::info!(
        "Annotated {} rows: {} ratings found, {} missing",
        report.rows,
        report.hits,
        report.misses.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{JoinConfig, NameNormalizer, RatingTable};

    fn row(season: &str, home: &str, away: &str) -> NormalizedRow {
        [
            ("season", season),
            ("match_week", "1"),
            ("home_team", home),
            ("away_team", away),
            ("score", "1 - 0"),
        ]
        .into_iter()
        .collect()
    }

    fn book() -> RatingBook {
        let normalizer = NameNormalizer::new(true, &["FC".to_string()], &HashMap::new());
        let mut book = RatingBook::new();

        let mut t2021 = RatingTable::new("2021", normalizer.clone());
        t2021.insert("Arsenal", "1900");
        t2021.insert("Chelsea", "1950");
        book.insert(t2021);

        let mut t2012 = RatingTable::new("2012", normalizer);
        t2012.insert("Arsenal", "1800");
        book.insert(t2012);
        book
    }

    fn fields() -> JoinFields {
        JoinFields::from_config(&JoinConfig::default())
    }

    #[test]
    fn hit_attaches_season_rating() {
        let mut rows = vec![
            row("2021", "Arsenal", "Chelsea"),
            row("2021", "Chelsea", "Arsenal"),
            row("2012", "Arsenal", "Chelsea"),
        ];
        let report = annotate(&mut rows, &book(), &fields(), "NA");

        assert_eq!(rows[0].get("home_elo"), Some("1900"));
        assert_eq!(rows[0].get("away_elo"), Some("1950"));
        assert_eq!(rows[1].get("away_elo"), Some("1900"));
        assert_eq!(rows[2].get("home_elo"), Some("1800"));
        assert_eq!(report.rows, 3);
        assert_eq!(report.hits, 5);
        assert_eq!(report.misses.len(), 1);
    }

    #[test]
    fn miss_sets_marker_and_leaves_siblings_alone() {
        let mut rows = vec![row("2012", "Luton Town", "Arsenal")];
        let before = rows[0].clone();

        let report = annotate(&mut rows, &book(), &fields(), "NA");

        assert_eq!(rows[0].get("home_elo"), Some("NA"));
        assert_eq!(rows[0].get("away_elo"), Some("1800"));
        for key in ["season", "match_week", "home_team", "away_team", "score"] {
            assert_eq!(rows[0].get(key), before.get(key));
        }
        assert_eq!(
            report.misses,
            vec![LookupMiss {
                row: 0,
                season: "2012".to_string(),
                field: "home_team".to_string(),
                name: "Luton Town".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_season_and_missing_fields_get_marker() {
        let mut rows = vec![
            row("1999", "Arsenal", "Chelsea"),
            [("season", "2021")].into_iter().collect(),
        ];
        let report = annotate(&mut rows, &book(), &fields(), "");

        for r in &rows {
            assert_eq!(r.get("home_elo"), Some(""));
            assert_eq!(r.get("away_elo"), Some(""));
        }
        assert_eq!(report.hits, 0);
        assert_eq!(report.misses.len(), 4);
    }
}
