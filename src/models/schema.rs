//! Row schemas and the built-in dataset layouts.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::RawRow;

/// Fields scraped from a single match card, in card order.
pub const MATCH_CARD_FIELDS: &[&str] = &["home_team", "away_team", "score"];

/// Column order of the match-results CSV.
pub const MATCH_RESULTS_HEADER: &[&str] =
    &["season", "match_week", "home_team", "away_team", "score"];

/// Fields of one team match-log row: the date header cell, then the value cells.
pub const MATCH_LOG_FIELDS: &[&str] = &[
    "date",
    "time",
    "comp",
    "round",
    "day",
    "venue",
    "result",
    "gf",
    "ga",
    "opponent",
    "xg",
    "xga",
    "poss",
    "attendance",
    "captain",
    "formation",
    "opp_formation",
    "referee",
    "match_report",
    "notes",
];

/// Key appended to each match-log row, parsed from the team's URL.
pub const TEAM_FIELD: &str = "team";

/// Ordered, duplicate-free list of field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    fields: Vec<String>,
}

impl RowSchema {
    /// Build a schema, rejecting empty or duplicate field names.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for field in &fields {
            if field.trim().is_empty() {
                return Err(AppError::validation("schema contains an empty field name"));
            }
            if !seen.insert(field.as_str()) {
                return Err(AppError::validation(format!(
                    "schema field '{field}' appears more than once"
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Schema from a built-in constant list (known to be valid).
    fn builtin(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn match_cards() -> Self {
        Self::builtin(MATCH_CARD_FIELDS)
    }

    pub fn match_results() -> Self {
        Self::builtin(MATCH_RESULTS_HEADER)
    }

    pub fn match_logs() -> Self {
        Self::builtin(MATCH_LOG_FIELDS)
    }

    /// Match-log fields followed by the derived `team` column.
    pub fn team_stats() -> Self {
        let mut schema = Self::match_logs();
        schema.fields.push(TEAM_FIELD.to_string());
        schema
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Shape check: a raw row is valid only if it has exactly one value per field.
    pub fn accepts(&self, row: &RawRow) -> bool {
        row.len() == self.fields.len()
    }

    /// This schema with extra fields appended; fields already present are skipped.
    pub fn extended<S: AsRef<str>>(&self, extra: &[S]) -> Self {
        let mut fields = self.fields.clone();
        for field in extra {
            let field = field.as_ref();
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_fields() {
        assert!(RowSchema::new(["a", "b", "a"]).is_err());
        assert!(RowSchema::new(["a", " "]).is_err());
        assert!(RowSchema::new(["a", "b"]).is_ok());
    }

    #[test]
    fn team_stats_layout_has_twenty_one_columns() {
        let schema = RowSchema::team_stats();
        assert_eq!(schema.len(), 21);
        assert_eq!(schema.fields()[0], "date");
        assert_eq!(schema.fields()[20], "team");
    }

    #[test]
    fn accepts_only_exact_length() {
        let schema = RowSchema::match_cards();
        let short: RawRow = ["Arsenal", "Chelsea"].into_iter().collect();
        let exact: RawRow = ["Arsenal", "Chelsea", "2-1"].into_iter().collect();
        let long: RawRow = ["Arsenal", "Chelsea", "2-1", "FT"].into_iter().collect();
        assert!(!schema.accepts(&short));
        assert!(schema.accepts(&exact));
        assert!(!schema.accepts(&long));
    }

    #[test]
    fn extended_skips_existing_fields() {
        let schema = RowSchema::match_results().extended(&["home_elo", "away_elo", "season"]);
        assert_eq!(schema.len(), 7);
        assert_eq!(schema.fields()[5], "home_elo");
    }
}
