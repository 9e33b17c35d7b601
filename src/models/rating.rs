//! Club ratings keyed by season and normalized team name.
//!
//! Names from the two sources are compared by strict equality after both
//! sides pass through the same [`NameNormalizer`]. The rules, in order:
//!
//! 1. Trim and collapse runs of whitespace to a single space.
//! 2. Fold to lowercase when `case_insensitive` is set.
//! 3. Drop trailing organizational suffix tokens (`FC`, `AFC`, ...), compared
//!    case-insensitively, as long as at least one token remains.
//! 4. Replace the result through the alias table, whose keys and values went
//!    through steps 1-3 when the normalizer was built.
//!
//! No accent folding or fuzzy matching is attempted.

use std::collections::HashMap;

use crate::models::JoinConfig;
use crate::utils::collapse_whitespace;

/// Canonicalizes team names before rating lookups.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    case_insensitive: bool,
    strip_suffixes: Vec<String>,
    aliases: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new(
        case_insensitive: bool,
        strip_suffixes: &[String],
        aliases: &HashMap<String, String>,
    ) -> Self {
        let mut normalizer = Self {
            case_insensitive,
            strip_suffixes: strip_suffixes.iter().map(|s| s.to_lowercase()).collect(),
            aliases: HashMap::new(),
        };
        let aliases = aliases
            .iter()
            .map(|(from, to)| (normalizer.canonical(from), normalizer.canonical(to)))
            .collect();
        normalizer.aliases = aliases;
        normalizer
    }

    pub fn from_config(config: &JoinConfig) -> Self {
        Self::new(
            config.case_insensitive,
            &config.strip_suffixes,
            &config.aliases,
        )
    }

    /// Normalize a name for use as a lookup key.
    pub fn normalize(&self, name: &str) -> String {
        let canonical = self.canonical(name);
        match self.aliases.get(&canonical) {
            Some(alias) => alias.clone(),
            None => canonical,
        }
    }

    // Steps 1-3, without aliasing.
    fn canonical(&self, name: &str) -> String {
        let collapsed = collapse_whitespace(name);
        let folded = if self.case_insensitive {
            collapsed.to_lowercase()
        } else {
            collapsed
        };

        let mut tokens: Vec<&str> = folded.split(' ').collect();
        while tokens.len() > 1 {
            let last = tokens[tokens.len() - 1].to_lowercase();
            if self.strip_suffixes.iter().any(|s| *s == last) {
                tokens.pop();
            } else {
                break;
            }
        }
        tokens.join(" ")
    }
}

/// Ratings for one season, keyed by normalized team name.
#[derive(Debug, Clone)]
pub struct RatingTable {
    season: String,
    normalizer: NameNormalizer,
    ratings: HashMap<String, String>,
}

impl RatingTable {
    pub fn new(season: impl Into<String>, normalizer: NameNormalizer) -> Self {
        Self {
            season: season.into(),
            normalizer,
            ratings: HashMap::new(),
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    /// Insert a rating. A later entry for the same normalized name wins.
    pub fn insert(&mut self, name: &str, rating: impl Into<String>) {
        let key = self.normalizer.normalize(name);
        self.ratings.insert(key, rating.into());
    }

    /// Look up a rating by team name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.ratings
            .get(&self.normalizer.normalize(name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Rating tables for several seasons.
#[derive(Debug, Clone, Default)]
pub struct RatingBook {
    tables: HashMap<String, RatingTable>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any existing table for the same season.
    pub fn insert(&mut self, table: RatingTable) {
        self.tables.insert(table.season.clone(), table);
    }

    pub fn table(&self, season: &str) -> Option<&RatingTable> {
        self.tables.get(season)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> NameNormalizer {
        let aliases = HashMap::from([("Manchester United".to_string(), "Man United".to_string())]);
        NameNormalizer::new(true, &["FC".to_string(), "AFC".to_string()], &aliases)
    }

    #[test]
    fn strips_suffix_and_case() {
        let n = normalizer();
        assert_eq!(n.normalize("  Arsenal   FC "), "arsenal");
        assert_eq!(n.normalize("AFC Bournemouth"), "afc bournemouth");
        assert_eq!(n.normalize("FC"), "fc");
    }

    #[test]
    fn aliases_apply_after_normalization() {
        let n = normalizer();
        assert_eq!(n.normalize("manchester  united fc"), "man united");
        assert_eq!(n.normalize("Man United"), "man united");
    }

    #[test]
    fn case_sensitive_mode_keeps_case() {
        let n = NameNormalizer::new(false, &["FC".to_string()], &HashMap::new());
        assert_eq!(n.normalize("Arsenal fc"), "Arsenal");
        assert_ne!(n.normalize("arsenal"), n.normalize("Arsenal"));
    }

    #[test]
    fn table_lookup_uses_same_rules_on_both_sides() {
        let mut table = RatingTable::new("2021", normalizer());
        table.insert("Arsenal", "1900");
        assert_eq!(table.get("ARSENAL FC"), Some("1900"));
        assert_eq!(table.get("Chelsea"), None);
    }

    #[test]
    fn book_selects_table_by_season() {
        let mut book = RatingBook::new();
        let mut t2021 = RatingTable::new("2021", normalizer());
        t2021.insert("Arsenal", "1900");
        book.insert(t2021);
        book.insert(RatingTable::new("2022", normalizer()));

        assert_eq!(book.table("2021").and_then(|t| t.get("Arsenal")), Some("1900"));
        assert_eq!(book.table("2022").and_then(|t| t.get("Arsenal")), None);
        assert!(book.table("1999").is_none());
    }
}
