//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{LinkSelectors, TableSelectors};
use crate::utils::render_template;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Match results source
    #[serde(default)]
    pub matches: MatchesConfig,

    /// Team match-log source
    #[serde(default)]
    pub team_stats: TeamStatsConfig,

    /// Club rating source
    #[serde(default)]
    pub ratings: RatingsConfig,

    /// Rating join rules
    #[serde(default)]
    pub join: JoinConfig,

    /// CSV output behavior
    #[serde(default)]
    pub sink: SinkConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if !self.matches.url_template.contains("{week}") {
            return Err(AppError::validation(
                "matches.url_template must contain {week}",
            ));
        }
        if self.matches.weeks == 0 {
            return Err(AppError::validation("matches.weeks must be > 0"));
        }
        if self.team_stats.url_suffix.is_empty() {
            return Err(AppError::validation("team_stats.url_suffix is empty"));
        }
        if let Some(pattern) = &self.team_stats.links.pattern {
            regex::Regex::new(pattern)?;
        }
        if self.ratings.name_column == self.ratings.rating_column {
            return Err(AppError::validation(
                "ratings.name_column and ratings.rating_column must differ",
            ));
        }
        if self.join.home_output == self.join.away_output {
            return Err(AppError::validation(
                "join.home_output and join.away_output must differ",
            ));
        }
        let tables = [&self.matches.table, &self.team_stats.table];
        if let Some(table) = tables.iter().find(|t| t.cells.is_empty()) {
            return Err(AppError::validation(format!(
                "no cell selectors for table '{}'",
                table.container
            )));
        }
        let selectors = tables
            .into_iter()
            .flat_map(|t| {
                [&t.container, &t.row]
                    .into_iter()
                    .chain(t.label.as_ref())
                    .chain(t.cells.iter())
            })
            .chain([&self.team_stats.links.container, &self.team_stats.links.link]);
        for selector in selectors {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(selector.as_str(), format!("{e:?}")))?;
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between units of work in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Time a rendered page is given to run its scripts (browser fetcher only)
    #[serde(default = "defaults::render_wait")]
    pub render_wait_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            render_wait_ms: defaults::render_wait(),
        }
    }
}

/// Match results source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesConfig {
    /// Page URL with `{season}` and `{week}` placeholders
    #[serde(default = "defaults::matches_url")]
    pub url_template: String,

    /// Number of match weeks in a season
    #[serde(default = "defaults::weeks")]
    pub weeks: u32,

    #[serde(default = "TableSelectors::match_cards")]
    pub table: TableSelectors,
}

impl Default for MatchesConfig {
    fn default() -> Self {
        Self {
            url_template: defaults::matches_url(),
            weeks: defaults::weeks(),
            table: TableSelectors::match_cards(),
        }
    }
}

impl MatchesConfig {
    pub fn url_for(&self, season: &str, week: u32) -> String {
        render_template(
            &self.url_template,
            &[("season", season), ("week", &week.to_string())],
        )
    }
}

/// Team match-log source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStatsConfig {
    /// League table URL with a `{season}` placeholder
    #[serde(default = "defaults::team_index_url")]
    pub index_url_template: String,

    /// Where the per-team links live on the league table page
    #[serde(default)]
    pub links: LinkSelectors,

    /// Trailing token of a team URL, removed when deriving the team name
    #[serde(default = "defaults::url_suffix")]
    pub url_suffix: String,

    #[serde(default = "TableSelectors::match_logs")]
    pub table: TableSelectors,
}

impl Default for TeamStatsConfig {
    fn default() -> Self {
        Self {
            index_url_template: defaults::team_index_url(),
            links: LinkSelectors::default(),
            url_suffix: defaults::url_suffix(),
            table: TableSelectors::match_logs(),
        }
    }
}

impl TeamStatsConfig {
    pub fn index_url(&self, season: &str) -> String {
        render_template(&self.index_url_template, &[("season", season)])
    }
}

/// Club rating source. The source serves one CSV document per season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsConfig {
    /// CSV URL with a `{season}` placeholder
    #[serde(default = "defaults::ratings_url")]
    pub url_template: String,

    #[serde(default = "defaults::name_column")]
    pub name_column: String,

    #[serde(default = "defaults::rating_column")]
    pub rating_column: String,

    /// Column used to restrict the table to one country
    #[serde(default = "defaults::country_column")]
    pub country_column: Option<String>,

    /// Required value of `country_column`
    #[serde(default = "defaults::country")]
    pub country: Option<String>,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            url_template: defaults::ratings_url(),
            name_column: defaults::name_column(),
            rating_column: defaults::rating_column(),
            country_column: defaults::country_column(),
            country: defaults::country(),
        }
    }
}

impl RatingsConfig {
    pub fn url_for(&self, season: &str) -> String {
        render_template(&self.url_template, &[("season", season)])
    }
}

/// Rules for attaching ratings to match rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default = "defaults::season_field")]
    pub season_field: String,

    #[serde(default = "defaults::home_field")]
    pub home_field: String,

    #[serde(default = "defaults::away_field")]
    pub away_field: String,

    #[serde(default = "defaults::home_output")]
    pub home_output: String,

    #[serde(default = "defaults::away_output")]
    pub away_output: String,

    /// Written in place of a rating that could not be found
    #[serde(default = "defaults::absent_marker")]
    pub absent_marker: String,

    #[serde(default = "defaults::case_insensitive")]
    pub case_insensitive: bool,

    /// Trailing name tokens ignored when matching
    #[serde(default = "defaults::strip_suffixes")]
    pub strip_suffixes: Vec<String>,

    /// Explicit name equivalences, applied after normalization
    #[serde(default = "defaults::aliases")]
    pub aliases: HashMap<String, String>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            season_field: defaults::season_field(),
            home_field: defaults::home_field(),
            away_field: defaults::away_field(),
            home_output: defaults::home_output(),
            away_output: defaults::away_output(),
            absent_marker: defaults::absent_marker(),
            case_insensitive: defaults::case_insensitive(),
            strip_suffixes: defaults::strip_suffixes(),
            aliases: defaults::aliases(),
        }
    }
}

/// CSV output behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Skip rows whose key already exists in the output file
    #[serde(default)]
    pub dedup: bool,

    /// Key columns for the match-results file
    #[serde(default = "defaults::match_key")]
    pub match_key: Vec<String>,

    /// Key columns for the team-statistics file
    #[serde(default = "defaults::team_stats_key")]
    pub team_stats_key: Vec<String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            dedup: false,
            match_key: defaults::match_key(),
            team_stats_key: defaults::team_stats_key(),
        }
    }
}

mod defaults {
    use std::collections::HashMap;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; matchlog/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        3000
    }
    pub fn render_wait() -> u64 {
        1500
    }

    // Source defaults
    pub fn matches_url() -> String {
        "https://www.premierleague.com/en/matches?competition=8&season={season}&matchweek={week}"
            .into()
    }
    pub fn weeks() -> u32 {
        38
    }
    pub fn team_index_url() -> String {
        "https://fbref.com/en/comps/9/{season}/{season}-Premier-League-Stats".into()
    }
    pub fn url_suffix() -> String {
        "-Stats".into()
    }
    pub fn ratings_url() -> String {
        "http://api.clubelo.com/{season}-08-01".into()
    }
    pub fn name_column() -> String {
        "Club".into()
    }
    pub fn rating_column() -> String {
        "Elo".into()
    }
    pub fn country_column() -> Option<String> {
        Some("Country".into())
    }
    pub fn country() -> Option<String> {
        Some("ENG".into())
    }

    // Join defaults
    pub fn season_field() -> String {
        "season".into()
    }
    pub fn home_field() -> String {
        "home_team".into()
    }
    pub fn away_field() -> String {
        "away_team".into()
    }
    pub fn home_output() -> String {
        "home_elo".into()
    }
    pub fn away_output() -> String {
        "away_elo".into()
    }
    pub fn absent_marker() -> String {
        "NA".into()
    }
    pub fn case_insensitive() -> bool {
        true
    }
    pub fn strip_suffixes() -> Vec<String> {
        vec!["FC".into(), "AFC".into()]
    }
    pub fn aliases() -> HashMap<String, String> {
        [
            ("Manchester United", "Man United"),
            ("Manchester City", "Man City"),
            ("Tottenham Hotspur", "Tottenham"),
            ("Newcastle United", "Newcastle"),
            ("Wolverhampton Wanderers", "Wolves"),
            ("Nottingham Forest", "Forest"),
            ("West Ham United", "West Ham"),
            ("Brighton & Hove Albion", "Brighton"),
            ("Brighton and Hove Albion", "Brighton"),
            ("Leicester City", "Leicester"),
            ("Leeds United", "Leeds"),
            ("Ipswich Town", "Ipswich"),
            ("Luton Town", "Luton"),
            ("Norwich City", "Norwich"),
            ("West Bromwich Albion", "West Brom"),
            ("Queens Park Rangers", "QPR"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
    }

    // Sink defaults
    pub fn match_key() -> Vec<String> {
        ["season", "match_week", "home_team", "away_team"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn team_stats_key() -> Vec<String> {
        ["team", "date", "comp", "opponent"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.matches.table.row = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_link_pattern() {
        let mut config = Config::default();
        config.team_stats.links.pattern = Some("(".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            request_delay_ms = 0

            [join]
            absent_marker = ""
            "#,
        )
        .unwrap();
        assert_eq!(config.crawler.request_delay_ms, 0);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.join.absent_marker, "");
        assert_eq!(config.join.home_output, "home_elo");
        assert_eq!(config.matches.weeks, 38);
    }

    #[test]
    fn urls_render_placeholders() {
        let config = Config::default();
        assert_eq!(
            config.matches.url_for("2025", 3),
            "https://www.premierleague.com/en/matches?competition=8&season=2025&matchweek=3"
        );
        assert_eq!(
            config.team_stats.index_url("2024-2025"),
            "https://fbref.com/en/comps/9/2024-2025/2024-2025-Premier-League-Stats"
        );
        assert_eq!(config.ratings.url_for("2021"), "http://api.clubelo.com/2021-08-01");
    }
}
