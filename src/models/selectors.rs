// src/models/selectors.rs

//! CSS selectors for locating tables and links on a page.

use serde::{Deserialize, Serialize};

/// Selectors describing one repeated-row structure on a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSelectors {
    /// Selector for the element that holds all rows
    pub container: String,

    /// Selector for each row within the container
    pub row: String,

    /// Selector for the header-style first cell of a row (e.g. a date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Selectors for the value cells of a row. Groups are read in list
    /// order; matches within a group are read in document order.
    pub cells: Vec<String>,
}

impl TableSelectors {
    pub fn new(
        container: impl Into<String>,
        row: impl Into<String>,
        label: Option<&str>,
        cells: &[&str],
    ) -> Self {
        Self {
            container: container.into(),
            row: row.into(),
            label: label.map(str::to_string),
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Match cards on the league's fixtures page.
    pub fn match_cards() -> Self {
        Self::new(
            ".match-list-root__content",
            ".match-card__info",
            None,
            &[".match-card__team-name-container", ".match-card__score"],
        )
    }

    /// A team's "Scores & Fixtures" match-log table.
    pub fn match_logs() -> Self {
        Self::new("#matchlogs_for", "tbody tr", Some("th"), &["td"])
    }
}

/// Selectors for collecting links out of a container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkSelectors {
    /// Selector for the element holding the links
    pub container: String,

    /// Selector for link elements within the container
    #[serde(default = "default_link")]
    pub link: String,

    /// HTML attribute carrying the target URL
    #[serde(default = "default_attr_name")]
    pub attr_name: String,

    /// Regex the resolved URL must match to be kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn default_link() -> String {
    "a".to_string()
}

fn default_attr_name() -> String {
    "href".to_string()
}

impl Default for LinkSelectors {
    fn default() -> Self {
        Self {
            container: "table.stats_table".to_string(),
            link: default_link(),
            attr_name: default_attr_name(),
            pattern: Some("Stats$".to_string()),
        }
    }
}
