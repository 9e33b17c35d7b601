// src/services/extractor.rs

//! Row and link extraction from parsed pages.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::fetch::{Page, attribute, parse_selector, text};
use crate::models::{LinkSelectors, RawRow, TableSelectors};
use crate::utils::resolve_url;

/// Extract every row under the configured container.
///
/// Each row yields the label cell first (when a label selector is set), then
/// the value cells group by group. Empty cells are kept as empty strings.
/// A row without a label cell is returned without it, so the shape check in
/// the normalizer rejects it.
///
/// Fails with [`AppError::ElementNotFound`] when the container is missing or
/// holds no rows.
pub fn extract_rows(page: &Page, selectors: &TableSelectors) -> Result<Vec<RawRow>> {
    let row_sel = parse_selector(&selectors.row)?;
    let cell_sels = selectors
        .cells
        .iter()
        .map(|c| parse_selector(c))
        .collect::<Result<Vec<_>>>()?;
    let label_sel = selectors
        .label
        .as_deref()
        .map(parse_selector)
        .transpose()?;

    let container = page.find(&selectors.container)?;

    let mut rows = Vec::new();
    for row in container.select(&row_sel) {
        let mut raw = RawRow::default();

        if let Some(label_sel) = &label_sel {
            match row.select(label_sel).next() {
                Some(label) => raw.push(text(&label)),
                None => log::debug!("Row without label cell on {}", page.url()),
            }
        }

        for cell_sel in &cell_sels {
            for cell in row.select(cell_sel) {
                raw.push(text(&cell));
            }
        }
        rows.push(raw);
    }

    if rows.is_empty() {
        return Err(AppError::element_not_found(
            format!("{} {}", selectors.container, selectors.row),
            page.url(),
        ));
    }

    log::debug!("Extracted {} rows from {}", rows.len(), page.url());
    Ok(rows)
}

/// Collect absolute link targets from a container.
///
/// Links are resolved against the page URL, filtered by the optional pattern,
/// and de-duplicated keeping the first occurrence.
pub fn extract_links(page: &Page, selectors: &LinkSelectors) -> Result<Vec<String>> {
    let link_sel = parse_selector(&selectors.link)?;
    let pattern = selectors.pattern.as_deref().map(Regex::new).transpose()?;
    let base_url = url::Url::parse(page.url())?;

    let container = page.find(&selectors.container)?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in container.select(&link_sel) {
        let Some(raw) = attribute(&element, &selectors.attr_name) else {
            continue;
        };
        let link = resolve_url(&base_url, &raw);
        if pattern.as_ref().is_some_and(|p| !p.is_match(&link)) {
            continue;
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_LOG: &str = r#"
        <table id="matchlogs_for">
          <thead><tr><th>Date</th><th>Time</th></tr></thead>
          <tbody>
            <tr><th>2024-08-17</th><td>15:00</td><td>Premier League</td><td></td></tr>
            <tr><th>2024-08-24</th><td>17:30</td><td>Premier League</td><td>Notes</td></tr>
            <tr class="spacer"><td colspan="3"></td></tr>
          </tbody>
        </table>
    "#;

    const MATCH_CARDS: &str = r#"
        <div class="match-list-root__content">
          <div class="match-card__info">
            <span class="match-card__team-name-container">Arsenal</span>
            <span class="match-card__score">2 - 1</span>
            <span class="match-card__team-name-container">Chelsea</span>
          </div>
          <div class="match-card__info">
            <span class="match-card__team-name-container">Everton</span>
            <span class="match-card__team-name-container">Fulham</span>
          </div>
        </div>
    "#;

    #[test]
    fn label_first_then_cells_with_empty_fields_kept() {
        let page = Page::parse("https://example.com/a", MATCH_LOG);
        let selectors = TableSelectors::new("#matchlogs_for", "tbody tr", Some("th"), &["td"]);
        let rows = extract_rows(&page, &selectors).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fields(), ["2024-08-17", "15:00", "Premier League", ""]);
        assert_eq!(rows[1].fields()[3], "Notes");
        // Spacer row has no label, only its single empty cell
        assert_eq!(rows[2].fields(), [""]);
    }

    #[test]
    fn cell_groups_are_read_in_list_order() {
        let page = Page::parse("https://example.com/m", MATCH_CARDS);
        let rows = extract_rows(&page, &TableSelectors::match_cards()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields(), ["Arsenal", "Chelsea", "2 - 1"]);
        assert_eq!(rows[1].fields(), ["Everton", "Fulham"]);
    }

    #[test]
    fn missing_container_propagates() {
        let page = Page::parse("https://example.com/a", "<p>maintenance</p>");
        let err = extract_rows(&page, &TableSelectors::match_logs()).unwrap_err();
        assert!(matches!(err, AppError::ElementNotFound { .. }));
    }

    #[test]
    fn empty_container_is_not_found() {
        let page = Page::parse(
            "https://example.com/a",
            r#"<table id="matchlogs_for"><tbody></tbody></table>"#,
        );
        let err = extract_rows(&page, &TableSelectors::match_logs()).unwrap_err();
        assert!(matches!(err, AppError::ElementNotFound { .. }));
    }

    #[test]
    fn links_are_resolved_filtered_and_deduplicated() {
        let html = r#"
            <table class="stats_table">
              <tr><td><a href="/en/squads/18bb7c10/Arsenal-Stats">Arsenal</a></td>
                  <td><a href="/en/players/abc/Bukayo-Saka">Saka</a></td></tr>
              <tr><td><a href="/en/squads/cff3d9bb/Chelsea-Stats">Chelsea</a></td></tr>
              <tr><td><a href="/en/squads/18bb7c10/Arsenal-Stats">Arsenal</a></td></tr>
              <tr><td><a>No target</a></td></tr>
            </table>
        "#;
        let page = Page::parse("https://fbref.com/en/comps/9/Premier-League-Stats", html);
        let links = extract_links(&page, &LinkSelectors::default()).unwrap();

        assert_eq!(
            links,
            vec![
                "https://fbref.com/en/squads/18bb7c10/Arsenal-Stats",
                "https://fbref.com/en/squads/cff3d9bb/Chelsea-Stats",
            ]
        );
    }
}
