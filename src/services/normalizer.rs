//! Raw row validation and keying.

use crate::models::{NormalizedRow, RawRow, RowSchema};
use crate::utils::collapse_whitespace;

/// Output of [`normalize`].
#[derive(Debug, Default)]
pub struct Normalized {
    pub rows: Vec<NormalizedRow>,
    /// Rows rejected by the shape check
    pub dropped: usize,
}

/// Validate raw rows against a schema and key them by field name.
///
/// Rows whose field count differs from the schema are dropped (source pages
/// render postponed fixtures and spacer rows with fewer cells). Each
/// surviving row gets every `derived` pair appended; a derived key that
/// shares a schema field's name overrides the scraped value.
pub fn normalize(rows: Vec<RawRow>, schema: &RowSchema, derived: &[(&str, &str)]) -> Normalized {
    let mut out = Normalized::default();

    for row in rows {
        if !schema.accepts(&row) {
            log::debug!(
                "Dropping row with {} fields (expected {}): {:?}",
                row.len(),
                schema.len(),
                row.fields()
            );
            out.dropped += 1;
            continue;
        }

        let mut normalized: NormalizedRow = schema
            .fields()
            .iter()
            .cloned()
            .zip(row.into_fields())
            .collect();
        for (key, value) in derived {
            normalized.insert(*key, *value);
        }
        out.rows.push(normalized);
    }

    out
}

/// Derive a team name from a team page URL.
///
/// Takes the last path segment, removes the trailing `suffix` token, and turns
/// hyphens and underscores into spaces. Case is left as is:
/// `.../squads/arsenal-fc-Stats` with suffix `-Stats` gives `arsenal fc`.
///
/// Returns `None` when the segment does not end with `suffix` or nothing is
/// left after removing it.
pub fn team_from_url(url: &str, suffix: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = segment.strip_suffix(suffix)?;
    let name = collapse_whitespace(&stem.replace(['-', '_'], " "));
    if name.is_empty() { None } else { Some(name) }
}
