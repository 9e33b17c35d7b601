//! Storage abstractions for scraped rows.
//!
//! Each dataset lives in one CSV file:
//!
//! ```text
//! data/
//! ├── matches_2025.csv          # season, match_week, home_team, away_team, score
//! ├── matches_2025_elo.csv      # ... plus home_elo, away_elo
//! └── team_stats_2024-2025.csv  # date .. notes, team
//! ```
//!
//! Files are append-only. The header is written once when the file is
//! created and never rewritten afterwards.

pub mod local;

use crate::error::Result;
use crate::models::{NormalizedRow, RowSchema};

// Re-export for convenience
pub use local::{CsvSink, ensure_schema, read_rows};

/// Append-only destination for normalized rows.
///
/// Appends take `&mut self`, so one sink value never has two writers.
pub trait RowSink {
    /// Column order of the destination.
    fn header(&self) -> &RowSchema;

    /// Append rows in order. Returns the number of rows written.
    fn append(&mut self, rows: &[NormalizedRow]) -> Result<usize>;

    /// Append rows whose `key` values are not already stored.
    fn append_unique(&mut self, rows: &[NormalizedRow], key: &[String]) -> Result<usize>;
}
