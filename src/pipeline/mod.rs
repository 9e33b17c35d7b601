//! Pipeline entry points.
//!
//! - `run_matches`: Scrape match results week by week
//! - `run_team_stats`: Scrape every team's match log for a season
//! - `run_annotate`: Attach season ratings to stored match results
//!
//! A unit of work is one page (one week or one team). What happens when a
//! unit fails is decided by [`UnitPolicy`]; rows appended by earlier units are
//! never rolled back.

pub mod annotate;
pub mod matches;
pub mod team_stats;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::NormalizedRow;
use crate::storage::RowSink;

pub use annotate::run_annotate;
pub use matches::run_matches;
pub use team_stats::run_team_stats;

/// What to do when one unit of work fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitPolicy {
    /// Log page-level failures (fetch errors, missing elements) and move on.
    /// Storage and configuration errors still abort.
    #[default]
    Skip,
    /// Stop at the first failure.
    Abort,
}

/// Counters for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub units: usize,
    pub failed_units: usize,
    pub rows_extracted: usize,
    pub rows_dropped: usize,
    pub rows_written: usize,
}

impl RunSummary {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            units: 0,
            failed_units: 0,
            rows_extracted: 0,
            rows_dropped: 0,
            rows_written: 0,
        }
    }

    fn record(&mut self, outcome: &UnitOutcome) {
        self.rows_extracted += outcome.extracted;
        self.rows_dropped += outcome.dropped;
        self.rows_written += outcome.written;
    }

    fn finish(mut self, title: &str) -> Self {
        let finished_at = Utc::now();
        self.finished_at = Some(finished_at);
        log::info!("[SUMMARY] {}", title);
        log::info!("    Units: {} ({} failed)", self.units, self.failed_units);
        log::info!(
            "    Rows: {} extracted, {} dropped, {} written",
            self.rows_extracted,
            self.rows_dropped,
            self.rows_written
        );
        log::info!(
            "    Duration: {}s",
            (finished_at - self.started_at).num_seconds()
        );
        self
    }
}

/// Row counts for one unit of work.
#[derive(Debug, Default)]
struct UnitOutcome {
    extracted: usize,
    dropped: usize,
    written: usize,
}

/// Apply the unit policy to a failed unit.
fn handle_unit_error(
    policy: UnitPolicy,
    summary: &mut RunSummary,
    unit: &str,
    error: AppError,
) -> Result<()> {
    summary.failed_units += 1;
    if policy == UnitPolicy::Skip && error.is_page_failure() {
        log::warn!("Skipping {}: {}", unit, error);
        Ok(())
    } else {
        log::error!("Aborting at {}: {}", unit, error);
        Err(error)
    }
}

/// Fail unless every column of the sink is among `produced`.
fn check_sink_header<S: RowSink + ?Sized>(sink: &S, produced: &[&str]) -> Result<()> {
    match sink
        .header()
        .fields()
        .iter()
        .find(|f| !produced.contains(&f.as_str()))
    {
        Some(field) => Err(AppError::validation(format!(
            "output column '{field}' is not produced by this pipeline"
        ))),
        None => Ok(()),
    }
}

/// Append rows, de-duplicating on `dedup_key` when given.
fn write_rows<S: RowSink + ?Sized>(
    sink: &mut S,
    rows: &[NormalizedRow],
    dedup_key: Option<&[String]>,
) -> Result<usize> {
    match dedup_key {
        Some(key) => sink.append_unique(rows, key),
        None => sink.append(rows),
    }
}

/// Politeness delay between requests.
async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
