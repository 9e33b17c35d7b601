//! matchlog CLI
//!
//! Scrapes match results, team match logs and club ratings into CSV files.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
#[cfg(feature = "browser")]
use matchlog::fetch::BrowserFetcher;
use matchlog::{
    error::Result,
    fetch::{HttpFetcher, PageFetcher},
    models::{Config, RowSchema},
    pipeline::{self, UnitPolicy},
    storage::CsvSink,
};

/// matchlog - Football Results Scraper
#[derive(Parser, Debug)]
#[command(
    name = "matchlog",
    version,
    about = "Scrapes football results, club ratings and team match logs into CSV"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "matchlog.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Stop at the first failed page instead of skipping it
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Skip rows whose key already exists in the output file
    #[arg(long, global = true)]
    dedup: bool,

    /// Render pages in headless Chrome instead of plain HTTP
    #[cfg(feature = "browser")]
    #[arg(long, global = true)]
    browser: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Scrape(ScrapeCommand),

    /// Validate the configuration file
    Validate,
}

/// Commands that fetch pages.
#[derive(Subcommand, Debug)]
enum ScrapeCommand {
    /// Scrape match results for a season, one page per match week
    Matches {
        /// Season identifier used by the results site (e.g. 2025)
        #[arg(short, long)]
        season: String,

        /// CSV file to append to
        #[arg(short, long)]
        output: PathBuf,

        /// Week range such as `1-10` or `7` (default: the whole season)
        #[arg(long, value_parser = parse_weeks)]
        weeks: Option<RangeInclusive<u32>>,
    },

    /// Scrape every team's match log for a season
    TeamStats {
        /// Season identifier used by the stats site (e.g. 2024-2025)
        #[arg(short, long)]
        season: String,

        /// CSV file to append to
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Attach season ratings to a match-results file
    Annotate {
        /// Match-results CSV to read
        #[arg(short, long)]
        input: PathBuf,

        /// Annotated CSV to append to
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_weeks(s: &str) -> std::result::Result<RangeInclusive<u32>, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid week '{v}': {e}"))
    };
    let (start, end) = match s.split_once('-') {
        Some((a, b)) => (parse(a)?, parse(b)?),
        None => {
            let week = parse(s)?;
            (week, week)
        }
    };
    if start == 0 || start > end {
        return Err(format!("invalid week range '{s}'"));
    }
    Ok(start..=end)
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Run one command against the given fetcher.
async fn execute<F: PageFetcher + ?Sized>(
    command: ScrapeCommand,
    config: &Config,
    fetcher: &F,
    policy: UnitPolicy,
) -> Result<()> {
    match command {
        ScrapeCommand::Matches {
            season,
            output,
            weeks,
        } => {
            let weeks = weeks.unwrap_or(1..=config.matches.weeks);
            let mut sink = CsvSink::open(&output, RowSchema::match_results())?;
            pipeline::run_matches(config, fetcher, &mut sink, &season, weeks, policy).await?;
            log::info!("Match results saved to {}", output.display());
        }

        ScrapeCommand::TeamStats { season, output } => {
            let mut sink = CsvSink::open(&output, RowSchema::team_stats())?;
            pipeline::run_team_stats(config, fetcher, &mut sink, &season, policy).await?;
            log::info!("Team match logs saved to {}", output.display());
        }

        ScrapeCommand::Annotate { input, output } => {
            let report = pipeline::run_annotate(config, fetcher, &input, &output, policy).await?;
            if !report.misses.is_empty() {
                log::warn!(
                    "{} ratings missing; check join.aliases for the names above",
                    report.misses.len()
                );
            }
            log::info!("Annotated results saved to {}", output.display());
        }
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if cli.dedup {
        config.sink.dedup = true;
    }
    let policy = if cli.fail_fast {
        UnitPolicy::Abort
    } else {
        UnitPolicy::Skip
    };

    let command = match cli.command {
        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            return Ok(());
        }
        Command::Scrape(command) => command,
    };

    config.validate()?;

    #[cfg(feature = "browser")]
    if cli.browser {
        let fetcher = BrowserFetcher::launch(&config.crawler).await?;
        let result = execute(command, &config, &fetcher, policy).await;
        fetcher.close().await?;
        return result;
    }

    let fetcher = HttpFetcher::new(&config.crawler)?;
    execute(command, &config, &fetcher, policy).await?;

    log::info!("Done!");
    Ok(())
}
