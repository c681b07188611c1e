//! `recur` CLI: expand recurrence rules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Next occurrence on or after a date (rule parameters as JSON on stdin)
//! echo '{"freq":"weekly","days_of_week":["Mo","We","Fr"],"event_start":"2013-01-07"}' \
//!   | recur next --after 2013-01-12
//!
//! # Every occurrence in a window, from a rule file
//! recur between -r rule.json --start 2013-01-01 --end 2013-01-31
//!
//! # Same, as JSON
//! recur between -r rule.json --start 2013-01-01 --end 2013-01-31 --json
//!
//! # Check a rule and print its normalized form
//! recur validate -r rule.json
//!
//! # Encode weekday names into day tokens
//! recur tokens --days Mo,We,Fr --offset 2
//! ```
//!
//! Logging goes to stderr. `RUST_LOG` selects the filter; without it the
//! level is `warn`, or `debug` with `--verbose`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use recurrence_engine::{codec, engine, enumerator, Occurrence, RecurrenceRule, ScheduleParams};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "Expand weekly and monthly recurrence rules into dates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log search progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next occurrence on or after a date
    Next {
        /// Rule parameters as JSON (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// Date to search from (YYYY-MM-DD)
        #[arg(long)]
        after: NaiveDate,
        /// Search origin; defaults to the rule's event_start
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Print every occurrence starting inside a window
    Between {
        /// Rule parameters as JSON (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// First day of the window (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the window (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: NaiveDate,
        /// Search origin; defaults to the rule's event_start
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Print a JSON array instead of one line per occurrence
        #[arg(long)]
        json: bool,
    },
    /// Validate a rule and print its normalized form
    Validate {
        /// Rule parameters as JSON (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
    },
    /// Encode weekday names into compact day tokens
    Tokens {
        /// Comma-separated two-letter weekday names (e.g. Mo,We,Fr)
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<String>,
        /// Offset shared by every weekday (e.g. 2, or -1 for "last")
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Next { rule, after, from } => {
            let rule = load_rule(rule.as_deref())?;
            let start = from.unwrap_or_else(|| rule.anchor_start());
            let next = engine::next_event_after(&rule, after, start)
                .context("Failed to find the next occurrence")?;
            println!("{}", next);
        }
        Commands::Between {
            rule,
            start,
            end,
            from,
            json,
        } => {
            let rule = load_rule(rule.as_deref())?;
            let origin = from.unwrap_or_else(|| rule.anchor_start());
            let occurrences: Vec<Occurrence> = enumerator::events_between(&rule, start, end, origin)
                .try_collect_vec()
                .context("Failed to enumerate occurrences")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&occurrences)?);
            } else {
                for occurrence in &occurrences {
                    println!("{} {}", occurrence.start_date, occurrence.end_date);
                }
            }
        }
        Commands::Validate { rule } => {
            let rule = load_rule(rule.as_deref())?;
            println!("{}", rule);
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }
        Commands::Tokens { days, offset } => {
            let tokens = codec::encode_by_day(&days, offset);
            if tokens.is_empty() {
                anyhow::bail!(
                    "No recognized weekday in '{}'. Use two-letter names: Su,Mo,Tu,We,Th,Fr,Sa",
                    days.join(",")
                );
            }
            println!("{}", tokens);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_rule(path: Option<&str>) -> Result<RecurrenceRule> {
    let json = read_input(path)?;
    let params = ScheduleParams::from_json(&json).context("Failed to parse rule parameters")?;
    let rule = params.into_rule().context("Invalid rule")?;
    tracing::debug!(%rule, "loaded rule");
    Ok(rule)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
