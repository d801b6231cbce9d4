//! reap - sweep expired time buckets
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Deletes date-bucketed directories once a company's retention window has
//! passed them.
//!
//! # Directory Layout
//!
//! ```text
//! <root>/
//! └── <company>/            # selects the retention policy
//!     └── <tag>/            # opaque, never judged
//!         └── 2023/         # year bucket
//!             └── 06/       # month bucket
//!                 └── 30/   # day, then hour, then minute
//! ```
//!
//! A bucket is removed once its *whole* range ended before
//! `now - retentionDays`.

pub mod cmd;
pub mod ui;

pub use reap_core::{MalformedPolicy, SweepOptions, WallClock};
pub use reap_schema::{PolicyTable, default_policy_path};

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reap")]
#[command(author, version, about = "reap - sweep expired time buckets from a company/date tree")]
pub struct Cli {
    /// Suppress per-bucket progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete every bucket whose retention window has passed
    Sweep {
        /// Root of the <company>/<tag>/<year>/... tree
        root: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Worker threads over company directories (0 = one per CPU)
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,

        /// Abort on the first malformed bucket directory instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Validate the policy file and show each company's cutoff
    Check {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Options shared by commands that evaluate policies.
#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// Policy file (JSON, or TOML with a .toml extension).
    /// Defaults to $REAP_POLICY, then <config dir>/reap/policy.json
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Read "now" in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Pin the reference instant (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD)
    #[arg(long, hide = true, value_parser = parse_instant)]
    pub now: Option<NaiveDateTime>,
}

impl PolicyArgs {
    /// The wall clock selected by `--utc`.
    pub fn clock(&self) -> WallClock {
        if self.utc {
            WallClock::Utc
        } else {
            WallClock::Local
        }
    }

    /// `--now` if given, otherwise the current time on the selected clock.
    pub fn reference_instant(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| self.clock().now())
    }
}

/// Parse a `--now` value.
///
/// # Example
///
/// ```
/// use reap_cli::parse_instant;
///
/// let t = parse_instant("2023-07-01").unwrap();
/// assert_eq!(t.to_string(), "2023-07-01 00:00:00");
/// assert!(parse_instant("July").is_err());
/// ```
pub fn parse_instant(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    for format in FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(instant);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .ok_or_else(|| format!("invalid instant '{value}', expected YYYY-MM-DDTHH:MM:SS"))
}

/// Number of worker threads for `--jobs`.
pub fn resolve_jobs(jobs: usize) -> usize {
    if jobs == 0 { num_cpus::get() } else { jobs }
}
