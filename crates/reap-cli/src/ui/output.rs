//! Live sweep progress
//!
//! One line per company as its first bucket is reached, one per removed
//! bucket and a short marker per failure. Failure details are printed once,
//! in the summary.

use super::theme::{Theme, plural};
use chrono::NaiveDateTime;
use crossterm::style::Stylize;
use reap_core::{BucketKey, RemovalOutcome, Reporter, SweepFailure};
use reap_schema::RetentionPolicy;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prints sweep events to stdout.
#[derive(Debug)]
pub struct ConsoleReporter {
    root: PathBuf,
    quiet: bool,
    theme: Theme,
}

impl ConsoleReporter {
    pub fn new(root: &Path, quiet: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            quiet,
            theme: Theme::default(),
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Live marker for a failure: kind and relative path, no message.
    fn failure_line(&self, failure: &SweepFailure) -> String {
        format!("[{}] {}", failure.kind, self.relative(&failure.path).display())
    }

    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

impl Reporter for ConsoleReporter {
    fn company_started(&self, company: &str, policy: &RetentionPolicy, cutoff: NaiveDateTime) {
        if self.quiet {
            return;
        }
        let theme = &self.theme;
        let name = format!("{company:<width$}", width = theme.layout.company_width);
        let line = format!(
            "  {} {} {}",
            name.with(theme.colors.company).bold(),
            plural(u64::from(policy.retention_days), "day", "days").with(theme.colors.secondary),
            format!("cutoff {cutoff}").with(theme.colors.secondary)
        );
        self.emit(&line);
    }

    fn bucket_removed(&self, path: &Path, key: &BucketKey, outcome: &RemovalOutcome) {
        if self.quiet {
            return;
        }
        let theme = &self.theme;
        let rel = self.relative(path).display().to_string();
        let detail = format!(
            "{}, {}",
            key.granularity(),
            plural(outcome.entries_removed, "entry", "entries")
        );
        let line = if outcome.fully_removed {
            format!(
                "    {} {} {}",
                theme.icons.success.with(theme.colors.success),
                rel,
                detail.with(theme.colors.secondary)
            )
        } else {
            format!(
                "    {} {} {}",
                theme.icons.warning.with(theme.colors.warning),
                rel,
                format!("partially removed ({detail})").with(theme.colors.warning)
            )
        };
        self.emit(&line);
    }

    fn failure(&self, failure: &SweepFailure) {
        if self.quiet {
            return;
        }
        let theme = &self.theme;
        let line = format!(
            "    {} {}",
            theme.icons.warning.with(theme.colors.warning),
            self.failure_line(failure).with(theme.colors.warning)
        );
        self.emit(&line);
    }
}
