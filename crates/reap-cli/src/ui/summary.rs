//! End-of-sweep summary

use super::theme::{Theme, format_elapsed, plural};
use crossterm::style::Stylize;
use reap_core::SweepReport;
use std::time::Duration;

/// Counts line, without styling.
pub fn summary_line(report: &SweepReport) -> String {
    let mut line = format!(
        "{} removed, {} retained",
        plural(report.buckets_removed, "bucket", "buckets"),
        report.buckets_retained
    );
    if report.buckets_incomplete > 0 {
        line.push_str(&format!(", {} incomplete", report.buckets_incomplete));
    }
    line.push_str(&format!(
        " ({} deleted, {} visited",
        plural(report.entries_removed, "entry", "entries"),
        plural(report.dirs_visited, "directory", "directories")
    ));
    if report.vanished_skipped > 0 {
        line.push_str(&format!(", {} vanished", report.vanished_skipped));
    }
    line.push(')');
    line
}

/// Print the counts line and every recorded failure.
pub fn print_summary(report: &SweepReport, elapsed: Duration) {
    let theme = Theme::default();

    println!();
    println!(
        "  {} {} {}",
        "Swept".bold(),
        summary_line(report),
        format!("in {}", format_elapsed(elapsed)).with(theme.colors.secondary)
    );

    if !report.has_failures() {
        return;
    }

    let count = plural(report.failures.len() as u64, "failure", "failures");
    println!();
    println!("  {}", count.with(theme.colors.warning).bold());
    for failure in &report.failures {
        println!(
            "    {} {}: {}",
            format!("[{}]", failure.kind).with(theme.colors.warning),
            failure.path.display(),
            failure.message.as_str().with(theme.colors.secondary)
        );
    }
}
