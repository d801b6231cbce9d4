//! Sweep results.
//!
//! Per-entry failures never abort a sweep. They are collected here as values
//! and rendered once when the sweep finishes.

use std::fmt;
use std::path::{Path, PathBuf};

/// What kind of per-entry problem was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A directory in the date hierarchy is not a valid bucket component.
    MalformedBucket,
    /// A directory could not be enumerated.
    Walk,
    /// A file or symlink could not be deleted.
    RemoveFile,
    /// A directory could not be deleted (usually because it is not empty).
    RemoveDir,
    /// A bucket selected for deletion still exists after removal.
    Incomplete,
}

impl FailureKind {
    /// Short label for summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedBucket => "malformed",
            Self::Walk => "walk",
            Self::RemoveFile => "remove-file",
            Self::RemoveDir => "remove-dir",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded per-entry failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    /// Entry the failure refers to.
    pub path: PathBuf,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl SweepFailure {
    /// Record a failure for `path`.
    pub fn new(kind: FailureKind, path: &Path, message: impl fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for SweepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path.display(), self.message)
    }
}

/// Outcome of removing one bucket subtree.
#[derive(Debug, Clone, Default)]
pub struct RemovalOutcome {
    /// Files, symlinks, and directories deleted (the bucket itself included).
    pub entries_removed: u64,
    /// Entries that could not be deleted.
    pub failures: Vec<SweepFailure>,
    /// Whether the bucket directory is gone.
    pub fully_removed: bool,
}

/// Counters and failures for a whole sweep (or one company subtree).
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Candidate bucket directories examined.
    pub dirs_visited: u64,
    /// Expired buckets removed completely.
    pub buckets_removed: u64,
    /// Expired buckets that could only be removed partially.
    pub buckets_incomplete: u64,
    /// Buckets still inside their retention window.
    pub buckets_retained: u64,
    /// Entries that disappeared before they were visited.
    pub vanished_skipped: u64,
    /// Individual filesystem entries deleted.
    pub entries_removed: u64,
    /// Everything that went wrong, in the order it happened.
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Fold in the outcome of one bucket removal.
    pub fn absorb(&mut self, outcome: RemovalOutcome) {
        self.entries_removed += outcome.entries_removed;
        if outcome.fully_removed {
            self.buckets_removed += 1;
        } else {
            self.buckets_incomplete += 1;
        }
        self.failures.extend(outcome.failures);
    }

    /// Add another report's counters and failures to this one.
    pub fn merge(&mut self, other: SweepReport) {
        self.dirs_visited += other.dirs_visited;
        self.buckets_removed += other.buckets_removed;
        self.buckets_incomplete += other.buckets_incomplete;
        self.buckets_retained += other.buckets_retained;
        self.vanished_skipped += other.vanished_skipped;
        self.entries_removed += other.entries_removed;
        self.failures.extend(other.failures);
    }

    /// Record a single failure.
    pub fn record(&mut self, failure: SweepFailure) {
        self.failures.push(failure);
    }

    /// Whether anything was recorded as failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of failures of one kind.
    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_counts_incomplete_buckets() {
        let mut report = SweepReport::default();
        report.absorb(RemovalOutcome {
            entries_removed: 3,
            failures: vec![],
            fully_removed: true,
        });
        report.absorb(RemovalOutcome {
            entries_removed: 1,
            failures: vec![SweepFailure::new(
                FailureKind::RemoveFile,
                Path::new("a/b/2020/locked"),
                "permission denied",
            )],
            fully_removed: false,
        });

        assert_eq!(report.entries_removed, 4);
        assert_eq!(report.buckets_removed, 1);
        assert_eq!(report.buckets_incomplete, 1);
        assert_eq!(report.count_of(FailureKind::RemoveFile), 1);
    }

    #[test]
    fn test_merge_sums_and_concatenates() {
        let mut a = SweepReport {
            dirs_visited: 2,
            buckets_retained: 1,
            ..Default::default()
        };
        a.record(SweepFailure::new(FailureKind::Walk, Path::new("x"), "boom"));
        let mut b = SweepReport {
            dirs_visited: 5,
            vanished_skipped: 1,
            ..Default::default()
        };
        b.record(SweepFailure::new(FailureKind::MalformedBucket, Path::new("y"), "bad"));

        a.merge(b);
        assert_eq!(a.dirs_visited, 7);
        assert_eq!(a.vanished_skipped, 1);
        assert_eq!(a.failures.len(), 2);
        assert_eq!(a.failures[1].kind, FailureKind::MalformedBucket);
    }

    #[test]
    fn test_failure_display() {
        let failure = SweepFailure::new(FailureKind::RemoveDir, Path::new("c/t/2020"), "not empty");
        assert_eq!(failure.to_string(), "[remove-dir] c/t/2020: not empty");
    }
}
