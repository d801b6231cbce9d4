//! The retention sweep.
//!
//! # Tree layout
//!
//! ```text
//! <root>/<company>/<tag>/<year>[/<month>[/<day>[/<hour>[/<minute>]]]]
//!   0        1       2      3       4       5      6        7
//! ```
//!
//! Depth 1 selects the retention policy, depth 2 is opaque, depths 3..=7 are
//! bucket components. Anything deeper is content of a minute bucket.
//!
//! # Ordering
//!
//! Directories are visited in pre-order, one at a time, straight from the
//! walk. A coarse bucket (`2020`) is therefore judged before its children
//! (`2020/01`, ...). When it expires it is removed and the walk is told not to
//! descend, so its children are never visited and never deleted twice. Each
//! visit re-checks existence first because the tree only shrinks during a
//! pass.

use crate::bucket::{BucketKey, MAX_COMPONENTS, MalformedBucketPath};
use crate::fs::{FileSystem, LocalFs};
use crate::parallel;
use crate::remover::remove_tree;
use crate::report::{FailureKind, SweepFailure, SweepReport};
use crate::reporter::{NullReporter, Reporter};
use crate::resolver::CutoffCache;
use chrono::NaiveDateTime;
use reap_schema::PolicyTable;
use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Depth of the company segment below the root.
pub const COMPANY_DEPTH: usize = 1;

/// Depth of the first bucket component (the year).
pub const BUCKET_DEPTH: usize = 3;

/// Depth of the last bucket component (the minute).
pub const MAX_BUCKET_DEPTH: usize = BUCKET_DEPTH + MAX_COMPONENTS - 1;

static LOCAL_FS: LocalFs = LocalFs;
static NULL_REPORTER: NullReporter = NullReporter;

/// What to do with a directory whose name is not a valid bucket component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Record a failure, leave the subtree alone, keep sweeping.
    #[default]
    Skip,
    /// Stop the sweep with [`SweepError::Malformed`].
    Abort,
}

/// Tuning knobs for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Worker threads. `1` walks the whole tree in one ordered pass; more
    /// fans out over company directories, each still walked in order.
    pub jobs: usize,
    /// Handling of malformed bucket directories.
    pub on_malformed: MalformedPolicy,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

/// Errors that stop a sweep.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    /// The root path does not exist.
    #[error("Sweep root {} does not exist", .0.display())]
    RootMissing(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Sweep root {} is not a directory", .0.display())]
    RootNotDir(PathBuf),

    /// A malformed bucket was found under [`MalformedPolicy::Abort`].
    #[error("Malformed bucket path {}: {source}", .path.display())]
    Malformed {
        /// Offending directory.
        path: PathBuf,
        /// What is wrong with it.
        #[source]
        source: MalformedBucketPath,
    },
}

/// Result of visiting one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Keep walking into the directory.
    Descend,
    /// Do not walk into the directory (removed, vanished, or skipped).
    Prune,
}

/// A configured retention sweep over one root.
pub struct Sweeper<'a> {
    root: PathBuf,
    policies: &'a PolicyTable,
    now: NaiveDateTime,
    options: SweepOptions,
    fs: &'a dyn FileSystem,
    reporter: &'a dyn Reporter,
}

impl std::fmt::Debug for Sweeper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("root", &self.root)
            .field("now", &self.now)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Sweeper<'a> {
    /// Prepare a sweep of `root` judged against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::RootMissing`] or [`SweepError::RootNotDir`]
    /// before anything is touched.
    pub fn new(
        root: impl Into<PathBuf>,
        policies: &'a PolicyTable,
        now: NaiveDateTime,
    ) -> Result<Self, SweepError> {
        let root = root.into();
        // A symlinked root is followed; entries below it never are.
        match std::fs::metadata(&root) {
            Err(_) => return Err(SweepError::RootMissing(root)),
            Ok(meta) if !meta.is_dir() => return Err(SweepError::RootNotDir(root)),
            Ok(_) => {}
        }

        Ok(Self {
            root,
            policies,
            now,
            options: SweepOptions::default(),
            fs: &LOCAL_FS,
            reporter: &NULL_REPORTER,
        })
    }

    /// Replace the sweep options.
    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }

    /// Route probes and deletions through another filesystem.
    pub fn with_fs(mut self, fs: &'a dyn FileSystem) -> Self {
        self.fs = fs;
        self
    }

    /// Receive progress events.
    pub fn with_reporter(mut self, reporter: &'a dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Root being swept.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reference instant for cutoffs.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub(crate) fn policies(&self) -> &'a PolicyTable {
        self.policies
    }

    pub(crate) fn fs(&self) -> &'a dyn FileSystem {
        self.fs
    }

    /// Run the sweep to completion.
    ///
    /// Per-entry failures are collected in the returned report.
    ///
    /// # Errors
    ///
    /// Only [`SweepError::Malformed`] under [`MalformedPolicy::Abort`].
    /// Deletions made before the abort stay made.
    pub fn run(&self) -> Result<SweepReport, SweepError> {
        let started = std::time::Instant::now();
        tracing::info!(
            root = %self.root.display(),
            now = %self.now,
            jobs = self.options.jobs,
            "Starting retention sweep"
        );

        let report = if self.options.jobs <= 1 {
            let mut report = SweepReport::default();
            let mut cutoffs = CutoffCache::new(self.policies, self.now);
            self.sweep_subtree(&self.root, &mut cutoffs, &mut report)?;
            report
        } else {
            parallel::sweep_companies(self, self.options.jobs)?
        };

        tracing::info!(
            visited = report.dirs_visited,
            removed = report.buckets_removed,
            incomplete = report.buckets_incomplete,
            retained = report.buckets_retained,
            failures = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Retention sweep complete"
        );
        Ok(report)
    }

    /// Ordered pre-order walk of `start`, which is the root or a directory
    /// above the bucket levels (a company directory).
    pub(crate) fn sweep_subtree(
        &self,
        start: &Path,
        cutoffs: &mut CutoffCache<'_>,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        let base = self.depth_of(start);
        if base >= BUCKET_DEPTH {
            return Ok(());
        }

        let mut walk = WalkDir::new(start)
            .min_depth(BUCKET_DEPTH - base)
            .max_depth(MAX_BUCKET_DEPTH - base)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walk.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.walk_error(&err, report);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if self.visit(entry.path(), cutoffs, report)? == Visit::Prune {
                walk.skip_current_dir();
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        path: &Path,
        cutoffs: &mut CutoffCache<'_>,
        report: &mut SweepReport,
    ) -> Result<Visit, SweepError> {
        if !self.fs.is_dir(path) {
            tracing::debug!(path = %path.display(), "Skipping vanished directory");
            report.vanished_skipped += 1;
            return Ok(Visit::Prune);
        }
        report.dirs_visited += 1;

        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<_> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect();
        if segments.len() < BUCKET_DEPTH {
            return Ok(Visit::Descend);
        }
        let company = segments[COMPANY_DEPTH - 1].to_string_lossy().into_owned();

        let fresh = !cutoffs.is_cached(&company);
        let cutoff = cutoffs.cutoff(&company);
        if fresh {
            self.reporter
                .company_started(&company, cutoffs.policy(&company), cutoff);
        }

        let key = match parse_key(&segments[BUCKET_DEPTH - 1..]) {
            Ok(key) => key,
            Err(source) => return self.malformed(path, source, report),
        };

        if !key.is_expired(cutoff) {
            tracing::debug!(
                path = %path.display(),
                end = %key.end_instant(),
                %cutoff,
                "Retaining bucket"
            );
            report.buckets_retained += 1;
            return Ok(Visit::Descend);
        }

        tracing::info!(
            path = %path.display(),
            company = %company,
            bucket = %key,
            end = %key.end_instant(),
            %cutoff,
            "Removing expired bucket"
        );
        let outcome = remove_tree(self.fs, path);
        self.reporter.bucket_removed(path, &key, &outcome);
        for failure in &outcome.failures {
            self.reporter.failure(failure);
        }
        report.absorb(outcome);
        Ok(Visit::Prune)
    }

    fn malformed(
        &self,
        path: &Path,
        source: MalformedBucketPath,
        report: &mut SweepReport,
    ) -> Result<Visit, SweepError> {
        match self.options.on_malformed {
            MalformedPolicy::Abort => Err(SweepError::Malformed {
                path: path.to_path_buf(),
                source,
            }),
            MalformedPolicy::Skip => {
                tracing::warn!(path = %path.display(), error = %source, "Skipping malformed bucket");
                let failure = SweepFailure::new(FailureKind::MalformedBucket, path, &source);
                self.reporter.failure(&failure);
                report.record(failure);
                Ok(Visit::Prune)
            }
        }
    }

    fn walk_error(&self, err: &walkdir::Error, report: &mut SweepReport) {
        let path = err.path().unwrap_or(&self.root);
        if err
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
        {
            tracing::debug!(path = %path.display(), "Skipping vanished entry");
            report.vanished_skipped += 1;
            return;
        }
        tracing::warn!(path = %path.display(), error = %err, "Failed to walk directory");
        let failure = SweepFailure::new(FailureKind::Walk, path, err);
        self.reporter.failure(&failure);
        report.record(failure);
    }

    fn depth_of(&self, path: &Path) -> usize {
        path.strip_prefix(&self.root)
            .map_or(0, |rel| rel.components().count())
    }
}

/// Bucket key from the date segments of a path. Non-UTF-8 names are never
/// valid numbers.
fn parse_key(segments: &[&OsStr]) -> Result<BucketKey, MalformedBucketPath> {
    let names = segments
        .iter()
        .map(|name| {
            name.to_str().ok_or_else(|| MalformedBucketPath {
                segment: name.to_string_lossy().into_owned(),
                reason: String::from("not a number"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    BucketKey::parse(&names)
}
