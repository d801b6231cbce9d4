//! Sweeps over real temporary trees.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use reap_core::{
    BucketKey, FailureKind, FileSystem, LocalFs, RemovalOutcome, Reporter, SweepFailure,
    SweepReport, Sweeper,
};
use reap_schema::{PolicyTable, RetentionPolicy};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A sweep root populated with bucket directories.
struct Tree {
    temp_dir: TempDir,
}

impl Tree {
    fn new(dirs: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        for rel in dirs {
            let dir = temp_dir.path().join(rel);
            std::fs::create_dir_all(&dir).expect("failed to create bucket");
            std::fs::write(dir.join("data.log"), b"payload").expect("failed to write file");
        }
        Self { temp_dir }
    }

    fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn acme_policies() -> PolicyTable {
    PolicyTable::new(RetentionPolicy::new("default", 365))
        .with_company(RetentionPolicy::new("acme", 30))
        .unwrap()
}

fn sweep(root: &Path, policies: &PolicyTable, now: NaiveDateTime) -> SweepReport {
    Sweeper::new(root, policies, now)
        .expect("valid root")
        .run()
        .expect("sweep should not abort")
}

#[test]
fn test_end_to_end_scenario() {
    let tree = Tree::new(&["acme/logs/2022/01", "acme/logs/2023/06", "other/logs/2023/06"]);
    let policies = acme_policies();

    // acme's cutoff is 2023-06-01: the 2022 year is gone, June 2023 has not
    // ended before the cutoff yet.
    let report = sweep(tree.root(), &policies, at(2023, 7, 1, 0, 0, 0));
    assert!(!tree.exists("acme/logs/2022"));
    assert!(tree.exists("acme/logs/2023/06/data.log"));
    assert!(tree.exists("other/logs/2023/06/data.log"));
    assert!(!report.has_failures());
    assert_eq!(report.buckets_removed, 1);

    // 30 days after the end of June the month is fully behind the cutoff.
    let report = sweep(tree.root(), &policies, at(2023, 7, 31, 0, 0, 0));
    assert!(!tree.exists("acme/logs/2023/06"));
    assert!(tree.exists("acme/logs/2023"));
    assert!(tree.exists("other/logs/2023/06/data.log"));
    assert_eq!(report.buckets_removed, 1);
}

#[test]
fn test_second_run_is_a_no_op() {
    let tree = Tree::new(&[
        "acme/logs/2020/01/01",
        "acme/logs/2023/05/15/10/30",
        "acme/logs/2023/06/30",
        "other/tag/2019",
        "other/tag/2023/01",
    ]);
    let policies = acme_policies();
    let now = at(2023, 7, 1, 0, 0, 0);

    let first = sweep(tree.root(), &policies, now);
    assert!(first.buckets_removed > 0);
    assert!(!first.has_failures());

    let second = sweep(tree.root(), &policies, now);
    assert_eq!(second.buckets_removed, 0);
    assert_eq!(second.entries_removed, 0);
    assert!(!second.has_failures());
}

#[test]
fn test_end_equal_to_cutoff_is_retained() {
    let tree = Tree::new(&["acme/logs/2023/06/01/00/00"]);
    let policies = acme_policies();
    let bucket_end = at(2023, 6, 1, 0, 0, 59);

    // cutoff == end instant: kept
    let now = bucket_end + TimeDelta::days(30);
    let report = sweep(tree.root(), &policies, now);
    assert!(tree.exists("acme/logs/2023/06/01/00/00"));
    assert_eq!(report.buckets_removed, 0);

    // one second later the whole minute is behind the cutoff
    let report = sweep(tree.root(), &policies, now + TimeDelta::seconds(1));
    assert!(!tree.exists("acme/logs/2023/06/01/00/00"));
    assert!(tree.exists("acme/logs/2023/06/01/00"));
    assert_eq!(report.buckets_removed, 1);
}

#[test]
fn test_month_is_kept_until_its_last_second_passes() {
    let tree = Tree::new(&["acme/logs/2024/03"]);
    let policies = PolicyTable::new(RetentionPolicy::new("default", 0));

    sweep(tree.root(), &policies, at(2024, 3, 31, 23, 59, 59));
    assert!(tree.exists("acme/logs/2024/03"));

    sweep(tree.root(), &policies, at(2024, 4, 1, 0, 0, 0));
    assert!(!tree.exists("acme/logs/2024/03"));
}

#[test]
fn test_coarse_bucket_removes_all_descendants() {
    let tree = Tree::new(&[
        "acme/tag/2020/01/01/01/01",
        "acme/tag/2020/06/15",
        "acme/tag/2020/12",
    ]);
    let policies = acme_policies();

    let report = sweep(tree.root(), &policies, at(2023, 7, 1, 0, 0, 0));

    assert!(!tree.exists("acme/tag/2020"));
    assert!(tree.exists("acme/tag"));
    assert_eq!(report.dirs_visited, 1);
    assert_eq!(report.buckets_removed, 1);
    // three data.log files and eight directories, 2020 included
    assert_eq!(report.entries_removed, 11);
}

/// Fails to delete one file, like a permission problem would.
struct DenyOne {
    denied: PathBuf,
}

impl FileSystem for DenyOne {
    fn exists(&self, path: &Path) -> bool {
        LocalFs.exists(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        LocalFs.is_dir(path)
    }
    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        LocalFs.list_children(path)
    }
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if path == self.denied {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        LocalFs.remove_file(path)
    }
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        LocalFs.remove_empty_dir(path)
    }
}

#[test]
fn test_partial_failure_is_isolated() {
    let tree = Tree::new(&["acme/logs/2020/01", "acme/logs/2021/01", "beta/logs/2019"]);
    std::fs::write(tree.root().join("acme/logs/2020/01/sibling.log"), b"x").unwrap();
    let fs = DenyOne {
        denied: tree.root().join("acme/logs/2020/01/data.log"),
    };
    let policies = acme_policies();

    let report = Sweeper::new(tree.root(), &policies, at(2023, 7, 1, 0, 0, 0))
        .unwrap()
        .with_fs(&fs)
        .run()
        .unwrap();

    // The denied file stays, its sibling is gone.
    assert!(tree.exists("acme/logs/2020/01/data.log"));
    assert!(!tree.exists("acme/logs/2020/01/sibling.log"));
    // Sibling buckets are processed regardless.
    assert!(!tree.exists("acme/logs/2021"));
    assert!(!tree.exists("beta/logs/2019"));

    assert_eq!(report.buckets_incomplete, 1);
    assert_eq!(report.buckets_removed, 2);
    assert_eq!(report.count_of(FailureKind::RemoveFile), 1);
    assert_eq!(report.count_of(FailureKind::Incomplete), 1);
    let incomplete = report
        .failures
        .iter()
        .find(|f| f.kind == FailureKind::Incomplete)
        .unwrap();
    assert_eq!(incomplete.path, tree.root().join("acme/logs/2020"));
}

/// Records reporter events.
#[derive(Default)]
struct Recorder {
    companies: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    failures: Mutex<Vec<FailureKind>>,
}

impl Reporter for Recorder {
    fn company_started(&self, company: &str, _: &RetentionPolicy, _: NaiveDateTime) {
        self.companies.lock().unwrap().push(company.to_string());
    }
    fn bucket_removed(&self, _: &Path, key: &BucketKey, _: &RemovalOutcome) {
        self.removed.lock().unwrap().push(key.to_string());
    }
    fn failure(&self, failure: &SweepFailure) {
        self.failures.lock().unwrap().push(failure.kind);
    }
}

#[test]
fn test_reporter_sees_events_in_walk_order() {
    let tree = Tree::new(&[
        "acme/logs/2021/02",
        "acme/logs/2023/05/20",
        "acme/logs/junk",
        "zed/logs/2001",
    ]);
    let policies = acme_policies();
    let recorder = Recorder::default();

    Sweeper::new(tree.root(), &policies, at(2023, 7, 1, 0, 0, 0))
        .unwrap()
        .with_reporter(&recorder)
        .run()
        .unwrap();

    assert_eq!(*recorder.companies.lock().unwrap(), ["acme", "zed"]);
    assert_eq!(*recorder.removed.lock().unwrap(), ["2021", "2023/05", "2001"]);
    assert_eq!(*recorder.failures.lock().unwrap(), [FailureKind::MalformedBucket]);
}
