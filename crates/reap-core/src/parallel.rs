//! Company fan-out.
//!
//! Company subtrees never overlap, so they can be swept concurrently. A
//! rayon pool sized to `jobs` takes whole companies and walks each one with
//! the ordered single-pass sweep; nothing inside a company is ever split
//! across threads. The pool lives only for the duration of one call.

use crate::report::{FailureKind, SweepFailure, SweepReport};
use crate::resolver::CutoffCache;
use crate::sweep::{SweepError, Sweeper};
use rayon::prelude::*;
use std::path::PathBuf;

/// Sweep every company directory under the root using up to `jobs` threads.
pub(crate) fn sweep_companies(sweeper: &Sweeper<'_>, jobs: usize) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::default();
    let companies = match company_dirs(sweeper) {
        Ok(companies) => companies,
        Err(err) => {
            tracing::warn!(root = %sweeper.root().display(), error = %err, "Failed to list companies");
            report.record(SweepFailure::new(FailureKind::Walk, sweeper.root(), err));
            return Ok(report);
        }
    };

    let workers = jobs.min(companies.len()).max(1);
    tracing::debug!(companies = companies.len(), workers, "Fanning out over companies");

    let sweep_company = |company: &PathBuf| -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::default();
        let mut cutoffs = CutoffCache::new(sweeper.policies(), sweeper.now());
        sweeper.sweep_subtree(company, &mut cutoffs, &mut report)?;
        Ok(report)
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("reap-sweep-{i}"))
        .build();
    // Collecting into a Result stops handing out companies after the first
    // abort.
    let reports = match pool {
        Ok(pool) => pool.install(|| {
            companies
                .par_iter()
                .map(&sweep_company)
                .collect::<Result<Vec<_>, _>>()
        })?,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to start worker pool, sweeping in order");
            companies
                .iter()
                .map(&sweep_company)
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    for company_report in reports {
        report.merge(company_report);
    }
    Ok(report)
}

/// Directories directly under the root, sorted by name.
fn company_dirs(sweeper: &Sweeper<'_>) -> std::io::Result<Vec<PathBuf>> {
    let fs = sweeper.fs();
    Ok(fs
        .list_children(sweeper.root())?
        .into_iter()
        .filter(|path| fs.is_dir(path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{MalformedPolicy, SweepOptions};
    use crate::bucket::BucketKey;
    use crate::report::RemovalOutcome;
    use crate::reporter::Reporter;
    use chrono::{NaiveDate, NaiveDateTime};
    use reap_schema::{PolicyTable, RetentionPolicy};
    use std::path::Path;
    use std::sync::Mutex;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn build(root: &Path) {
        for company in ["a", "b", "c", "d", "e"] {
            for rel in ["logs/2021/03", "logs/2023/06/30", "metrics/2022"] {
                std::fs::create_dir_all(root.join(company).join(rel)).unwrap();
                std::fs::write(root.join(company).join(rel).join("data"), b"x").unwrap();
            }
        }
        std::fs::write(root.join("stray-file"), b"x").unwrap();
    }

    #[test]
    fn test_fan_out_matches_ordered_walk() {
        let table = PolicyTable::new(RetentionPolicy::new("default", 365))
            .with_company(RetentionPolicy::new("c", 0))
            .unwrap();

        let ordered = tempfile::tempdir().unwrap();
        let fanned = tempfile::tempdir().unwrap();
        build(ordered.path());
        build(fanned.path());

        let a = Sweeper::new(ordered.path(), &table, now()).unwrap().run().unwrap();
        let b = Sweeper::new(fanned.path(), &table, now())
            .unwrap()
            .with_options(SweepOptions {
                jobs: 3,
                ..Default::default()
            })
            .run()
            .unwrap();

        assert_eq!(a.buckets_removed, b.buckets_removed);
        assert_eq!(a.buckets_retained, b.buckets_retained);
        assert_eq!(a.entries_removed, b.entries_removed);
        for company in ["a", "b", "c", "d", "e"] {
            for rel in ["logs/2021", "logs/2023/06/30", "metrics/2022"] {
                let rel = Path::new(company).join(rel);
                assert_eq!(
                    ordered.path().join(&rel).exists(),
                    fanned.path().join(&rel).exists(),
                    "{}",
                    rel.display()
                );
            }
        }
        // Company "c" keeps nothing that has ended.
        assert!(!fanned.path().join("c/logs/2023/06/30").exists());
        assert!(fanned.path().join("a/logs/2023/06/30").exists());
        assert!(fanned.path().join("stray-file").exists());
    }

    #[test]
    fn test_more_jobs_than_companies() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("only/logs/2001")).unwrap();
        let table = PolicyTable::new(RetentionPolicy::new("default", 1));

        let report = Sweeper::new(tmp.path(), &table, now())
            .unwrap()
            .with_options(SweepOptions {
                jobs: 16,
                ..Default::default()
            })
            .run()
            .unwrap();
        assert_eq!(report.buckets_removed, 1);
    }

    #[test]
    fn test_abort_propagates_from_worker() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("x/logs/bad")).unwrap();
        std::fs::create_dir_all(tmp.path().join("y/logs/2023")).unwrap();
        let table = PolicyTable::new(RetentionPolicy::new("default", 1));

        let result = Sweeper::new(tmp.path(), &table, now())
            .unwrap()
            .with_options(SweepOptions {
                jobs: 2,
                on_malformed: MalformedPolicy::Abort,
            })
            .run();
        assert!(matches!(result, Err(SweepError::Malformed { .. })));
    }

    /// Collects company starts and the threads they ran on.
    #[derive(Default)]
    struct Companies {
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Reporter for Companies {
        fn company_started(&self, company: &str, _: &RetentionPolicy, _: NaiveDateTime) {
            let thread = std::thread::current().name().unwrap_or_default().to_string();
            self.seen.lock().unwrap().push((company.to_string(), thread));
        }
        fn bucket_removed(&self, _: &Path, _: &BucketKey, _: &RemovalOutcome) {}
        fn failure(&self, _: &SweepFailure) {}
    }

    #[test]
    fn test_each_company_swept_once_on_pool_threads() {
        let tmp = tempfile::tempdir().unwrap();
        build(tmp.path());
        let table = PolicyTable::new(RetentionPolicy::new("default", 365));
        let companies = Companies::default();

        Sweeper::new(tmp.path(), &table, now())
            .unwrap()
            .with_options(SweepOptions {
                jobs: 2,
                ..Default::default()
            })
            .with_reporter(&companies)
            .run()
            .unwrap();

        let mut seen = companies.seen.into_inner().unwrap();
        assert!(seen.iter().all(|(_, thread)| thread.starts_with("reap-sweep-")));
        seen.sort();
        let names: Vec<_> = seen.into_iter().map(|(company, _)| company).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }
}
