//! Reporter trait for dependency injection
//!
//! The sweep reports progress through this trait so the engine is not coupled
//! to a specific terminal UI. The final [`SweepReport`](crate::SweepReport) is
//! still the authoritative result; reporters only see events as they happen.

use crate::bucket::BucketKey;
use crate::report::{RemovalOutcome, SweepFailure};
use chrono::NaiveDateTime;
use reap_schema::RetentionPolicy;
use std::path::Path;

/// Observer for sweep progress. Shared across worker threads.
pub trait Reporter: Send + Sync {
    /// The first bucket of a company was reached and its cutoff computed.
    fn company_started(&self, company: &str, policy: &RetentionPolicy, cutoff: NaiveDateTime);

    /// An expired bucket was removed (possibly only partially).
    fn bucket_removed(&self, path: &Path, key: &BucketKey, outcome: &RemovalOutcome);

    /// A per-entry failure was recorded.
    fn failure(&self, failure: &SweepFailure);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn company_started(&self, company: &str, policy: &RetentionPolicy, cutoff: NaiveDateTime) {
        (**self).company_started(company, policy, cutoff);
    }
    fn bucket_removed(&self, path: &Path, key: &BucketKey, outcome: &RemovalOutcome) {
        (**self).bucket_removed(path, key, outcome);
    }
    fn failure(&self, failure: &SweepFailure) {
        (**self).failure(failure);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn company_started(&self, _: &str, _: &RetentionPolicy, _: NaiveDateTime) {}
    fn bucket_removed(&self, _: &Path, _: &BucketKey, _: &RemovalOutcome) {}
    fn failure(&self, _: &SweepFailure) {}
}
