//! Core library for reap: the retention sweep engine.
//!
//! The tree being swept looks like
//! `<root>/<company>/<tag>/<year>/<month>/<day>/<hour>/<minute>`. A directory
//! at any of the date levels is a *bucket* covering a time range. Buckets
//! whose whole range ended before the company's cutoff are removed.
//!
//! - [`bucket`]: parse date segments and compute a bucket's end instant.
//! - [`resolver`]: per-company cutoffs, cached for one pass.
//! - [`sweep`]: the ordered single-pass walk.
//! - `parallel`: optional fan-out over independent companies.
//! - [`remover`]: post-order deletion that tolerates per-entry failures.

pub mod bucket;
pub mod clock;
pub mod fs;
mod parallel;
pub mod remover;
pub mod report;
pub mod reporter;
pub mod resolver;
pub mod sweep;

pub use bucket::{BucketKey, Granularity, MalformedBucketPath, end_instant};
pub use clock::WallClock;
pub use fs::{FileSystem, LocalFs};
pub use report::{FailureKind, RemovalOutcome, SweepFailure, SweepReport};
pub use reporter::{NullReporter, Reporter};
pub use resolver::{CutoffCache, cutoff_for};
pub use sweep::{MalformedPolicy, SweepError, SweepOptions, Sweeper};
