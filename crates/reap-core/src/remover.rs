//! Post-order removal of one expired bucket.
//!
//! Files go first, then each directory once its children are gone. A failed
//! entry is recorded and its siblings are still processed; a directory that
//! still has children simply fails to delete and is recorded too.

use crate::fs::FileSystem;
use crate::report::{FailureKind, RemovalOutcome, SweepFailure};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Delete `dir` and everything beneath it. Never fails as a whole.
///
/// Entries that vanish between enumeration and deletion are treated as
/// already removed.
pub fn remove_tree(fs: &dyn FileSystem, dir: &Path) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();

    for entry in WalkDir::new(dir).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if is_not_found(err.io_error()) {
                    continue;
                }
                let path = err.path().unwrap_or(dir);
                tracing::warn!(path = %path.display(), error = %err, "Failed to enumerate entry");
                outcome
                    .failures
                    .push(SweepFailure::new(FailureKind::Walk, path, &err));
                continue;
            }
        };

        let path = entry.path();
        let (kind, result) = if entry.file_type().is_dir() {
            (FailureKind::RemoveDir, fs.remove_empty_dir(path))
        } else {
            (FailureKind::RemoveFile, fs.remove_file(path))
        };

        match result {
            Ok(()) => outcome.entries_removed += 1,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "Entry already gone");
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to delete entry");
                outcome.failures.push(SweepFailure::new(kind, path, err));
            }
        }
    }

    outcome.fully_removed = !fs.exists(dir);
    if !outcome.fully_removed {
        outcome.failures.push(SweepFailure::new(
            FailureKind::Incomplete,
            dir,
            "bucket was only partially removed",
        ));
    }
    outcome
}

fn is_not_found(err: Option<&io::Error>) -> bool {
    err.is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
