//! Filesystem seam for the sweep.
//!
//! The sweep only ever probes, lists, and deletes. Keeping those behind a
//! trait lets callers wrap the real filesystem (for example to inject
//! failures) without touching the traversal logic.

use std::io;
use std::path::{Path, PathBuf};

/// The filesystem operations the sweep is allowed to perform.
pub trait FileSystem: Send + Sync {
    /// Whether anything (file, directory, or symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory (symlinks are not followed).
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be read.
    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Delete a file or symlink.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Delete an empty directory. Never recursive.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, including when the directory is not
    /// empty.
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }
    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).list_children(path)
    }
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        (**self).remove_empty_dir(path)
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir())
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();
        Ok(children)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }
}
