//! Command implementations

pub mod check;
pub mod sweep;

use anyhow::{Context, Result};
use reap_schema::PolicyTable;
use std::path::{Path, PathBuf};

/// Resolve the policy file location: the flag, then $REAP_POLICY, then the
/// config directory.
pub fn policy_path(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.to_path_buf()),
        None => reap_schema::default_policy_path()
            .context("No --policy given and no config directory could be determined"),
    }
}

/// Load and validate the policy table.
pub fn load_policies(flag: Option<&Path>) -> Result<(PathBuf, PolicyTable)> {
    let path = policy_path(flag)?;
    let table = PolicyTable::load(&path)
        .with_context(|| format!("Failed to load policy file {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        overrides = table.override_count(),
        "Loaded retention policies"
    );
    Ok((path, table))
}
