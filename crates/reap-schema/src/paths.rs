//! Well-known locations for the policy file.

use dirs::config_dir;
use std::path::PathBuf;

/// Environment variable that overrides the policy file location.
pub const POLICY_ENV: &str = "REAP_POLICY";

/// Returns the configuration directory (`<config dir>/reap`), or None if the
/// platform config directory cannot be resolved.
pub fn try_reap_config_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("reap"))
}

/// Policy file used when none is given on the command line.
///
/// `$REAP_POLICY` wins; otherwise `<config dir>/reap/policy.json`.
pub fn default_policy_path() -> Option<PathBuf> {
    if let Some(val) = std::env::var_os(POLICY_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(val));
    }
    try_reap_config_dir().map(|dir| dir.join("policy.json"))
}
