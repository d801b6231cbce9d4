//! Shared types for reap: retention policies and the policy document format.
//!
//! The policy table is loaded once before a sweep starts and is read-only
//! afterwards. Loading is the only fallible step; lookups never fail.

pub mod paths;
pub mod policy;

// Re-exports
pub use paths::*;
pub use policy::{DEFAULT_COMPANY_ID, PolicyDocument, PolicyError, PolicyTable, RetentionPolicy};
