use crate::ui::{ConsoleReporter, summary};
use crate::{PolicyArgs, resolve_jobs};
use anyhow::{Context, Result};
use reap_core::{MalformedPolicy, SweepOptions, Sweeper};
use std::path::Path;
use std::time::Instant;

/// Sweep `root` once with the configured policies.
///
/// Per-entry failures are reported in the summary and do not fail the
/// command. Only a missing root, an unusable policy file or a strict-mode
/// abort return an error.
pub fn sweep(root: &Path, args: &PolicyArgs, jobs: usize, strict: bool, quiet: bool) -> Result<()> {
    let (_, policies) = super::load_policies(args.policy.as_deref())?;
    let now = args.reference_instant();

    let options = SweepOptions {
        jobs: resolve_jobs(jobs),
        on_malformed: if strict {
            MalformedPolicy::Abort
        } else {
            MalformedPolicy::Skip
        },
    };
    let reporter = ConsoleReporter::new(root, quiet);
    let sweeper = Sweeper::new(root, &policies, now)
        .with_context(|| format!("Cannot sweep {}", root.display()))?
        .with_options(options)
        .with_reporter(&reporter);

    let start = Instant::now();
    let report = sweeper.run().context("Sweep aborted")?;
    summary::print_summary(&report, start.elapsed());

    Ok(())
}
