//! Per-company cutoff instants.
//!
//! Every bucket under one company is judged against the same cutoff, computed
//! once per pass from a single `now`. A sweep that straddles midnight still
//! applies one boundary per company.

use chrono::{NaiveDateTime, TimeDelta};
use reap_schema::{PolicyTable, RetentionPolicy};
use std::collections::HashMap;

/// `now - retention_days` days.
///
/// Windows too large for the calendar clamp to the earliest representable
/// instant, which retains everything.
pub fn cutoff_for(policy: &RetentionPolicy, now: NaiveDateTime) -> NaiveDateTime {
    TimeDelta::try_days(i64::from(policy.retention_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Memoized cutoffs for one sweep pass.
#[derive(Debug)]
pub struct CutoffCache<'a> {
    policies: &'a PolicyTable,
    now: NaiveDateTime,
    cutoffs: HashMap<String, NaiveDateTime>,
}

impl<'a> CutoffCache<'a> {
    /// Start an empty cache for a pass anchored at `now`.
    pub fn new(policies: &'a PolicyTable, now: NaiveDateTime) -> Self {
        Self {
            policies,
            now,
            cutoffs: HashMap::new(),
        }
    }

    /// Policy governing `company_id`.
    pub fn policy(&self, company_id: &str) -> &'a RetentionPolicy {
        self.policies.resolve(company_id)
    }

    /// Whether the cutoff for `company_id` has already been computed.
    pub fn is_cached(&self, company_id: &str) -> bool {
        self.cutoffs.contains_key(company_id)
    }

    /// Cutoff for `company_id`, computed on first use.
    pub fn cutoff(&mut self, company_id: &str) -> NaiveDateTime {
        if let Some(cutoff) = self.cutoffs.get(company_id) {
            return *cutoff;
        }

        let policy = self.policies.resolve(company_id);
        let cutoff = cutoff_for(policy, self.now);
        tracing::debug!(
            company = company_id,
            policy = %policy.company_id,
            retention_days = policy.retention_days,
            %cutoff,
            "Computed retention cutoff"
        );
        self.cutoffs.insert(company_id.to_string(), cutoff);
        cutoff
    }

    /// Number of distinct companies seen so far.
    pub fn len(&self) -> usize {
        self.cutoffs.len()
    }

    /// True before the first lookup.
    pub fn is_empty(&self) -> bool {
        self.cutoffs.is_empty()
    }
}
