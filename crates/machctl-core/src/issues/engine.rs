//! Engine driver.
//!
//! Runs every included evaluator over every machine and assembles the
//! report.
//!
//! Determinism guarantees:
//! - "now" is read once per run; [`find_issues_at`] takes it explicitly
//! - Entries are sorted by machine id, ascending
//! - Findings per machine follow catalog order. The catalog-outer loop
//!   already fills buckets in that order; the final `sort_findings` pass
//!   is a safety net and does not rely on the loop shape
//! - A folded duplicate-id entry carries the first record with that id in
//!   inventory order
//!
//! The driver does no I/O and no logging. Machines are only read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::issues::catalog::for_each_issue_type;
use crate::issues::config::IssueConfig;
use crate::issues::eval::{EvalContext, new_evaluator_for};
use crate::machine::Machine;
use crate::report::model::{Finding, MachineIssues, Report};
use crate::util::deterministic::{sort_by_machine_id, sort_findings};

/// Evaluates `config.machines` against the catalog at the current time.
pub fn find_issues(config: &IssueConfig<'_>) -> Report {
    find_issues_at(config, Utc::now())
}

/// Evaluates `config.machines` as of `now`.
///
/// Machines without an id are skipped. Records sharing an id are folded
/// into a single entry, which carries the first such record in inventory
/// order and the findings of all of them.
pub fn find_issues_at(config: &IssueConfig<'_>, now: DateTime<Utc>) -> Report {
    let ctx = EvalContext::new(config, now);

    let mut first_seen: HashMap<&str, &Machine> = HashMap::new();
    for machine in config.machines {
        if let Some(id) = machine.id() {
            first_seen.entry(id).or_insert(machine);
        }
    }

    let mut buckets: HashMap<&str, MachineIssues> = HashMap::new();

    // Issue types form the outer loop so that each bucket fills in
    // catalog order.
    for_each_issue_type(|issue_type| {
        if !config.include_issue(issue_type) {
            return;
        }
        for machine in config.machines {
            let Some(id) = machine.id() else {
                continue;
            };
            let mut evaluator = new_evaluator_for(issue_type);
            if !evaluator.evaluate(machine, &ctx) {
                continue;
            }
            buckets
                .entry(id)
                .or_insert_with(|| MachineIssues {
                    machine: first_seen.get(id).copied().unwrap_or(machine).clone(),
                    issues: Vec::new(),
                })
                .issues
                .push(Finding::new(evaluator.spec(), evaluator.details()));
        }
    });

    let mut entries: Vec<MachineIssues> = buckets.into_values().collect();
    for entry in &mut entries {
        sort_findings(&mut entry.issues);
    }
    sort_by_machine_id(&mut entries);

    Report::from_sorted(entries)
}
