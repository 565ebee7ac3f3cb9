//! Deterministic ordering helpers.
//!
//! Report ordering is part of the output contract: identical inputs must
//! yield identical reports regardless of how findings were collected.

use crate::report::model::{Finding, MachineIssues};

/// Sort report entries by machine id, ascending.
pub fn sort_by_machine_id(entries: &mut [MachineIssues]) {
    entries.sort_by(|a, b| a.id().cmp(b.id()));
}

/// Sort findings into canonical catalog order.
///
/// The sort is stable, so repeated findings of one type keep their order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by_key(|f| f.issue_type);
}
