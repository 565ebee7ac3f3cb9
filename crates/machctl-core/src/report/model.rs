use serde::{Deserialize, Serialize};

use crate::issues::catalog::{Issue, IssueType, Severity};
use crate::machine::Machine;

/// One issue observed on one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "id")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_url: Option<String>,
    /// Evaluator supplied context; may be empty.
    #[serde(default)]
    pub details: String,
}

impl Finding {
    pub fn new(issue: Issue, details: impl Into<String>) -> Self {
        Self {
            issue_type: issue.issue_type,
            severity: issue.severity,
            description: issue.description,
            ref_url: issue.ref_url,
            details: details.into(),
        }
    }
}

/// A machine together with its findings, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineIssues {
    pub machine: Machine,
    pub issues: Vec<Finding>,
}

impl MachineIssues {
    /// Id of the machine; reports only contain machines that have one.
    pub fn id(&self) -> &str {
        self.machine.id().unwrap_or_default()
    }

    pub fn has(&self, issue_type: IssueType) -> bool {
        self.issues.iter().any(|f| f.issue_type == issue_type)
    }
}

/// Engine output: one entry per machine with at least one finding,
/// sorted by machine id. A machine missing from the report has no issues.
///
/// Serializes as a plain list of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    entries: Vec<MachineIssues>,
}

impl Report {
    /// Assumes `entries` are already sorted by machine id.
    pub(crate) fn from_sorted(entries: Vec<MachineIssues>) -> Self {
        Self { entries }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&MachineIssues> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn entries(&self) -> &[MachineIssues] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MachineIssues> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of findings across all machines.
    pub fn finding_count(&self) -> usize {
        self.entries.iter().map(|e| e.issues.len()).sum()
    }

    /// Most severe finding in the report, `None` when empty.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.entries
            .iter()
            .flat_map(|e| e.issues.iter().map(|f| f.severity))
            .max()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a MachineIssues;
    type IntoIter = std::slice::Iter<'a, MachineIssues>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
