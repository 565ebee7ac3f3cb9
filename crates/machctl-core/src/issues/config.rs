//! Run configuration and issue filtering.
//!
//! Responsibilities:
//! - Hold the inventory, severity floor, only/omit lists and thresholds
//!   for one engine run
//! - Decide per issue type whether it runs ([`IssueConfig::include_issue`])
//! - Parse issue type names at the string boundary
//!
//! Non-responsibilities:
//! - Evaluating machines (handled in `issues::eval`)

use chrono::TimeDelta;

use crate::error::IssueResult;
use crate::issues::catalog::{IssueType, Severity};
use crate::issues::eval::new_evaluator_for;
use crate::machine::Machine;

/// Default look-back window for `last-event-error`, in days.
pub const DEFAULT_LAST_ERROR_THRESHOLD_DAYS: i64 = 7;

/// Filters and thresholds for one engine run.
///
/// `machines` is both the set of records to evaluate and the corpus the
/// cross-machine evaluators correlate against.
#[derive(Debug, Clone)]
pub struct IssueConfig<'a> {
    pub machines: &'a [Machine],
    /// Issue types with a strictly lower severity are skipped.
    pub severity: Severity,
    /// When non-empty, only these issue types run.
    pub only: Vec<IssueType>,
    /// Always skipped; wins over `only`.
    pub omit: Vec<IssueType>,
    /// Zero disables `last-event-error`.
    pub last_error_threshold: TimeDelta,
}

impl Default for IssueConfig<'_> {
    fn default() -> Self {
        Self {
            machines: &[],
            severity: Severity::Minor,
            only: Vec::new(),
            omit: Vec::new(),
            last_error_threshold: TimeDelta::days(DEFAULT_LAST_ERROR_THRESHOLD_DAYS),
        }
    }
}

impl<'a> IssueConfig<'a> {
    pub fn new(machines: &'a [Machine]) -> Self {
        Self {
            machines,
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_only(mut self, only: impl IntoIterator<Item = IssueType>) -> Self {
        self.only = only.into_iter().collect();
        self
    }

    pub fn with_omit(mut self, omit: impl IntoIterator<Item = IssueType>) -> Self {
        self.omit = omit.into_iter().collect();
        self
    }

    pub fn with_last_error_threshold(mut self, threshold: TimeDelta) -> Self {
        self.last_error_threshold = threshold;
        self
    }

    /// Like [`IssueConfig::with_only`], parsing identifiers.
    ///
    /// Fails with `UnknownIssueType` on the first identifier outside the catalog.
    pub fn with_only_names<S: AsRef<str>>(self, names: &[S]) -> IssueResult<Self> {
        Ok(self.with_only(parse_issue_types(names)?))
    }

    /// Like [`IssueConfig::with_omit`], parsing identifiers.
    pub fn with_omit_names<S: AsRef<str>>(self, names: &[S]) -> IssueResult<Self> {
        Ok(self.with_omit(parse_issue_types(names)?))
    }

    /// Decides whether an issue type takes part in this run.
    pub fn include_issue(&self, issue_type: IssueType) -> bool {
        let evaluator = new_evaluator_for(issue_type);
        if evaluator.spec().severity.lower_than(self.severity) {
            return false;
        }
        if self.omit.contains(&issue_type) {
            return false;
        }
        if !self.only.is_empty() && !self.only.contains(&issue_type) {
            return false;
        }
        true
    }
}

fn parse_issue_types<S: AsRef<str>>(names: &[S]) -> IssueResult<Vec<IssueType>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueError;

    #[test]
    fn defaults_include_everything() {
        let config = IssueConfig::default();
        assert!(IssueType::ALL.iter().all(|t| config.include_issue(*t)));
        assert_eq!(config.last_error_threshold, TimeDelta::days(7));
    }

    #[test]
    fn severity_threshold_drops_lower_issues() {
        let config = IssueConfig::default().with_severity(Severity::Major);
        assert!(!config.include_issue(IssueType::LivelinessNotAvailable));
        assert!(!config.include_issue(IssueType::BmcNoDistinctIp));
        assert!(config.include_issue(IssueType::NoPartition));
        assert!(config.include_issue(IssueType::FailedMachineReclaim));

        let critical = IssueConfig::default().with_severity(Severity::Critical);
        let included: Vec<_> = IssueType::ALL
            .into_iter()
            .filter(|t| critical.include_issue(*t))
            .collect();
        assert_eq!(included, vec![IssueType::FailedMachineReclaim]);
    }

    #[test]
    fn only_restricts_to_listed_types() {
        let config = IssueConfig::default().with_only([IssueType::CrashLoop]);
        assert!(config.include_issue(IssueType::CrashLoop));
        assert!(!config.include_issue(IssueType::NoPartition));
    }

    #[test]
    fn omit_wins_over_only() {
        let config = IssueConfig::default()
            .with_only([IssueType::CrashLoop, IssueType::NoPartition])
            .with_omit([IssueType::CrashLoop]);
        assert!(!config.include_issue(IssueType::CrashLoop));
        assert!(config.include_issue(IssueType::NoPartition));
    }

    #[test]
    fn severity_filter_applies_before_only() {
        let config = IssueConfig::default()
            .with_severity(Severity::Major)
            .with_only([IssueType::AsnNotUnique]);
        assert!(!config.include_issue(IssueType::AsnNotUnique));
    }

    #[test]
    fn parses_names_and_rejects_unknown() {
        let config = IssueConfig::default()
            .with_only_names(&["crashloop", "no-partition"])
            .unwrap();
        assert_eq!(config.only, vec![IssueType::CrashLoop, IssueType::NoPartition]);

        let err = IssueConfig::default()
            .with_omit_names(&["crashloop", "bogus"])
            .unwrap_err();
        assert_eq!(err, IssueError::UnknownIssueType("bogus".into()));
    }
}
