pub mod catalog;
pub mod config;
pub mod correlate;
pub mod engine;
pub mod eval;

pub use catalog::{Issue, IssueType, Severity, all_issue_types, all_issues};
pub use config::IssueConfig;
pub use engine::{find_issues, find_issues_at};
