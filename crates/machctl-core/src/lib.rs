pub mod error;
pub mod issues;
pub mod machine;
pub mod report;
pub mod util;

pub use error::{IssueError, IssueResult};
pub use issues::{IssueConfig, IssueType, Severity, find_issues, find_issues_at};
pub use machine::Machine;
pub use report::Report;

pub const TOOL_NAME: &str = "machctl";

/// Version of the issue catalog. Bump when an issue type is added,
/// removed, or changes severity.
pub const CATALOG_VERSION: &str = "0.1.0";
