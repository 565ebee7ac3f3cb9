//! Error types for the issue engine.
//!
//! The engine degrades silently on missing machine data. The only hard
//! errors are identifiers that fall outside the closed issue and severity
//! sets, and those can only enter through string parsing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// An issue identifier outside the catalog.
    #[error("unknown issue type: {0}")]
    UnknownIssueType(String),

    /// A severity string other than `minor`, `major` or `critical`.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

pub type IssueResult<T> = std::result::Result<T, IssueError>;
