//! Closed catalog of machine issue types.
//!
//! The declaration order of [`IssueType`] is the canonical catalog order.
//! Findings for a single machine are always listed in this order, so new
//! variants must be appended deliberately and [`IssueType::ALL`] kept in sync.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IssueError;

const REF_URL_BASE: &str = "https://docs.metal-stack.io/stable/installation/troubleshoot/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    NoPartition,
    LivelinessDead,
    LivelinessUnknown,
    LivelinessNotAvailable,
    FailedMachineReclaim,
    #[serde(rename = "crashloop")]
    CrashLoop,
    LastEventError,
    BmcWithoutMac,
    BmcWithoutIp,
    BmcInfoOutdated,
    AsnNotUnique,
    BmcNoDistinctIp,
}

impl IssueType {
    /// Every issue type in canonical order.
    pub const ALL: [IssueType; 12] = [
        IssueType::NoPartition,
        IssueType::LivelinessDead,
        IssueType::LivelinessUnknown,
        IssueType::LivelinessNotAvailable,
        IssueType::FailedMachineReclaim,
        IssueType::CrashLoop,
        IssueType::LastEventError,
        IssueType::BmcWithoutMac,
        IssueType::BmcWithoutIp,
        IssueType::BmcInfoOutdated,
        IssueType::AsnNotUnique,
        IssueType::BmcNoDistinctIp,
    ];

    /// Stable external identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::NoPartition => "no-partition",
            IssueType::LivelinessDead => "liveliness-dead",
            IssueType::LivelinessUnknown => "liveliness-unknown",
            IssueType::LivelinessNotAvailable => "liveliness-not-available",
            IssueType::FailedMachineReclaim => "failed-machine-reclaim",
            IssueType::CrashLoop => "crashloop",
            IssueType::LastEventError => "last-event-error",
            IssueType::BmcWithoutMac => "bmc-without-mac",
            IssueType::BmcWithoutIp => "bmc-without-ip",
            IssueType::BmcInfoOutdated => "bmc-info-outdated",
            IssueType::AsnNotUnique => "asn-not-unique",
            IssueType::BmcNoDistinctIp => "bmc-no-distinct-ip",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueType::FailedMachineReclaim => Severity::Critical,
            IssueType::NoPartition
            | IssueType::LivelinessDead
            | IssueType::LivelinessUnknown
            | IssueType::CrashLoop
            | IssueType::BmcWithoutMac
            | IssueType::BmcWithoutIp
            | IssueType::BmcInfoOutdated => Severity::Major,
            // bmc-no-distinct-ip carries no severity of its own and ranks lowest.
            IssueType::LivelinessNotAvailable
            | IssueType::LastEventError
            | IssueType::AsnNotUnique
            | IssueType::BmcNoDistinctIp => Severity::Minor,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IssueType::NoPartition => "machine with no partition",
            IssueType::LivelinessDead => "the machine is not sending events anymore",
            IssueType::LivelinessUnknown => {
                "the machine is not sending LLDP alive messages anymore"
            }
            IssueType::LivelinessNotAvailable => "the machine liveliness is not available",
            IssueType::FailedMachineReclaim => "machine phones home but not allocated",
            IssueType::CrashLoop => "machine is in a provisioning crash loop",
            IssueType::LastEventError => {
                "the machine had an error during the provisioning lifecycle"
            }
            IssueType::BmcWithoutMac => "BMC has no mac address",
            IssueType::BmcWithoutIp => "BMC has no ip address",
            IssueType::BmcInfoOutdated => {
                "BMC has not been updated from either metal-bmc or metal-core"
            }
            IssueType::AsnNotUnique => "The ASN is not unique (only impact on firewalls)",
            IssueType::BmcNoDistinctIp => "BMC IP address is not distinct",
        }
    }

    /// Documentation anchor for this issue.
    pub fn ref_url(&self) -> String {
        format!("{REF_URL_BASE}#{}", self.as_str())
    }

    /// Static catalog entry for this type.
    pub fn issue(&self) -> Issue {
        Issue {
            issue_type: *self,
            severity: self.severity(),
            description: self.description().to_string(),
            ref_url: Some(self.ref_url()),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = IssueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| IssueError::UnknownIssueType(s.to_string()))
    }
}

/// Issue severity.
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// the weights: minor < major < critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Minor => 0,
            Severity::Major => 5,
            Severity::Critical => 10,
        }
    }

    /// Strictly lower than `other`.
    pub fn lower_than(&self, other: Severity) -> bool {
        self.weight() < other.weight()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = IssueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minor" => Ok(Severity::Minor),
            "major" => Ok(Severity::Major),
            "critical" => Ok(Severity::Critical),
            other => Err(IssueError::UnknownSeverity(other.to_string())),
        }
    }
}

/// Catalog entry: the static metadata of one issue type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "id")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_url: Option<String>,
}

/// All issue types in canonical order.
pub fn all_issue_types() -> Vec<IssueType> {
    IssueType::ALL.to_vec()
}

/// Catalog entries for every issue type, in canonical order.
pub fn all_issues() -> Vec<Issue> {
    IssueType::ALL.iter().map(IssueType::issue).collect()
}

/// Visits every issue type once, in canonical order.
pub fn for_each_issue_type(mut f: impl FnMut(IssueType)) {
    for t in IssueType::ALL {
        f(t);
    }
}
