//! Per-issue evaluators.
//!
//! Every issue type has exactly one evaluator. An evaluator inspects a
//! single machine and returns a verdict; a positive verdict may leave a
//! detail string behind, read through [`Evaluator::details`]. Evaluators
//! hold that detail as state, so a fresh instance is built per machine.
//!
//! Responsibilities:
//! - Map machine facts to a verdict per issue type
//! - Produce deterministic detail strings from the captured "now"
//!
//! Non-responsibilities:
//! - Filtering by severity / only / omit (handled in `issues::config`)
//! - Ordering findings (handled in `issues::engine`)
//!
//! The two cross-machine evaluators live in `issues::correlate`.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::IssueResult;
use crate::issues::catalog::{Issue, IssueType};
use crate::issues::config::IssueConfig;
use crate::issues::correlate::{AsnNotUniqueCheck, BmcNoDistinctIpCheck, CorrelationIndex};
use crate::machine::Machine;
use crate::machine::model::{EVENT_PHONED_HOME, EVENT_WAITING, Liveliness};
use crate::util::duration::humanize_duration;

/// BMC data older than this is reported as outdated.
pub const BMC_INFO_OUTDATED_AFTER_MINUTES: i64 = 20;

/// Everything an evaluator may read besides the machine itself.
#[derive(Debug)]
pub struct EvalContext<'a> {
    pub config: &'a IssueConfig<'a>,
    /// Single point in time for all age comparisons in this run.
    pub now: DateTime<Utc>,
    pub(crate) index: CorrelationIndex<'a>,
}

impl<'a> EvalContext<'a> {
    /// Builds the context for one run, indexing `config.machines` once.
    pub fn new(config: &'a IssueConfig<'a>, now: DateTime<Utc>) -> Self {
        Self {
            config,
            now,
            index: CorrelationIndex::build(config.machines),
        }
    }
}

pub trait Evaluator {
    fn issue_type(&self) -> IssueType;

    /// Static catalog metadata of the evaluated issue.
    fn spec(&self) -> Issue {
        self.issue_type().issue()
    }

    fn evaluate(&mut self, machine: &Machine, ctx: &EvalContext<'_>) -> bool;

    /// Detail left by the last positive verdict; empty if none.
    fn details(&self) -> &str {
        ""
    }
}

/// Builds a fresh evaluator for `issue_type`.
pub fn new_evaluator_for(issue_type: IssueType) -> Box<dyn Evaluator> {
    match issue_type {
        IssueType::NoPartition => Box::new(NoPartitionCheck),
        IssueType::LivelinessDead => Box::new(LivelinessDeadCheck),
        IssueType::LivelinessUnknown => Box::new(LivelinessUnknownCheck),
        IssueType::LivelinessNotAvailable => Box::new(LivelinessNotAvailableCheck),
        IssueType::FailedMachineReclaim => Box::new(FailedMachineReclaimCheck),
        IssueType::CrashLoop => Box::new(CrashLoopCheck),
        IssueType::LastEventError => Box::<LastEventErrorCheck>::default(),
        IssueType::BmcWithoutMac => Box::new(BmcWithoutMacCheck),
        IssueType::BmcWithoutIp => Box::new(BmcWithoutIpCheck),
        IssueType::BmcInfoOutdated => Box::<BmcInfoOutdatedCheck>::default(),
        IssueType::AsnNotUnique => Box::<AsnNotUniqueCheck>::default(),
        IssueType::BmcNoDistinctIp => Box::<BmcNoDistinctIpCheck>::default(),
    }
}

/// Resolves an issue identifier to a fresh evaluator.
pub fn new_evaluator(issue_type: &str) -> IssueResult<Box<dyn Evaluator>> {
    Ok(new_evaluator_for(issue_type.parse()?))
}

#[derive(Debug, Default)]
pub struct NoPartitionCheck;

impl Evaluator for NoPartitionCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::NoPartition
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine.partition.is_none()
    }
}

#[derive(Debug, Default)]
pub struct LivelinessDeadCheck;

impl Evaluator for LivelinessDeadCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::LivelinessDead
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine.liveliness() == Some(Liveliness::Dead)
    }
}

#[derive(Debug, Default)]
pub struct LivelinessUnknownCheck;

impl Evaluator for LivelinessUnknownCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::LivelinessUnknown
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine.liveliness() == Some(Liveliness::Unknown)
    }
}

#[derive(Debug, Default)]
pub struct LivelinessNotAvailableCheck;

impl Evaluator for LivelinessNotAvailableCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::LivelinessNotAvailable
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine.liveliness().is_none()
    }
}

/// Reclaim failed, either flagged by the platform or inferred from an
/// unallocated machine whose newest event is a phone-home.
#[derive(Debug, Default)]
pub struct FailedMachineReclaimCheck;

impl Evaluator for FailedMachineReclaimCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::FailedMachineReclaim
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        let Some(events) = &machine.events else {
            return false;
        };
        if events.failed_machine_reclaim {
            return true;
        }
        machine.allocation.is_none() && events.latest_event() == Some(EVENT_PHONED_HOME)
    }
}

/// A machine waiting in the pool is not crash looping, even if the flag
/// is still set from an earlier cycle. An empty log does not suppress.
#[derive(Debug, Default)]
pub struct CrashLoopCheck;

impl Evaluator for CrashLoopCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::CrashLoop
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        let Some(events) = &machine.events else {
            return false;
        };
        events.crash_loop && events.latest_event() != Some(EVENT_WAITING)
    }
}

#[derive(Debug, Default)]
pub struct LastEventErrorCheck {
    details: String,
}

impl Evaluator for LastEventErrorCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::LastEventError
    }

    fn evaluate(&mut self, machine: &Machine, ctx: &EvalContext<'_>) -> bool {
        let threshold = ctx.config.last_error_threshold;
        if threshold <= TimeDelta::zero() {
            return false;
        }
        let Some(occurred) = machine
            .events
            .as_ref()
            .and_then(|e| e.last_error_event.as_ref())
            .and_then(|e| e.time)
        else {
            return false;
        };

        let since = ctx.now - occurred;
        if since >= threshold {
            return false;
        }
        self.details = format!("occurred {} ago", humanize_duration(since));
        true
    }

    fn details(&self) -> &str {
        &self.details
    }
}

#[derive(Debug, Default)]
pub struct BmcWithoutMacCheck;

impl Evaluator for BmcWithoutMacCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::BmcWithoutMac
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine.ipmi.as_ref().is_some_and(|ipmi| ipmi.mac().is_none())
    }
}

#[derive(Debug, Default)]
pub struct BmcWithoutIpCheck;

impl Evaluator for BmcWithoutIpCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::BmcWithoutIp
    }

    fn evaluate(&mut self, machine: &Machine, _ctx: &EvalContext<'_>) -> bool {
        machine
            .ipmi
            .as_ref()
            .is_some_and(|ipmi| ipmi.address().is_none())
    }
}

/// Missing IPMI data counts as outdated; IPMI data without an update
/// timestamp does not.
#[derive(Debug, Default)]
pub struct BmcInfoOutdatedCheck {
    details: String,
}

impl Evaluator for BmcInfoOutdatedCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::BmcInfoOutdated
    }

    fn evaluate(&mut self, machine: &Machine, ctx: &EvalContext<'_>) -> bool {
        let Some(ipmi) = &machine.ipmi else {
            self.details = "machine ipmi has never been set".to_string();
            return true;
        };
        let Some(last_updated) = ipmi.last_updated() else {
            return false;
        };

        let since = ctx.now - last_updated;
        if since <= TimeDelta::minutes(BMC_INFO_OUTDATED_AFTER_MINUTES) {
            return false;
        }
        self.details = format!("last updated {} ago", humanize_duration(since));
        true
    }

    fn details(&self) -> &str {
        &self.details
    }
}
