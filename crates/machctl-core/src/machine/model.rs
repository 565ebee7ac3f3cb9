use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name written by a machine that booted into the provisioning image
/// and reported back to the platform.
pub const EVENT_PHONED_HOME: &str = "Phoned Home";

/// Event name of a machine idling in the waiting pool.
pub const EVENT_WAITING: &str = "Waiting";

/// Snapshot of one machine as delivered by the inventory API.
///
/// Every nested structure is optional. Evaluators check presence before
/// reading, so a sparse record is never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionRef>,
    /// Raw liveliness as reported; see [`Machine::liveliness`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveliness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipmi: Option<Ipmi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<ProvisioningEvents>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRef {
    pub id: String,
}

/// Recognized liveliness values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveliness {
    Alive,
    Dead,
    Unknown,
}

impl Liveliness {
    /// Parses the exact API spelling. Anything else is "not available".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Alive" => Some(Self::Alive),
            "Dead" => Some(Self::Dead),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationRole {
    Machine,
    Firewall,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AllocationRole>,
    #[serde(default)]
    pub networks: Vec<MachineNetwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<i64>,
}

/// Out-of-band management facts collected from the BMC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ipmi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Ipmi {
    /// BMC address, treating the empty string as absent.
    pub fn address(&self) -> Option<&str> {
        non_empty(self.address.as_deref())
    }

    pub fn mac(&self) -> Option<&str> {
        non_empty(self.mac.as_deref())
    }

    /// Time of the last BMC report, `None` when never set.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated.filter(|t| !is_zero_time(t))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningEvents {
    #[serde(default)]
    pub failed_machine_reclaim: bool,
    #[serde(default)]
    pub crash_loop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_time: Option<DateTime<Utc>>,
    /// Most recent event first.
    #[serde(default)]
    pub log: Vec<ProvisioningEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_event: Option<ProvisioningEvent>,
}

impl ProvisioningEvents {
    /// Name of the newest event in the log, if any.
    pub fn latest_event(&self) -> Option<&str> {
        self.log.first().and_then(|e| e.event.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Machine {
    /// Machine id, treating the empty string as absent.
    pub fn id(&self) -> Option<&str> {
        non_empty(self.id.as_deref())
    }

    pub fn liveliness(&self) -> Option<Liveliness> {
        self.liveliness.as_deref().and_then(Liveliness::parse)
    }

    pub fn is_firewall(&self) -> bool {
        matches!(
            self.allocation.as_ref().and_then(|a| a.role),
            Some(AllocationRole::Firewall)
        )
    }

    /// ASNs bound to this machine's networks, in network order.
    ///
    /// Yields nothing for machines that are not firewalls.
    pub fn firewall_asns(&self) -> impl Iterator<Item = i64> + '_ {
        self.allocation
            .as_ref()
            .filter(|_| self.is_firewall())
            .into_iter()
            .flat_map(|a| a.networks.iter().filter_map(|n| n.asn))
    }

    /// BMC address if the machine has IPMI data with a non-empty address.
    pub fn bmc_address(&self) -> Option<&str> {
        self.ipmi.as_ref().and_then(Ipmi::address)
    }
}

/// Whether a timestamp is a placeholder for "never set".
///
/// The API serializes an unset time as `0001-01-01T00:00:00Z`; some
/// producers emit the Unix epoch instead. Both count as unset, and so does
/// every other timestamp at or before the epoch: no real machine event
/// predates 1970.
pub fn is_zero_time(t: &DateTime<Utc>) -> bool {
    t.timestamp() <= 0
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
