//! Cross-machine correlation.
//!
//! ASN uniqueness among firewalls and BMC address uniqueness both compare
//! a machine against every other machine in the run. Rather than rescanning
//! the inventory per machine, the driver builds a [`CorrelationIndex`] once
//! and the evaluators look peers up in it.
//!
//! Ordering guarantees:
//! - Peer ids appear in inventory order (one entry per matching binding)
//! - ASN detail lines are sorted by ASN ascending
//!
//! Machines without an id never appear as peers. A machine never lists
//! itself, nor any record sharing its id.

use std::collections::{BTreeSet, HashMap};

use crate::issues::catalog::IssueType;
use crate::issues::eval::{EvalContext, Evaluator};
use crate::machine::Machine;

#[derive(Debug, Default)]
pub struct CorrelationIndex<'m> {
    asn_owners: HashMap<i64, Vec<&'m str>>,
    bmc_owners: HashMap<&'m str, Vec<&'m str>>,
}

impl<'m> CorrelationIndex<'m> {
    pub fn build(machines: &'m [Machine]) -> Self {
        let mut index = Self::default();
        for machine in machines {
            let Some(id) = machine.id() else {
                continue;
            };
            for asn in machine.firewall_asns() {
                index.asn_owners.entry(asn).or_default().push(id);
            }
            if let Some(address) = machine.bmc_address() {
                index.bmc_owners.entry(address).or_default().push(id);
            }
        }
        index
    }

    /// Firewalls other than `self_id` with a network on `asn`.
    pub fn asn_peers(&self, asn: i64, self_id: &str) -> Vec<&'m str> {
        peers(self.asn_owners.get(&asn), self_id)
    }

    /// Machines other than `self_id` whose BMC uses `address`.
    pub fn bmc_peers(&self, address: &str, self_id: &str) -> Vec<&'m str> {
        peers(self.bmc_owners.get(address), self_id)
    }
}

fn peers<'m>(owners: Option<&Vec<&'m str>>, self_id: &str) -> Vec<&'m str> {
    owners
        .map(|ids| ids.iter().copied().filter(|id| *id != self_id).collect())
        .unwrap_or_default()
}

/// Renders peer ids the way the CLI has always shown them: `[a b c]`.
fn peer_list(ids: &[&str]) -> String {
    format!("[{}]", ids.join(" "))
}

#[derive(Debug, Default)]
pub struct AsnNotUniqueCheck {
    details: String,
}

impl Evaluator for AsnNotUniqueCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::AsnNotUnique
    }

    fn evaluate(&mut self, machine: &Machine, ctx: &EvalContext<'_>) -> bool {
        let Some(id) = machine.id() else {
            return false;
        };

        let asns: BTreeSet<i64> = machine.firewall_asns().collect();
        let overlaps: Vec<String> = asns
            .into_iter()
            .filter_map(|asn| {
                let shared = ctx.index.asn_peers(asn, id);
                (!shared.is_empty()).then(|| {
                    format!(
                        "- ASN ({asn}) not unique, shared with {}",
                        peer_list(&shared)
                    )
                })
            })
            .collect();

        if overlaps.is_empty() {
            return false;
        }
        self.details = overlaps.join("\n");
        true
    }

    fn details(&self) -> &str {
        &self.details
    }
}

#[derive(Debug, Default)]
pub struct BmcNoDistinctIpCheck {
    details: String,
}

impl Evaluator for BmcNoDistinctIpCheck {
    fn issue_type(&self) -> IssueType {
        IssueType::BmcNoDistinctIp
    }

    fn evaluate(&mut self, machine: &Machine, ctx: &EvalContext<'_>) -> bool {
        let (Some(id), Some(address)) = (machine.id(), machine.bmc_address()) else {
            return false;
        };

        let shared = ctx.index.bmc_peers(address, id);
        if shared.is_empty() {
            return false;
        }
        self.details = format!(
            "BMC IP ({address}) not unique, shared with {}",
            peer_list(&shared)
        );
        true
    }

    fn details(&self) -> &str {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::config::IssueConfig;
    use crate::issues::eval::tests::{fixed_now, good_machine};
    use crate::machine::model::{Allocation, AllocationRole, MachineNetwork};

    fn firewall(id: &str, asns: &[i64]) -> Machine {
        let mut m = good_machine(id);
        m.allocation = Some(Allocation {
            role: Some(AllocationRole::Firewall),
            networks: asns
                .iter()
                .map(|asn| MachineNetwork {
                    network_id: None,
                    asn: Some(*asn),
                })
                .collect(),
        });
        m
    }

    fn with_bmc(id: &str, address: &str) -> Machine {
        let mut m = good_machine(id);
        m.ipmi.as_mut().unwrap().address = Some(address.to_string());
        m
    }

    fn eval_all<E: Evaluator + Default>(machines: &[Machine]) -> Vec<(String, String)> {
        let config = IssueConfig::new(machines);
        let ctx = EvalContext::new(&config, fixed_now());
        machines
            .iter()
            .filter_map(|m| {
                let mut e = E::default();
                e.evaluate(m, &ctx)
                    .then(|| (m.id.clone().unwrap_or_default(), e.details().to_string()))
            })
            .collect()
    }

    #[test]
    fn shared_asns_listed_in_ascending_order() {
        let machines = vec![
            firewall("shared1", &[200, 0, 100]),
            firewall("shared2", &[1, 100, 200]),
            good_machine("0"),
        ];
        let hits = eval_all::<AsnNotUniqueCheck>(&machines);
        assert_eq!(
            hits,
            vec![
                (
                    "shared1".to_string(),
                    "- ASN (100) not unique, shared with [shared2]\n- ASN (200) not unique, shared with [shared2]"
                        .to_string()
                ),
                (
                    "shared2".to_string(),
                    "- ASN (100) not unique, shared with [shared1]\n- ASN (200) not unique, shared with [shared1]"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn asn_peers_keep_inventory_order() {
        let machines = vec![
            firewall("c", &[7]),
            firewall("a", &[7]),
            firewall("b", &[7]),
        ];
        let hits = eval_all::<AsnNotUniqueCheck>(&machines);
        assert_eq!(hits[0].1, "- ASN (7) not unique, shared with [a b]");
        assert_eq!(hits[1].1, "- ASN (7) not unique, shared with [c b]");
    }

    #[test]
    fn non_firewalls_do_not_share_asns() {
        let mut plain = firewall("worker", &[100]);
        plain.allocation.as_mut().unwrap().role = Some(AllocationRole::Machine);
        let machines = vec![firewall("fw", &[100]), plain];
        assert!(eval_all::<AsnNotUniqueCheck>(&machines).is_empty());
    }

    #[test]
    fn same_id_is_treated_as_self() {
        let machines = vec![firewall("fw", &[100]), firewall("fw", &[100])];
        assert!(eval_all::<AsnNotUniqueCheck>(&machines).is_empty());
    }

    #[test]
    fn peers_without_id_are_ignored() {
        let mut anonymous = firewall("x", &[100]);
        anonymous.id = None;
        let machines = vec![firewall("fw", &[100]), anonymous];
        assert!(eval_all::<AsnNotUniqueCheck>(&machines).is_empty());
    }

    #[test]
    fn bmc_peers_without_id_are_ignored() {
        let mut anonymous = with_bmc("x", "10.0.0.1");
        anonymous.id = None;
        let machines = vec![with_bmc("a", "10.0.0.1"), anonymous];
        assert!(eval_all::<BmcNoDistinctIpCheck>(&machines).is_empty());
    }

    #[test]
    fn duplicate_bmc_address() {
        let machines = vec![
            with_bmc("a", "10.0.0.1"),
            with_bmc("b", "10.0.0.2"),
            with_bmc("c", "10.0.0.1"),
        ];
        let hits = eval_all::<BmcNoDistinctIpCheck>(&machines);
        assert_eq!(
            hits,
            vec![
                (
                    "a".to_string(),
                    "BMC IP (10.0.0.1) not unique, shared with [c]".to_string()
                ),
                (
                    "c".to_string(),
                    "BMC IP (10.0.0.1) not unique, shared with [a]".to_string()
                ),
            ]
        );
    }

    #[test]
    fn missing_or_empty_bmc_address_never_collides() {
        let mut no_ipmi = good_machine("a");
        no_ipmi.ipmi = None;
        let machines = vec![no_ipmi, with_bmc("b", ""), with_bmc("c", "")];
        assert!(eval_all::<BmcNoDistinctIpCheck>(&machines).is_empty());
    }
}
