/*!
 * State Snapshots
 * Serializable point-in-time view of the allocation authority
 */

use super::AllocationAuthority;
use crate::core::errors::SimError;
use crate::core::types::{Amount, Pid, SimTime};
use crate::process::{LedgerPhase, ProcessState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Request outcomes recorded in a process's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RequestCounts {
    pub granted: usize,
    pub denied: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub phase: LedgerPhase,
    pub max_demand: BTreeMap<String, Amount>,
    pub allocation: BTreeMap<String, Amount>,
    pub need: BTreeMap<String, Amount>,
    pub waiting_for: Vec<String>,
    pub finished: bool,
    pub in_safe_state: bool,
    pub deadlocked: bool,
    pub requests: RequestCounts,
    pub hold_time: BTreeMap<String, SimTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub time: SimTime,
    pub resource_types: Vec<String>,
    pub available: BTreeMap<String, Amount>,
    pub total: BTreeMap<String, Amount>,
    pub processes: Vec<ProcessSnapshot>,
    pub safe: bool,
    pub safe_sequence: Vec<Pid>,
    pub deadlock: bool,
}

impl StateSnapshot {
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl AllocationAuthority {
    /// Capture the current state with a fresh safety and deadlock verdict
    ///
    /// Does not touch the per-ledger flags.
    pub fn snapshot(&self) -> StateSnapshot {
        let reduction = self.reduce();
        let types = &self.types;

        let processes = self
            .processes
            .iter()
            .zip(&reduction.finished)
            .map(|(process, &reducible)| {
                let ledger = &process.ledger;
                let (granted, denied) = ledger.request_counts();
                let hold_time = types
                    .iter()
                    .map(|(id, name)| {
                        let held = ledger.hold_time().get(id.index()).copied().unwrap_or(0);
                        (name.to_string(), held)
                    })
                    .collect();
                ProcessSnapshot {
                    pid: process.pid(),
                    name: process.name.clone(),
                    state: process.state,
                    phase: ledger.phase(),
                    max_demand: types.to_map(ledger.max_demand()),
                    allocation: types.to_map(ledger.allocation()),
                    need: types.to_map(ledger.need()),
                    waiting_for: types.names_of(ledger.waiting()),
                    finished: ledger.is_finished(),
                    in_safe_state: reducible,
                    deadlocked: !reducible,
                    requests: RequestCounts { granted, denied },
                    hold_time,
                }
            })
            .collect();

        let safe = reduction.all_finished();
        StateSnapshot {
            time: self.time,
            resource_types: types.iter().map(|(_, name)| name.to_string()).collect(),
            available: types.to_map(&self.available),
            total: types.to_map(&self.total_resources()),
            processes,
            safe,
            safe_sequence: if safe { reduction.sequence } else { Vec::new() },
            deadlock: !safe,
        }
    }
}
