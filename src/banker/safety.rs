/*!
 * Safety & Deadlock Analysis
 * Work-vector reduction shared by the safety check and deadlock detection
 */

use super::AllocationAuthority;
use crate::core::types::Pid;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Verdict of a safety evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub safe: bool,
    /// Order in which processes can run to completion
    pub sequence: Vec<Pid>,
}

/// Outcome of reducing the process set against a work vector
pub(super) struct Reduction {
    /// Per process, in admission order
    pub finished: Vec<bool>,
    pub sequence: Vec<Pid>,
}

impl Reduction {
    pub fn all_finished(&self) -> bool {
        self.finished.iter().all(|&f| f)
    }
}

impl AllocationAuthority {
    /// Repeatedly let any process whose need fits in `work` finish and return
    /// its allocation, restarting the scan after every match.
    pub(super) fn reduce(&self) -> Reduction {
        let mut work = self.available.clone();
        let mut finished = vec![false; self.processes.len()];
        let mut sequence = Vec::with_capacity(self.processes.len());

        'scan: loop {
            for (index, process) in self.processes.iter().enumerate() {
                if finished[index] || !process.ledger.need().covered_by(&work) {
                    continue;
                }
                work.saturating_add_assign(process.ledger.allocation());
                finished[index] = true;
                sequence.push(process.pid());
                continue 'scan;
            }
            break;
        }

        Reduction { finished, sequence }
    }

    /// Banker's safety check; sets every ledger's in-safe-state flag
    pub fn is_safe_state(&mut self) -> bool {
        self.safety_check().safe
    }

    /// Safety check that also reports the safe sequence found
    pub fn safety_check(&mut self) -> SafetyReport {
        let reduction = self.reduce();
        for (process, &finished) in self.processes.iter_mut().zip(&reduction.finished) {
            process.ledger.in_safe_state = finished;
        }

        let safe = reduction.all_finished();
        if safe {
            debug!(sequence = ?reduction.sequence, "system is in a safe state");
        } else {
            warn!(partial = ?reduction.sequence, "system is not in a safe state");
        }
        self.last_safe_sequence = reduction.sequence.clone();

        SafetyReport {
            safe,
            sequence: reduction.sequence,
        }
    }

    /// Processes that can never finish from the current availability
    ///
    /// Sets every ledger's deadlock flag.
    pub fn detect_deadlock(&mut self) -> BTreeSet<Pid> {
        let reduction = self.reduce();
        let mut deadlocked = BTreeSet::new();
        for (process, &finished) in self.processes.iter_mut().zip(&reduction.finished) {
            process.ledger.deadlocked = !finished;
            if !finished {
                deadlocked.insert(process.pid());
            }
        }

        if deadlocked.is_empty() {
            debug!("no deadlock detected");
        } else {
            info!(processes = ?deadlocked, "deadlock detected");
        }
        deadlocked
    }
}
