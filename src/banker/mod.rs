/*!
 * Allocation Authority
 * Banker's-algorithm gatekeeper over a shared pool of typed resources
 */

use crate::core::errors::AllocationError;
use crate::core::types::{Pid, SimTime};
use crate::process::ProcessDescriptor;
use crate::resources::{ResourceTypes, ResourceVector};
use std::collections::HashSet;
use tracing::{info, warn};

mod operations;
mod safety;
mod snapshot;

pub use safety::SafetyReport;
pub use snapshot::{ProcessSnapshot, RequestCounts, StateSnapshot};

/// Owns the availability vector and every live process ledger
///
/// Processes are scanned in admission order by the safety and deadlock
/// passes, so results are reproducible for a given history.
#[derive(Debug, Clone)]
pub struct AllocationAuthority {
    types: ResourceTypes,
    available: ResourceVector,
    processes: Vec<ProcessDescriptor>,
    time: SimTime,
    last_safe_sequence: Vec<Pid>,
}

impl AllocationAuthority {
    /// Empty authority with nothing available
    pub fn new(types: ResourceTypes) -> Self {
        let available = types.zeros();
        Self {
            types,
            available,
            processes: Vec::new(),
            time: 0,
            last_safe_sequence: Vec::new(),
        }
    }

    /// Reset to `available` and take ownership of `processes`
    ///
    /// On error the previous state is left untouched.
    pub fn initialize(
        &mut self,
        available: ResourceVector,
        processes: Vec<ProcessDescriptor>,
    ) -> Result<(), AllocationError> {
        self.check_dimension(&available)?;

        let mut seen = HashSet::with_capacity(processes.len());
        for process in &processes {
            if !seen.insert(process.pid()) {
                warn!(pid = process.pid(), "duplicate process in initial set");
                return Err(AllocationError::DuplicateProcess(process.pid()));
            }
            process.ledger.validate(&self.types).map_err(|e| {
                warn!(pid = process.pid(), error = %e, "invalid initial ledger");
                AllocationError::from(e)
            })?;
        }

        self.available = available;
        self.processes = processes;
        self.time = 0;
        self.last_safe_sequence.clear();
        info!(
            processes = self.processes.len(),
            available = %self.types.display(&self.available),
            "allocation authority initialized"
        );
        Ok(())
    }

    pub fn types(&self) -> &ResourceTypes {
        &self.types
    }

    pub fn available(&self) -> &ResourceVector {
        &self.available
    }

    /// Live processes in admission order
    pub fn processes(&self) -> &[ProcessDescriptor] {
        &self.processes
    }

    pub fn process(&self, pid: Pid) -> Option<&ProcessDescriptor> {
        self.processes.iter().find(|p| p.pid() == pid)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Sequence found by the most recent safety evaluation
    pub fn last_safe_sequence(&self) -> &[Pid] {
        &self.last_safe_sequence
    }

    /// Advance the logical clock, charging hold time to every held type
    pub fn advance_time(&mut self, delta: SimTime) {
        self.time = self.time.saturating_add(delta);
        for process in &mut self.processes {
            process.ledger.accrue_hold_time(delta);
        }
    }

    /// Available plus everything currently allocated
    pub fn total_resources(&self) -> ResourceVector {
        let mut total = self.available.clone();
        for process in &self.processes {
            total.saturating_add_assign(process.ledger.allocation());
        }
        total
    }

    fn index_of(&self, pid: Pid) -> Result<usize, AllocationError> {
        self.processes
            .iter()
            .position(|p| p.pid() == pid)
            .ok_or_else(|| {
                warn!(pid, "unknown process");
                AllocationError::ProcessNotFound(pid)
            })
    }

    fn check_dimension(&self, vector: &ResourceVector) -> Result<(), AllocationError> {
        if vector.len() == self.types.len() {
            Ok(())
        } else {
            warn!(
                expected = self.types.len(),
                actual = vector.len(),
                "vector dimension mismatch"
            );
            Err(AllocationError::DimensionMismatch {
                expected: self.types.len(),
                actual: vector.len(),
            })
        }
    }
}
