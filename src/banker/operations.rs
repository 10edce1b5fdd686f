/*!
 * Allocation Operations
 * Validate-then-commit request, release, admission and removal
 */

use super::AllocationAuthority;
use crate::core::errors::AllocationError;
use crate::core::types::Pid;
use crate::process::{LedgerAction, LedgerOutcome, LedgerRecord, ProcessDescriptor};
use crate::resources::ResourceVector;
use tracing::{error, info, warn};

/// State captured before a provisional commit
struct Checkpoint {
    available: ResourceVector,
    allocation: ResourceVector,
    need: ResourceVector,
}

impl AllocationAuthority {
    /// Grant `request` to `pid` if it keeps the system safe
    ///
    /// Any rejection leaves availability and the ledger amounts unchanged.
    pub fn request_resources(
        &mut self,
        pid: Pid,
        request: &ResourceVector,
    ) -> Result<(), AllocationError> {
        self.check_dimension(request)?;
        let index = self.index_of(pid)?;

        if let Err(err) = self.validate_request(index, request) {
            warn!(pid, request = %self.types.display(request), error = %err, "request rejected");
            return Err(err);
        }

        if let Some(id) = self
            .types
            .ids()
            .find(|&id| request.get(id) > self.available.get(id))
        {
            let err = AllocationError::ExceedsAvailable {
                resource: self.types.name(id).to_string(),
                requested: request.get(id),
                available: self.available.get(id),
            };
            // The whole request waits, not just the short types
            let ledger = &mut self.processes[index].ledger;
            ledger.mark_waiting(request.nonzero_ids());
            ledger.record(LedgerRecord {
                time: self.time,
                action: LedgerAction::Request,
                amounts: request.clone(),
                outcome: LedgerOutcome::Denied(err.to_string()),
            });
            warn!(pid, error = %err, "request must wait");
            return Err(err);
        }

        let checkpoint = self.checkpoint(index);
        if let Err(err) = self.commit_request(index, request) {
            self.restore(index, checkpoint);
            error!(pid, error = %err, "ledger inconsistent after grant, rolled back");
            return Err(err);
        }

        if !self.is_safe_state() {
            self.rollback(index, checkpoint, request);
            let err = AllocationError::Unsafe;
            self.processes[index].ledger.record(LedgerRecord {
                time: self.time,
                action: LedgerAction::Request,
                amounts: request.clone(),
                outcome: LedgerOutcome::Denied(err.to_string()),
            });
            self.is_safe_state();
            warn!(pid, request = %self.types.display(request), "request denied, unsafe");
            return Err(err);
        }

        self.processes[index].ledger.record(LedgerRecord {
            time: self.time,
            action: LedgerAction::Request,
            amounts: request.clone(),
            outcome: LedgerOutcome::Granted,
        });
        info!(
            pid,
            request = %self.types.display(request),
            available = %self.types.display(&self.available),
            "request granted"
        );
        Ok(())
    }

    /// Return `release` from `pid`'s allocation to the pool
    pub fn release_resources(
        &mut self,
        pid: Pid,
        release: &ResourceVector,
    ) -> Result<(), AllocationError> {
        self.check_dimension(release)?;
        let index = self.index_of(pid)?;

        let allocation = self.processes[index].ledger.allocation();
        if let Some(id) = self
            .types
            .ids()
            .find(|&id| release.get(id) > allocation.get(id))
        {
            let err = AllocationError::ExceedsAllocation {
                resource: self.types.name(id).to_string(),
                released: release.get(id),
                allocated: allocation.get(id),
            };
            warn!(pid, error = %err, "release rejected");
            return Err(err);
        }

        let checkpoint = self.checkpoint(index);
        if let Err(err) = self.commit_release(index, release) {
            self.restore(index, checkpoint);
            error!(pid, error = %err, "ledger inconsistent after release, rolled back");
            return Err(err);
        }

        self.processes[index].ledger.record(LedgerRecord {
            time: self.time,
            action: LedgerAction::Release,
            amounts: release.clone(),
            outcome: LedgerOutcome::Released,
        });
        info!(
            pid,
            release = %self.types.display(release),
            available = %self.types.display(&self.available),
            "resources released"
        );
        self.is_safe_state();
        Ok(())
    }

    /// Admit a process whose ledger fits the system
    ///
    /// Its initial allocation is debited from availability. Admissions that
    /// would make the system unsafe are rolled back.
    pub fn add_process(&mut self, process: ProcessDescriptor) -> Result<(), AllocationError> {
        let pid = process.pid();
        if let Err(err) = self.validate_admission(&process) {
            warn!(pid, error = %err, "admission rejected");
            return Err(err);
        }

        let previous = self.available.clone();
        let Some(available) = self.available.checked_sub(process.ledger.allocation()) else {
            return Err(AllocationError::DimensionMismatch {
                expected: self.types.len(),
                actual: process.ledger.dimension(),
            });
        };
        self.available = available;
        self.processes.push(process);

        if !self.is_safe_state() {
            self.processes.pop();
            self.available = previous;
            self.is_safe_state();
            warn!(pid, "admission would leave the system unsafe, rolled back");
            return Err(AllocationError::Unsafe);
        }

        info!(
            pid,
            available = %self.types.display(&self.available),
            "process admitted"
        );
        Ok(())
    }

    /// Reclaim everything `pid` holds and drop it from the live set
    pub fn remove_process(&mut self, pid: Pid) -> Result<ProcessDescriptor, AllocationError> {
        let index = self.index_of(pid)?;
        let mut process = self.processes.remove(index);

        let held = process.ledger.allocation().clone();
        if let Err(err) = process.ledger.release(&self.types, &held) {
            let err = AllocationError::from(err);
            error!(pid, error = %err, "ledger inconsistent on removal");
            self.processes.insert(index, process);
            return Err(err);
        }
        self.available.saturating_add_assign(&held);

        info!(
            pid,
            reclaimed = %self.types.display(&held),
            available = %self.types.display(&self.available),
            "process removed"
        );
        self.is_safe_state();
        Ok(process)
    }

    /// Need, then max demand; availability is checked separately
    fn validate_request(
        &self,
        index: usize,
        request: &ResourceVector,
    ) -> Result<(), AllocationError> {
        let ledger = &self.processes[index].ledger;
        for id in self.types.ids() {
            let requested = request.get(id);
            if requested > ledger.need().get(id) {
                return Err(AllocationError::ExceedsNeed {
                    resource: self.types.name(id).to_string(),
                    requested,
                    need: ledger.need().get(id),
                });
            }
            let allocation = ledger.allocation().get(id);
            let max_demand = ledger.max_demand().get(id);
            if u64::from(allocation) + u64::from(requested) > u64::from(max_demand) {
                return Err(AllocationError::ExceedsMaxDemand {
                    resource: self.types.name(id).to_string(),
                    allocation,
                    requested,
                    max_demand,
                });
            }
        }
        Ok(())
    }

    fn validate_admission(&self, process: &ProcessDescriptor) -> Result<(), AllocationError> {
        let pid = process.pid();
        if self.processes.iter().any(|p| p.pid() == pid) {
            return Err(AllocationError::DuplicateProcess(pid));
        }
        process.ledger.validate(&self.types)?;

        let total = self.total_resources();
        let ledger = &process.ledger;
        for id in self.types.ids() {
            if ledger.max_demand().get(id) > total.get(id) {
                return Err(AllocationError::ExceedsSystemTotal {
                    resource: self.types.name(id).to_string(),
                    demand: ledger.max_demand().get(id),
                    total: total.get(id),
                });
            }
            if ledger.allocation().get(id) > self.available.get(id) {
                return Err(AllocationError::ExceedsAvailable {
                    resource: self.types.name(id).to_string(),
                    requested: ledger.allocation().get(id),
                    available: self.available.get(id),
                });
            }
        }
        Ok(())
    }

    /// Debit availability and credit the ledger, validating around the commit
    fn commit_request(
        &mut self,
        index: usize,
        request: &ResourceVector,
    ) -> Result<(), AllocationError> {
        let types = self.types.clone();
        let ledger = &mut self.processes[index].ledger;
        ledger.validate(&types)?;

        let available = self
            .available
            .checked_sub(request)
            .ok_or(AllocationError::DimensionMismatch {
                expected: types.len(),
                actual: request.len(),
            })?;
        ledger.grant(&types, request)?;
        ledger.clear_waiting();
        self.available = available;
        ledger.validate(&types)?;
        Ok(())
    }

    fn commit_release(
        &mut self,
        index: usize,
        release: &ResourceVector,
    ) -> Result<(), AllocationError> {
        let types = self.types.clone();
        let ledger = &mut self.processes[index].ledger;
        ledger.validate(&types)?;
        ledger.release(&types, release)?;
        ledger.validate(&types)?;
        self.available.saturating_add_assign(release);
        Ok(())
    }

    fn checkpoint(&self, index: usize) -> Checkpoint {
        let ledger = &self.processes[index].ledger;
        Checkpoint {
            available: self.available.clone(),
            allocation: ledger.allocation().clone(),
            need: ledger.need().clone(),
        }
    }

    fn restore(&mut self, index: usize, checkpoint: Checkpoint) {
        self.available = checkpoint.available;
        self.processes[index]
            .ledger
            .restore(checkpoint.allocation, checkpoint.need);
    }

    /// Undo a provisional grant and leave the process waiting on it
    fn rollback(&mut self, index: usize, checkpoint: Checkpoint, request: &ResourceVector) {
        self.restore(index, checkpoint);
        self.processes[index]
            .ledger
            .mark_waiting(request.nonzero_ids());
    }
}
