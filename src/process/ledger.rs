/*!
 * Resource Ledger
 * Per-process Banker's bookkeeping: max demand, allocation, need and history
 */

use crate::core::errors::LedgerError;
use crate::core::serde::is_empty_vec;
use crate::core::types::SimTime;
use crate::resources::{ResourceId, ResourceTypes, ResourceVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a history record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    Request,
    Release,
}

/// How a recorded call ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum LedgerOutcome {
    Granted,
    Released,
    Denied(String),
}

/// One entry of the request history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub time: SimTime,
    pub action: LedgerAction,
    pub amounts: ResourceVector,
    #[serde(flatten)]
    pub outcome: LedgerOutcome,
}

/// Coarse position in the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerPhase {
    /// Nothing held, nothing pending
    Unconstrained,
    /// A request is pending or was rejected
    Waiting,
    /// Holding resources with need outstanding
    Granted,
    /// Need fully satisfied
    Finished,
}

/// Banker's-algorithm view of one process
///
/// Invariant: for every resource type `allocation + need == max_demand`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResourceLedger {
    max_demand: ResourceVector,
    allocation: ResourceVector,
    need: ResourceVector,
    waiting: BTreeSet<ResourceId>,
    /// Time spent holding a non-zero allocation, per resource type
    hold_time: Vec<SimTime>,
    pub deadlocked: bool,
    pub in_safe_state: bool,
    #[serde(skip_serializing_if = "is_empty_vec")]
    history: Vec<LedgerRecord>,
}

impl ResourceLedger {
    /// Build a ledger; need is derived as `max_demand - allocation`
    pub fn new(
        types: &ResourceTypes,
        max_demand: ResourceVector,
        allocation: ResourceVector,
    ) -> Result<Self, LedgerError> {
        for vector in [&max_demand, &allocation] {
            if vector.len() != types.len() {
                return Err(LedgerError::DimensionMismatch {
                    expected: types.len(),
                    actual: vector.len(),
                });
            }
        }

        let need = max_demand.checked_sub(&allocation).ok_or_else(|| {
            let id = types
                .ids()
                .find(|&id| allocation.get(id) > max_demand.get(id));
            inconsistency(types, id, &allocation, &types.zeros(), &max_demand)
        })?;

        let hold_time = vec![0; types.len()];
        Ok(Self {
            hold_time,
            max_demand,
            allocation,
            need,
            waiting: BTreeSet::new(),
            deadlocked: false,
            in_safe_state: true,
            history: Vec::new(),
        })
    }

    pub fn max_demand(&self) -> &ResourceVector {
        &self.max_demand
    }

    pub fn allocation(&self) -> &ResourceVector {
        &self.allocation
    }

    pub fn need(&self) -> &ResourceVector {
        &self.need
    }

    pub fn waiting(&self) -> &BTreeSet<ResourceId> {
        &self.waiting
    }

    pub fn history(&self) -> &[LedgerRecord] {
        &self.history
    }

    pub fn hold_time(&self) -> &[SimTime] {
        &self.hold_time
    }

    /// Requests recorded so far as `(granted, denied)`
    pub fn request_counts(&self) -> (usize, usize) {
        self.history
            .iter()
            .filter(|r| r.action == LedgerAction::Request)
            .fold((0, 0), |(granted, denied), r| match r.outcome {
                LedgerOutcome::Denied(_) => (granted, denied + 1),
                _ => (granted + 1, denied),
            })
    }

    /// Charge `delta` to every type currently held
    pub fn accrue_hold_time(&mut self, delta: SimTime) {
        if self.hold_time.len() != self.allocation.len() {
            self.hold_time.resize(self.allocation.len(), 0);
        }
        for id in self.allocation.nonzero_ids() {
            let held = &mut self.hold_time[id.index()];
            *held = held.saturating_add(delta);
        }
    }

    pub fn dimension(&self) -> usize {
        self.max_demand.len()
    }

    /// Check the ledger invariant for every resource type
    pub fn validate(&self, types: &ResourceTypes) -> Result<(), LedgerError> {
        for vector in [&self.max_demand, &self.allocation, &self.need] {
            if vector.len() != types.len() {
                return Err(LedgerError::DimensionMismatch {
                    expected: types.len(),
                    actual: vector.len(),
                });
            }
        }

        for id in types.ids() {
            let allocation = self.allocation.get(id);
            let need = self.need.get(id);
            let max_demand = self.max_demand.get(id);
            let consistent = allocation <= max_demand
                && allocation.checked_add(need) == Some(max_demand);
            if !consistent {
                return Err(LedgerError::Inconsistent {
                    resource: types.name(id).to_string(),
                    allocation,
                    need,
                    max_demand,
                });
            }
        }
        Ok(())
    }

    /// Move `amounts` from need to allocation
    ///
    /// Fails without mutating if any amount exceeds the outstanding need.
    pub fn grant(
        &mut self,
        types: &ResourceTypes,
        amounts: &ResourceVector,
    ) -> Result<(), LedgerError> {
        let allocation = self.allocation.checked_add(amounts);
        let need = self.need.checked_sub(amounts);
        match (allocation, need) {
            (Some(allocation), Some(need)) => {
                self.allocation = allocation;
                self.need = need;
                for id in amounts.nonzero_ids() {
                    self.waiting.remove(&id);
                }
                Ok(())
            }
            _ => Err(self.first_violation(types, amounts, &self.need)),
        }
    }

    /// Return `amounts` from allocation; need is recomputed from max demand
    pub fn release(
        &mut self,
        types: &ResourceTypes,
        amounts: &ResourceVector,
    ) -> Result<(), LedgerError> {
        let allocation = self
            .allocation
            .checked_sub(amounts)
            .ok_or_else(|| self.first_violation(types, amounts, &self.allocation))?;
        let need = self
            .max_demand
            .checked_sub(&allocation)
            .ok_or_else(|| self.first_violation(types, amounts, &self.allocation))?;
        self.allocation = allocation;
        self.need = need;
        Ok(())
    }

    /// Restore amounts captured before a provisional commit
    pub(crate) fn restore(&mut self, allocation: ResourceVector, need: ResourceVector) {
        self.allocation = allocation;
        self.need = need;
    }

    pub fn mark_waiting(&mut self, ids: impl IntoIterator<Item = ResourceId>) {
        self.waiting.extend(ids);
    }

    pub fn clear_waiting(&mut self) {
        self.waiting.clear();
    }

    pub fn record(&mut self, record: LedgerRecord) {
        self.history.push(record);
    }

    /// Need fully satisfied
    pub fn is_finished(&self) -> bool {
        self.need.is_zero()
    }

    pub fn phase(&self) -> LedgerPhase {
        if !self.waiting.is_empty() {
            LedgerPhase::Waiting
        } else if self.is_finished() {
            LedgerPhase::Finished
        } else if self.allocation.is_zero() {
            LedgerPhase::Unconstrained
        } else {
            LedgerPhase::Granted
        }
    }

    fn first_violation(
        &self,
        types: &ResourceTypes,
        amounts: &ResourceVector,
        bound: &ResourceVector,
    ) -> LedgerError {
        if amounts.len() != types.len() {
            return LedgerError::DimensionMismatch {
                expected: types.len(),
                actual: amounts.len(),
            };
        }
        let id = types.ids().find(|&id| amounts.get(id) > bound.get(id));
        inconsistency(types, id, &self.allocation, &self.need, &self.max_demand)
    }
}

fn inconsistency(
    types: &ResourceTypes,
    id: Option<ResourceId>,
    allocation: &ResourceVector,
    need: &ResourceVector,
    max_demand: &ResourceVector,
) -> LedgerError {
    match id {
        Some(id) => LedgerError::Inconsistent {
            resource: types.name(id).to_string(),
            allocation: allocation.get(id),
            need: need.get(id),
            max_demand: max_demand.get(id),
        },
        None => LedgerError::DimensionMismatch {
            expected: types.len(),
            actual: allocation.len(),
        },
    }
}
