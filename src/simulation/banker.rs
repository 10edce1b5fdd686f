/*!
 * Banker Simulation
 * Applies scripted resource events round by round with safety and deadlock checks
 */

use super::events::EventOutcome;
use crate::banker::{AllocationAuthority, StateSnapshot};
use crate::config::{EventAction, SimulationConfig, SimulationSettings};
use crate::core::errors::SimError;
use crate::core::types::{Pid, SimResult};
use crate::monitoring::OperationSpan;
use serde::Serialize;
use tracing::{info, info_span, warn};

/// Verdicts gathered at the end of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankerRound {
    pub round: u64,
    pub events: Vec<EventOutcome>,
    /// `None` when safety checking is disabled
    pub safe: Option<bool>,
    pub safe_sequence: Vec<Pid>,
    pub deadlocked: Vec<Pid>,
}

pub struct BankerSimulation {
    authority: AllocationAuthority,
    settings: SimulationSettings,
    round: u64,
    rounds: Vec<BankerRound>,
}

impl BankerSimulation {
    pub fn new(authority: AllocationAuthority, settings: SimulationSettings) -> Self {
        Self {
            authority,
            settings,
            round: 0,
            rounds: Vec::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> SimResult<Self> {
        Ok(Self::new(config.build_authority()?, config.simulation.clone()))
    }

    pub fn authority(&self) -> &AllocationAuthority {
        &self.authority
    }

    pub fn rounds(&self) -> &[BankerRound] {
        &self.rounds
    }

    /// Apply one round of events and the configured checks
    pub fn step(&mut self) -> &BankerRound {
        self.round += 1;
        let round = self.round;
        let span = info_span!("round", round);
        let _enter = span.enter();

        let due: Vec<EventAction> = self
            .settings
            .events
            .iter()
            .filter(|event| event.round == round)
            .map(|event| event.action.clone())
            .collect();
        let events = due
            .iter()
            .map(|action| {
                let span = OperationSpan::new(action.name(), action.process_id());
                let result = span.finish(self.apply(action));
                EventOutcome::new(round, action, result)
            })
            .collect();

        self.authority.advance_time(self.settings.tick_length);

        let (safe, safe_sequence) = if self.settings.enable_safety_check {
            let report = self.authority.safety_check();
            (Some(report.safe), report.sequence)
        } else {
            (None, Vec::new())
        };
        let deadlocked = if self.settings.enable_deadlock_detection {
            self.authority.detect_deadlock().into_iter().collect()
        } else {
            Vec::new()
        };

        self.rounds.push(BankerRound {
            round,
            events,
            safe,
            safe_sequence,
            deadlocked,
        });
        &self.rounds[self.rounds.len() - 1]
    }

    /// Run every remaining round and return the final state
    pub fn run(&mut self) -> StateSnapshot {
        while self.round < self.settings.total_rounds {
            self.step();
        }
        let snapshot = self.authority.snapshot();
        if snapshot.safe {
            info!(
                rounds = self.round,
                sequence = ?snapshot.safe_sequence,
                "banker simulation finished safe"
            );
        } else {
            warn!(rounds = self.round, "banker simulation finished unsafe");
        }
        snapshot
    }

    fn apply(&mut self, action: &EventAction) -> Result<(), SimError> {
        let types = self.authority.types().clone();
        match action {
            EventAction::Request {
                process_id,
                resources,
            } => {
                let request = types.vector_from_map(resources, "request")?;
                self.authority.request_resources(*process_id, &request)?;
            }
            EventAction::Release {
                process_id,
                resources,
            } => {
                let release = types.vector_from_map(resources, "release")?;
                self.authority.release_resources(*process_id, &release)?;
            }
            EventAction::AddProcess { process } => {
                let descriptor = process.descriptor_with_ledger(&types)?;
                self.authority.add_process(descriptor)?;
            }
            EventAction::RemoveProcess { process_id } => {
                self.authority.remove_process(*process_id)?;
            }
            EventAction::ChangePriority { process_id, .. } => {
                info!(pid = process_id, "priority change has no effect on allocation");
            }
        }
        Ok(())
    }
}
