/*!
 * Scheduler Simulation
 * Runs the scheduler for a fixed number of rounds, applying scripted events
 */

use super::events::EventOutcome;
use crate::config::{EventAction, SimulationConfig, SimulationEvent};
use crate::core::errors::ConfigError;
use crate::core::types::{Pid, SimTime};
use crate::scheduler::{Scheduler, SchedulerStatus};
use serde::Serialize;
use tracing::{debug, info, info_span};

/// Who held the CPU after each round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleTrace {
    pub round: u64,
    pub clock: SimTime,
    pub running: Option<Pid>,
}

pub struct SchedulerSimulation {
    scheduler: Scheduler,
    total_rounds: u64,
    tick_length: SimTime,
    events: Vec<SimulationEvent>,
    round: u64,
    trace: Vec<ScheduleTrace>,
    outcomes: Vec<EventOutcome>,
}

impl SchedulerSimulation {
    pub fn new(scheduler: Scheduler, total_rounds: u64, events: Vec<SimulationEvent>) -> Self {
        let tick_length = scheduler.config().tick_length;
        Self {
            scheduler,
            total_rounds,
            tick_length,
            events,
            round: 0,
            trace: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.build_scheduler()?,
            config.simulation.total_rounds,
            config.simulation.events.clone(),
        ))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn trace(&self) -> &[ScheduleTrace] {
        &self.trace
    }

    pub fn outcomes(&self) -> &[EventOutcome] {
        &self.outcomes
    }

    /// Apply this round's events, then tick once
    pub fn step(&mut self) -> Option<Pid> {
        self.round += 1;
        let span = info_span!("round", round = self.round);
        let _enter = span.enter();

        let due: Vec<EventAction> = self
            .events
            .iter()
            .filter(|event| event.round == self.round)
            .map(|event| event.action.clone())
            .collect();
        for action in due {
            let result = self.apply(&action);
            self.outcomes.push(EventOutcome::new(self.round, &action, result));
        }

        let running = self.scheduler.tick(self.tick_length);
        self.trace.push(ScheduleTrace {
            round: self.round,
            clock: self.scheduler.clock(),
            running,
        });
        running
    }

    /// Run every remaining round
    pub fn run(&mut self) -> SchedulerStatus {
        while self.round < self.total_rounds {
            self.step();
        }
        let status = self.scheduler.status();
        info!(
            rounds = self.round,
            clock = status.clock,
            terminated = status.terminated.len(),
            context_switches = status.stats.context_switches,
            "scheduling simulation finished"
        );
        status
    }

    fn apply(&mut self, action: &EventAction) -> Result<(), String> {
        match action {
            EventAction::AddProcess { process } => {
                let descriptor = process.descriptor().map_err(|e| e.to_string())?;
                if self.scheduler.process(process.id).is_some() {
                    return Err(format!("process {} already admitted", process.id));
                }
                self.scheduler.admit(descriptor);
                Ok(())
            }
            EventAction::RemoveProcess { process_id } => self
                .scheduler
                .remove(*process_id)
                .map(|_| ())
                .ok_or_else(|| format!("process {process_id} not found")),
            EventAction::ChangePriority {
                process_id,
                priority,
            } => {
                if self.scheduler.set_priority(*process_id, *priority) {
                    Ok(())
                } else {
                    Err(format!("process {process_id} not found"))
                }
            }
            EventAction::Request { .. } | EventAction::Release { .. } => {
                debug!(action = action.name(), "resource event ignored by scheduler");
                Err("resource events need the allocation authority".to_string())
            }
        }
    }
}
