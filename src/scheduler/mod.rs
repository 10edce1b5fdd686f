/*!
 * CPU Scheduler
 * Multi-level ready queues with per-policy selection and preemption
 */

use crate::core::limits::{DEFAULT_STARVATION_THRESHOLD, DEFAULT_TICK_LENGTH, QUEUE_LEVELS};
use crate::core::types::{Pid, SimTime};
use crate::process::{ProcessDescriptor, RegisterContext};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

mod operations;
pub mod policy;
mod stats;

pub use policy::{strategy_for, SelectionStrategy};
pub use stats::{QueueStatus, QueuedProcess, RunningProcess, SchedulerStats, SchedulerStatus};

/// Where a live process currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "location", content = "level", rename_all = "snake_case")]
pub enum QueueLocation {
    Current,
    Ready(usize),
    /// Off every queue until woken
    Parked,
}

/// Scheduler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Residency after which a process in a lower queue is promoted
    pub starvation_threshold: SimTime,
    /// Budget used by `tick_default`
    pub tick_length: SimTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            tick_length: DEFAULT_TICK_LENGTH,
        }
    }
}

/// Single-CPU scheduler over `QUEUE_LEVELS` ready queues
///
/// Owns every live descriptor. Level 0 is served first; within a level the
/// head process's policy decides which pid runs next.
pub struct Scheduler {
    config: SchedulerConfig,
    queues: [VecDeque<Pid>; QUEUE_LEVELS],
    processes: HashMap<Pid, ProcessDescriptor>,
    current: Option<Pid>,
    last: Option<Pid>,
    /// Register file of the process on the CPU
    registers: Option<RegisterContext>,
    clock: SimTime,
    terminated: Vec<ProcessDescriptor>,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            queues: Default::default(),
            processes: HashMap::new(),
            current: None,
            last: None,
            registers: None,
            clock: 0,
            terminated: Vec::new(),
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    /// Process that most recently left the CPU
    pub fn last(&self) -> Option<Pid> {
        self.last
    }

    pub fn process(&self, pid: Pid) -> Option<&ProcessDescriptor> {
        self.processes.get(&pid)
    }

    /// Live processes (ready, running or parked), unordered
    pub fn processes(&self) -> impl Iterator<Item = &ProcessDescriptor> {
        self.processes.values()
    }

    /// Ready queue at `level`, head first
    pub fn queue(&self, level: usize) -> Option<&VecDeque<Pid>> {
        self.queues.get(level)
    }

    pub fn ready_count(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Processes that ran to completion, in completion order
    pub fn terminated(&self) -> &[ProcessDescriptor] {
        &self.terminated
    }

    /// True when no live process remains
    pub fn is_drained(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn location(&self, pid: Pid) -> Option<QueueLocation> {
        if !self.processes.contains_key(&pid) {
            return None;
        }
        if self.current == Some(pid) {
            return Some(QueueLocation::Current);
        }
        Some(
            self.queues
                .iter()
                .position(|queue| queue.contains(&pid))
                .map_or(QueueLocation::Parked, QueueLocation::Ready),
        )
    }

    /// Tick with the configured tick length
    pub fn tick_default(&mut self) -> Option<Pid> {
        self.tick(self.config.tick_length)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
