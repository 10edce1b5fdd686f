/*!
 * Process Descriptor
 * Identity, lifecycle state, scheduling info and resource ledger of one process
 */

use super::context::RegisterContext;
use super::ledger::ResourceLedger;
use super::scheduling::SchedulingInfo;
use super::types::{PriorityClass, ProcessState, SchedulingPolicy};
use crate::core::limits::{DEFAULT_TIME_SLICE, DEFAULT_TOTAL_NEED_TIME};
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling parameters used to build a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingParams {
    pub total_need_time: u64,
    pub time_slice: u64,
    pub priority: PriorityClass,
    pub policy: SchedulingPolicy,
    pub preemptable: bool,
    pub queue_level: usize,
}

impl Default for SchedulingParams {
    fn default() -> Self {
        Self {
            total_need_time: DEFAULT_TOTAL_NEED_TIME,
            time_slice: DEFAULT_TIME_SLICE,
            priority: PriorityClass::Normal,
            policy: SchedulingPolicy::RoundRobin,
            preemptable: true,
            queue_level: 0,
        }
    }
}

/// Process control block
///
/// The pid never changes after construction. Ownership moves into whichever
/// engine is driving the process, which is then its only mutator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessDescriptor {
    pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub policy: SchedulingPolicy,
    pub scheduling: SchedulingInfo,
    pub ledger: ResourceLedger,
    pub registers: RegisterContext,
}

impl ProcessDescriptor {
    pub fn new(pid: Pid, name: impl Into<String>, params: SchedulingParams) -> Self {
        let mut scheduling = SchedulingInfo::new(
            params.priority,
            params.total_need_time,
            params.time_slice,
            params.preemptable,
        );
        scheduling.queue_level = params.queue_level;
        scheduling.refresh_dynamic_priority();

        Self {
            pid,
            name: name.into(),
            state: ProcessState::New,
            policy: params.policy,
            scheduling,
            ledger: ResourceLedger::default(),
            registers: RegisterContext::default(),
        }
    }

    /// Attach a resource ledger
    pub fn with_ledger(mut self, ledger: ResourceLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Override the initial lifecycle state
    pub fn with_state(mut self, state: ProcessState) -> Self {
        self.state = state;
        self
    }

    #[inline(always)]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Flag for requeue at the next context switch
    pub fn mark_for_reschedule(&mut self) {
        self.scheduling.needs_reschedule = true;
    }

    pub fn set_priority(&mut self, priority: PriorityClass) {
        self.scheduling.static_priority = priority;
        self.scheduling.refresh_dynamic_priority();
    }
}

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pid {}, {}, {})",
            self.name, self.pid, self.state, self.policy
        )
    }
}
