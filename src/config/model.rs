/*!
 * Config Model
 * Serde shapes of a simulation document
 */

use crate::core::limits::{
    DEFAULT_STARVATION_THRESHOLD, DEFAULT_TICK_LENGTH, DEFAULT_TIME_SLICE,
    DEFAULT_TOTAL_NEED_TIME,
};
use crate::core::serde::{is_empty_vec, is_none};
use crate::core::types::{Amount, Pid, SimTime};
use crate::process::{PriorityClass, ProcessState, SchedulingPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole simulation document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub simulation: SimulationSettings,
    #[serde(skip_serializing_if = "is_none")]
    pub resources: Option<ResourceConfig>,
    pub processes: Vec<ProcessConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub total_rounds: u64,
    pub tick_length: SimTime,
    pub starvation_threshold: SimTime,
    pub enable_deadlock_detection: bool,
    pub enable_safety_check: bool,
    #[serde(skip_serializing_if = "is_empty_vec")]
    pub events: Vec<SimulationEvent>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            tick_length: DEFAULT_TICK_LENGTH,
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            enable_deadlock_detection: true,
            enable_safety_check: true,
            events: Vec::new(),
        }
    }
}

/// Ordered resource types and the initially available amount of each
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub types: Vec<String>,
    #[serde(default)]
    pub available: BTreeMap<String, Amount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub id: Pid,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_none")]
    pub state: Option<ProcessState>,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default, skip_serializing_if = "is_none")]
    pub resources: Option<ProcessResourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub total_need_time: u64,
    pub time_slice: u64,
    pub priority: PriorityClass,
    pub policy: SchedulingPolicy,
    pub preemptable: bool,
    pub queue_level: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            total_need_time: DEFAULT_TOTAL_NEED_TIME,
            time_slice: DEFAULT_TIME_SLICE,
            priority: PriorityClass::default(),
            policy: SchedulingPolicy::default(),
            preemptable: true,
            queue_level: 0,
        }
    }
}

/// Per-process Banker's parameters, keyed by resource type name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResourceConfig {
    pub max_demand: BTreeMap<String, Amount>,
    #[serde(default)]
    pub allocation: BTreeMap<String, Amount>,
}

/// Scripted action applied at the start of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    pub round: u64,
    #[serde(flatten)]
    pub action: EventAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    Request {
        process_id: Pid,
        resources: BTreeMap<String, Amount>,
    },
    Release {
        process_id: Pid,
        resources: BTreeMap<String, Amount>,
    },
    AddProcess {
        process: ProcessConfig,
    },
    RemoveProcess {
        process_id: Pid,
    },
    ChangePriority {
        process_id: Pid,
        priority: PriorityClass,
    },
}
