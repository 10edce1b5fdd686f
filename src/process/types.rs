/*!
 * Process Types
 * Lifecycle states, priority classes and scheduling policies
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created but not yet admitted
    #[serde(alias = "NEW")]
    New,
    /// Sitting in a ready queue
    #[serde(alias = "READY", alias = "ACTIVE_READY", alias = "STATIC_READY")]
    Ready,
    /// Occupying the CPU
    #[serde(alias = "RUNNING")]
    Running,
    /// Off every queue, waiting for re-admission
    #[serde(alias = "BLOCKED", alias = "ACTIVE_BLOCKED", alias = "STATIC_BLOCKED")]
    Blocked,
    /// Finished or removed
    #[serde(alias = "TERMINATED")]
    Terminated,
}

impl ProcessState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static priority class (lower value is more urgent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    #[serde(alias = "REAL_TIME")]
    RealTime,
    #[serde(alias = "HIGH")]
    High,
    #[serde(alias = "NORMAL")]
    Normal,
    #[serde(alias = "LOW")]
    Low,
    #[serde(alias = "IDLE")]
    Idle,
}

impl PriorityClass {
    #[inline(always)]
    pub const fn value(&self) -> i64 {
        match self {
            Self::RealTime => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
            Self::Idle => 4,
        }
    }
}

impl PriorityClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RealTime => "real_time",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PriorityClass {
    fn default() -> Self {
        Self::Normal
    }
}

/// CPU scheduling policy attached to each process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingPolicy {
    /// First come, first served
    Fcfs,
    /// Time-sliced rotation
    RoundRobin,
    /// Minimum dynamic priority first
    Priority,
    /// Minimum remaining need first
    ShortestJobFirst,
    /// Maximum (wait + need) / need first
    HighestResponseRatio,
    /// Multi-level feedback queue: demoted on slice expiry
    MultilevelFeedback,
}

impl SchedulingPolicy {
    /// Parse from string representation
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "round_robin" | "roundrobin" | "rr" | "rp" => Ok(Self::RoundRobin),
            "priority" | "prio" | "pr" => Ok(Self::Priority),
            "shortest_job_first" | "sjf" => Ok(Self::ShortestJobFirst),
            "highest_response_ratio" | "hrrn" | "hrr" => Ok(Self::HighestResponseRatio),
            "multilevel_feedback" | "mlfq" | "mf" => Ok(Self::MultilevelFeedback),
            _ => Err(format!(
                "Invalid policy '{}'. Valid: fcfs, round_robin, priority, shortest_job_first, highest_response_ratio, multilevel_feedback",
                s
            )),
        }
    }

    /// Convert to string representation
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::RoundRobin => "round_robin",
            Self::Priority => "priority",
            Self::ShortestJobFirst => "shortest_job_first",
            Self::HighestResponseRatio => "highest_response_ratio",
            Self::MultilevelFeedback => "multilevel_feedback",
        }
    }

    /// Policies whose processes give up the CPU when their slice expires
    #[inline(always)]
    pub const fn is_time_sliced(&self) -> bool {
        matches!(self, Self::RoundRobin | Self::MultilevelFeedback)
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::RoundRobin
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulingPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulingPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
