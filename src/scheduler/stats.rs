/*!
 * Scheduler Statistics
 * Counters and a serializable status snapshot
 */

use super::Scheduler;
use crate::core::types::{Pid, SimTime};
use serde::Serialize;

/// Cumulative scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub idle_ticks: u64,
    pub context_switches: u64,
    pub preemptions: u64,
    pub terminations: u64,
    pub demotions: u64,
    pub promotions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedProcess {
    pub pid: Pid,
    pub name: String,
    pub static_priority: u8,
    pub dynamic_priority: i64,
    pub time_in_queue: u64,
    pub remaining_need_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStatus {
    pub level: usize,
    pub processes: Vec<QueuedProcess>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningProcess {
    pub pid: Pid,
    pub name: String,
    pub remaining_need_time: u64,
    pub time_slice_remaining: u64,
}

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub clock: SimTime,
    pub current: Option<RunningProcess>,
    pub last: Option<Pid>,
    pub queues: Vec<QueueStatus>,
    pub terminated: Vec<Pid>,
    pub stats: SchedulerStats,
}

impl Scheduler {
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn status(&self) -> SchedulerStatus {
        let current = self
            .current
            .and_then(|pid| self.processes.get(&pid))
            .map(|p| RunningProcess {
                pid: p.pid(),
                name: p.name.clone(),
                remaining_need_time: p.scheduling.remaining_need_time,
                time_slice_remaining: p.scheduling.time_slice_remaining,
            });

        let queues = self
            .queues
            .iter()
            .enumerate()
            .map(|(level, queue)| QueueStatus {
                level,
                processes: queue
                    .iter()
                    .filter_map(|pid| self.processes.get(pid))
                    .map(|p| QueuedProcess {
                        pid: p.pid(),
                        name: p.name.clone(),
                        static_priority: p.scheduling.static_priority.value() as u8,
                        dynamic_priority: p.scheduling.dynamic_priority,
                        time_in_queue: p.scheduling.time_in_queue,
                        remaining_need_time: p.scheduling.remaining_need_time,
                    })
                    .collect(),
            })
            .collect();

        SchedulerStatus {
            clock: self.clock,
            current,
            last: self.last,
            queues,
            terminated: self.terminated.iter().map(|p| p.pid()).collect(),
            stats: self.stats,
        }
    }
}
