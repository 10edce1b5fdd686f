/*!
 * Selection Strategies
 * One strategy per scheduling policy, invoked uniformly by the tick loop
 */

use crate::core::types::Pid;
use crate::process::{ProcessDescriptor, SchedulingPolicy};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

/// Picks the next process from one ready queue
///
/// Selection never removes the chosen pid from the queue; the context switch
/// does that once the choice is committed.
pub trait SelectionStrategy: Send + Sync {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        processes: &HashMap<Pid, ProcessDescriptor>,
        current: Option<Pid>,
    ) -> Option<Pid>;

    fn name(&self) -> &'static str;
}

/// Strategy implementing a policy
pub fn strategy_for(policy: SchedulingPolicy) -> &'static dyn SelectionStrategy {
    match policy {
        SchedulingPolicy::Fcfs => &FirstComeFirstServed,
        SchedulingPolicy::RoundRobin => &RoundRobin,
        SchedulingPolicy::Priority => &PriorityFirst,
        SchedulingPolicy::ShortestJobFirst => &ShortestJobFirst,
        SchedulingPolicy::HighestResponseRatio => &HighestResponseRatio,
        SchedulingPolicy::MultilevelFeedback => &MultilevelFeedback,
    }
}

/// Queue head
pub struct FirstComeFirstServed;

impl SelectionStrategy for FirstComeFirstServed {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        _processes: &HashMap<Pid, ProcessDescriptor>,
        _current: Option<Pid>,
    ) -> Option<Pid> {
        queue.front().copied()
    }

    fn name(&self) -> &'static str {
        "fcfs"
    }
}

/// Rotate the current process to the tail, then take the head
pub struct RoundRobin;

impl SelectionStrategy for RoundRobin {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        _processes: &HashMap<Pid, ProcessDescriptor>,
        current: Option<Pid>,
    ) -> Option<Pid> {
        if let Some(current) = current {
            if let Some(pos) = queue.iter().position(|&pid| pid == current) {
                queue.remove(pos);
                queue.push_back(current);
            }
        }
        queue.front().copied()
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

/// Minimum dynamic priority, ties by queue order
pub struct PriorityFirst;

impl SelectionStrategy for PriorityFirst {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        processes: &HashMap<Pid, ProcessDescriptor>,
        _current: Option<Pid>,
    ) -> Option<Pid> {
        queue
            .iter()
            .copied()
            .min_by_key(|pid| {
                processes
                    .get(pid)
                    .map_or(i64::MAX, |p| p.scheduling.dynamic_priority)
            })
    }

    fn name(&self) -> &'static str {
        "priority"
    }
}

/// Minimum remaining need, ties by queue order
pub struct ShortestJobFirst;

impl SelectionStrategy for ShortestJobFirst {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        processes: &HashMap<Pid, ProcessDescriptor>,
        _current: Option<Pid>,
    ) -> Option<Pid> {
        queue.iter().copied().min_by_key(|pid| {
            processes
                .get(pid)
                .map_or(u64::MAX, |p| p.scheduling.remaining_need_time)
        })
    }

    fn name(&self) -> &'static str {
        "shortest_job_first"
    }
}

/// Maximum (wait + need) / need, ties by queue order
pub struct HighestResponseRatio;

impl HighestResponseRatio {
    /// (wait + need, need) as an exact fraction
    fn ratio(process: &ProcessDescriptor) -> (u128, u128) {
        let need = process.scheduling.remaining_need_time.max(1) as u128;
        (process.scheduling.time_in_queue as u128 + need, need)
    }

    fn compare(a: (u128, u128), b: (u128, u128)) -> Ordering {
        (a.0 * b.1).cmp(&(b.0 * a.1))
    }
}

impl SelectionStrategy for HighestResponseRatio {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        processes: &HashMap<Pid, ProcessDescriptor>,
        _current: Option<Pid>,
    ) -> Option<Pid> {
        let mut best: Option<(Pid, (u128, u128))> = None;
        for &pid in queue.iter() {
            let Some(process) = processes.get(&pid) else {
                continue;
            };
            let ratio = Self::ratio(process);
            match best {
                Some((_, best_ratio)) if Self::compare(ratio, best_ratio) != Ordering::Greater => {}
                _ => best = Some((pid, ratio)),
            }
        }
        best.map(|(pid, _)| pid)
    }

    fn name(&self) -> &'static str {
        "highest_response_ratio"
    }
}

/// Queue head; demotion on slice expiry does the feedback
pub struct MultilevelFeedback;

impl SelectionStrategy for MultilevelFeedback {
    fn select(
        &self,
        queue: &mut VecDeque<Pid>,
        _processes: &HashMap<Pid, ProcessDescriptor>,
        _current: Option<Pid>,
    ) -> Option<Pid> {
        queue.front().copied()
    }

    fn name(&self) -> &'static str {
        "multilevel_feedback"
    }
}
