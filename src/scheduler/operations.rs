/*!
 * Scheduler Operations
 * Admission, the per-tick cycle and live process control
 */

use super::policy::strategy_for;
use super::Scheduler;
use crate::core::limits::QUEUE_LEVELS;
use crate::core::types::{Pid, SimTime};
use crate::process::{PriorityClass, ProcessDescriptor, ProcessState, SchedulingPolicy};
use tracing::{debug, info, warn};

impl Scheduler {
    /// Insert into the ready queue matching the process's clamped level
    pub fn admit(&mut self, mut process: ProcessDescriptor) {
        let pid = process.pid();
        if self.processes.contains_key(&pid) {
            warn!(pid, "process already admitted, ignoring");
            return;
        }

        if process.scheduling.time_slice == 0 {
            warn!(pid, "zero time slice, clamping to 1");
            process.scheduling.time_slice = 1;
            process.scheduling.reset_time_slice();
        }
        process.scheduling.refresh_dynamic_priority();
        info!(
            pid,
            name = %process.name,
            policy = %process.policy,
            level = process.scheduling.queue_level,
            "admitted process"
        );
        self.processes.insert(pid, process);
        self.enqueue(pid);
    }

    /// Run one scheduling cycle of at most `time_budget` units
    ///
    /// Returns the process on the CPU afterward, or `None` when idle.
    pub fn tick(&mut self, time_budget: SimTime) -> Option<Pid> {
        self.stats.ticks += 1;

        let next = self.select_next();
        let switch = match (self.current, next) {
            (None, None) => false,
            (Some(current), Some(next)) if current == next => self.slice_rotation_due(current),
            _ => true,
        };
        if switch {
            self.context_switch(next);
        }

        let elapsed = match self.current {
            Some(pid) => self.execute(pid, time_budget),
            None => {
                self.stats.idle_ticks += 1;
                debug!(clock = self.clock, "cpu idle");
                time_budget
            }
        };

        self.clock += elapsed;
        self.age_ready_queues(elapsed);
        self.current
    }

    /// Withdraw a live process wherever it is
    pub fn remove(&mut self, pid: Pid) -> Option<ProcessDescriptor> {
        self.remove_from_ready_queues(pid);
        let mut process = self.processes.remove(&pid)?;

        if self.current == Some(pid) {
            self.current = None;
            if let Some(registers) = self.registers.take() {
                process.registers = registers;
            }
            self.last = Some(pid);
        }
        process.state = ProcessState::Terminated;
        info!(pid, "removed process");
        Some(process)
    }

    /// Change a live process's static class; false if unknown
    pub fn set_priority(&mut self, pid: Pid, priority: PriorityClass) -> bool {
        match self.processes.get_mut(&pid) {
            Some(process) => {
                process.set_priority(priority);
                info!(
                    pid,
                    priority = %priority,
                    dynamic = process.scheduling.dynamic_priority,
                    "priority changed"
                );
                true
            }
            None => {
                warn!(pid, "priority change for unknown process");
                false
            }
        }
    }

    /// Decide who holds the CPU this tick without touching the queues
    fn select_next(&mut self) -> Option<Pid> {
        let Some(pid) = self.current else {
            return self.pick_highest();
        };
        let Some(process) = self.processes.get(&pid) else {
            self.current = None;
            return self.pick_highest();
        };

        if process.scheduling.is_complete() {
            self.terminate_current(pid);
            return self.pick_highest();
        }

        let info = &process.scheduling;
        let preempted = info.preemptable && self.has_more_urgent(info.dynamic_priority);
        let expired = process.policy.is_time_sliced() && info.time_slice_expired;
        if !preempted && !expired {
            return Some(pid);
        }

        if preempted {
            self.stats.preemptions += 1;
            info!(pid, clock = self.clock, "preempted by more urgent process");
        }
        if let Some(process) = self.processes.get_mut(&pid) {
            process.mark_for_reschedule();
        }
        Some(self.pick_highest().unwrap_or(pid))
    }

    /// Candidate from the first non-empty queue, chosen by its head's policy
    fn pick_highest(&mut self) -> Option<Pid> {
        let current = self.current;
        let level = self.queues.iter().position(|queue| !queue.is_empty())?;
        let queue = &mut self.queues[level];
        let policy = queue
            .front()
            .and_then(|pid| self.processes.get(pid))
            .map_or(SchedulingPolicy::default(), |p| p.policy);

        let strategy = strategy_for(policy);
        let chosen = strategy.select(queue, &self.processes, current);
        debug!(level, strategy = strategy.name(), chosen = ?chosen, "selected candidate");
        chosen
    }

    fn has_more_urgent(&self, dynamic_priority: i64) -> bool {
        self.queues.iter().flatten().any(|pid| {
            self.processes
                .get(pid)
                .is_some_and(|p| p.scheduling.dynamic_priority < dynamic_priority)
        })
    }

    /// A time-sliced process re-selected after expiry still goes through a switch
    fn slice_rotation_due(&self, pid: Pid) -> bool {
        self.processes
            .get(&pid)
            .is_some_and(|p| p.policy.is_time_sliced() && p.scheduling.time_slice_expired)
    }

    fn terminate_current(&mut self, pid: Pid) {
        self.current = None;
        self.last = Some(pid);
        let Some(mut process) = self.processes.remove(&pid) else {
            return;
        };
        if let Some(registers) = self.registers.take() {
            process.registers = registers;
        }
        process.state = ProcessState::Terminated;
        self.stats.terminations += 1;
        info!(
            pid,
            clock = self.clock,
            cpu_time = process.scheduling.total_cpu_time,
            "process terminated"
        );
        self.terminated.push(process);
    }

    fn context_switch(&mut self, next: Option<Pid>) {
        let outgoing = self.current.take();

        if let Some(pid) = outgoing {
            let requeue = match self.processes.get_mut(&pid) {
                Some(process) => {
                    if let Some(registers) = self.registers.take() {
                        process.registers = registers;
                    }
                    let info = &process.scheduling;
                    !info.is_complete()
                        && ((process.policy.is_time_sliced() && info.time_slice_expired)
                            || info.needs_reschedule)
                }
                None => false,
            };

            if requeue {
                self.enqueue(pid);
            } else if let Some(process) = self.processes.get_mut(&pid) {
                process.state = ProcessState::Blocked;
                warn!(pid, "process parked off the ready queues");
            }
            self.last = Some(pid);
        }

        if let Some(pid) = next {
            self.remove_from_ready_queues(pid);
            if let Some(process) = self.processes.get_mut(&pid) {
                process.state = ProcessState::Running;
                process.scheduling.reset_time_slice();
                self.registers = Some(process.registers);
                self.current = Some(pid);
                self.stats.context_switches += 1;
                info!(from = ?outgoing, to = pid, clock = self.clock, "context switch");
            }
        }
    }

    /// Run the current process; returns the time actually used
    fn execute(&mut self, pid: Pid, time_budget: SimTime) -> SimTime {
        let Some(process) = self.processes.get_mut(&pid) else {
            return 0;
        };

        let info = &mut process.scheduling;
        info.last_scheduled_time = self.clock;
        let used = info.consume_time(time_budget);
        info.update_average_burst(used);
        info.refresh_dynamic_priority();
        if let Some(registers) = self.registers.as_mut() {
            registers.execute(used);
        }
        debug!(
            pid,
            used,
            remaining = info.remaining_need_time,
            slice_remaining = info.time_slice_remaining,
            "executed burst"
        );

        if info.is_complete() || !(info.time_slice_expired || info.needs_reschedule) {
            return used;
        }

        match process.policy {
            SchedulingPolicy::MultilevelFeedback => {
                if info.demote(QUEUE_LEVELS - 1) {
                    self.stats.demotions += 1;
                    debug!(pid, level = info.queue_level, slice = info.time_slice, "demoted");
                }
                info.needs_reschedule = true;
            }
            SchedulingPolicy::RoundRobin => {}
            _ => info.reset_time_slice(),
        }
        used
    }

    /// Grow residency of every ready process and promote the starving ones
    fn age_ready_queues(&mut self, elapsed: SimTime) {
        let threshold = self.config.starvation_threshold;
        let mut starving = Vec::new();

        for (level, queue) in self.queues.iter().enumerate() {
            for &pid in queue {
                if let Some(process) = self.processes.get_mut(&pid) {
                    let info = &mut process.scheduling;
                    info.time_in_queue += elapsed;
                    info.refresh_dynamic_priority();
                    if level > 0 && info.time_in_queue > threshold {
                        starving.push((level, pid));
                    }
                }
            }
        }

        for (level, pid) in starving {
            self.queues[level].retain(|&queued| queued != pid);
            if let Some(process) = self.processes.get_mut(&pid) {
                process.scheduling.boost();
            }
            self.enqueue(pid);
            self.stats.promotions += 1;
            info!(pid, from = level, to = level - 1, "promoted starving process");
        }
    }

    /// Append to the ready queue for the process's (clamped) level
    fn enqueue(&mut self, pid: Pid) {
        let Some(process) = self.processes.get_mut(&pid) else {
            return;
        };
        let level = process.scheduling.queue_level.min(QUEUE_LEVELS - 1);
        process.scheduling.queue_level = level;
        process.state = ProcessState::Ready;
        self.queues[level].push_back(pid);
    }

    fn remove_from_ready_queues(&mut self, pid: Pid) {
        for queue in self.queues.iter_mut() {
            queue.retain(|&queued| queued != pid);
        }
    }
}
