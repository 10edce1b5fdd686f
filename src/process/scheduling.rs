/*!
 * Scheduling Info
 * Per-process scheduling metrics, time-slice accounting and priority scoring
 */

use super::types::PriorityClass;
use crate::core::limits::*;
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

/// Scheduling bookkeeping owned by each process descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingInfo {
    pub static_priority: PriorityClass,
    /// Derived score, lower is more urgent
    pub dynamic_priority: i64,

    pub total_need_time: u64,
    pub remaining_need_time: u64,

    pub time_slice: u64,
    pub time_slice_remaining: u64,
    pub time_slice_expired: bool,

    pub last_scheduled_time: SimTime,
    pub total_cpu_time: u64,
    pub last_cpu_burst: u64,
    pub average_cpu_burst: f64,

    pub preemptable: bool,
    pub needs_reschedule: bool,

    pub queue_level: usize,
    pub time_in_queue: u64,

    pub interactive_score: f64,
}

impl SchedulingInfo {
    pub fn new(
        static_priority: PriorityClass,
        total_need_time: u64,
        time_slice: u64,
        preemptable: bool,
    ) -> Self {
        let mut info = Self {
            static_priority,
            dynamic_priority: 0,
            total_need_time,
            remaining_need_time: total_need_time,
            time_slice,
            time_slice_remaining: 0,
            time_slice_expired: false,
            last_scheduled_time: 0,
            total_cpu_time: 0,
            last_cpu_burst: 0,
            average_cpu_burst: 0.0,
            preemptable,
            needs_reschedule: false,
            queue_level: 0,
            time_in_queue: 0,
            interactive_score: 0.0,
        };
        info.reset_time_slice();
        info.refresh_dynamic_priority();
        info
    }

    /// Score from static class, interactivity, burst history and queue waiting
    pub fn calculate_dynamic_priority(&self) -> i64 {
        let base = self.static_priority.value() * CLASS_WEIGHT;
        let interactive_bonus = (self.interactive_score * INTERACTIVE_WEIGHT) as i64;
        let cpu_penalty = if self.average_cpu_burst > CPU_BOUND_BURST {
            CPU_BOUND_PENALTY
        } else {
            0
        };
        let wait_bonus = if self.queue_level > 0 && self.time_in_queue > WAIT_BONUS_RESIDENCY {
            1
        } else {
            0
        };

        (base - interactive_bonus + cpu_penalty - wait_bonus).clamp(0, MAX_DYNAMIC_PRIORITY)
    }

    pub fn refresh_dynamic_priority(&mut self) {
        self.dynamic_priority = self.calculate_dynamic_priority();
    }

    /// Fold a finished burst into the smoothed average and interactivity score
    pub fn update_average_burst(&mut self, burst: u64) {
        self.last_cpu_burst = burst;
        self.average_cpu_burst = if self.average_cpu_burst == 0.0 {
            burst as f64
        } else {
            self.average_cpu_burst * (1.0 - BURST_SMOOTHING) + burst as f64 * BURST_SMOOTHING
        };

        self.interactive_score = if burst < SHORT_BURST {
            0.9
        } else if burst > LONG_BURST {
            0.1
        } else {
            0.5
        };
    }

    /// Refill the slice and clear expiry and reschedule flags
    pub fn reset_time_slice(&mut self) {
        self.time_slice_remaining = self.time_slice;
        self.time_slice_expired = false;
        self.needs_reschedule = false;
    }

    /// Run for up to `amount`, bounded by the remaining slice and need.
    ///
    /// Returns the CPU time actually used. Only consumed need is charged to
    /// the slice, so finishing early leaves the rest of the slice intact.
    pub fn consume_time(&mut self, amount: u64) -> u64 {
        let valid = amount.min(self.time_slice_remaining);
        let used = valid.min(self.remaining_need_time);

        self.remaining_need_time -= used;
        self.time_slice_remaining -= used;
        self.total_cpu_time += used;

        if self.time_slice_remaining == 0 {
            self.time_slice_expired = true;
        }

        used
    }

    /// Move one queue level down with a longer slice; false if already at the bottom
    pub fn demote(&mut self, max_level: usize) -> bool {
        self.time_in_queue = 0;
        let demoted = self.queue_level < max_level;
        if demoted {
            self.queue_level += 1;
            self.time_slice =
                self.time_slice * DEMOTION_SLICE_NUMERATOR / DEMOTION_SLICE_DENOMINATOR;
        }
        self.refresh_dynamic_priority();
        demoted
    }

    /// Move one queue level up; false if already at the top
    pub fn boost(&mut self) -> bool {
        if self.queue_level == 0 {
            return false;
        }
        self.queue_level -= 1;
        self.time_in_queue = 0;
        self.refresh_dynamic_priority();
        true
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_need_time == 0
    }
}

impl Default for SchedulingInfo {
    fn default() -> Self {
        Self::new(
            PriorityClass::Normal,
            DEFAULT_TOTAL_NEED_TIME,
            DEFAULT_TIME_SLICE,
            true,
        )
    }
}
