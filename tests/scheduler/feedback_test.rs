/*!
 * Feedback Tests
 * Multi-level feedback demotion and anti-starvation promotion
 */

use os_sim::scheduler::QueueLocation;
use os_sim::{
    Pid, PriorityClass, ProcessDescriptor, Scheduler, SchedulerConfig, SchedulingParams,
    SchedulingPolicy,
};
use pretty_assertions::assert_eq;

fn process(
    pid: Pid,
    need: u64,
    slice: u64,
    policy: SchedulingPolicy,
    level: usize,
) -> ProcessDescriptor {
    ProcessDescriptor::new(
        pid,
        format!("p{pid}"),
        SchedulingParams {
            total_need_time: need,
            time_slice: slice,
            priority: PriorityClass::Normal,
            policy,
            preemptable: false,
            queue_level: level,
        },
    )
}

#[test]
fn test_mlfq_demotes_on_slice_expiry() {
    let mut scheduler = Scheduler::new();
    scheduler.admit(process(1, 100, 10, SchedulingPolicy::MultilevelFeedback, 0));

    scheduler.tick(10);
    let info = &scheduler.process(1).unwrap().scheduling;
    assert_eq!(info.queue_level, 1);
    assert_eq!(info.time_slice, 15);
    assert!(info.needs_reschedule);

    // Re-selected alone: the switch refills the longer slice
    scheduler.tick(10);
    let info = &scheduler.process(1).unwrap().scheduling;
    assert_eq!(info.time_slice_remaining, 5);
    assert_eq!(info.queue_level, 1);

    scheduler.tick(10);
    let info = &scheduler.process(1).unwrap().scheduling;
    assert_eq!(info.queue_level, 2);
    assert_eq!(info.time_slice, 22);
    assert_eq!(scheduler.stats().demotions, 2);
    // Only 5 units of slice were left on the last burst
    assert_eq!(scheduler.clock(), 25);
}

#[test]
fn test_mlfq_demotion_clamps_at_last_level() {
    let mut scheduler = Scheduler::new();
    scheduler.admit(process(1, 1000, 4, SchedulingPolicy::MultilevelFeedback, 4));

    scheduler.tick(4);
    let info = &scheduler.process(1).unwrap().scheduling;
    assert_eq!(info.queue_level, 4);
    assert_eq!(info.time_slice, 4);
    assert_eq!(scheduler.stats().demotions, 0);
}

#[test]
fn test_demoted_process_yields_to_top_queue() {
    let mut scheduler = Scheduler::new();
    scheduler.admit(process(1, 100, 10, SchedulingPolicy::MultilevelFeedback, 0));
    scheduler.admit(process(2, 100, 10, SchedulingPolicy::MultilevelFeedback, 0));

    assert_eq!(scheduler.tick(10), Some(1));
    assert_eq!(scheduler.tick(10), Some(2));
    assert_eq!(scheduler.location(1), Some(QueueLocation::Ready(1)));

    // Both now sit at level 1 in arrival order
    assert_eq!(scheduler.tick(10), Some(1));
    assert_eq!(scheduler.location(2), Some(QueueLocation::Ready(1)));
}

#[test]
fn test_starving_process_is_promoted() {
    let mut scheduler = Scheduler::with_config(SchedulerConfig {
        starvation_threshold: 50,
        tick_length: 10,
    });
    scheduler.admit(process(1, 10_000, 10_000, SchedulingPolicy::Fcfs, 0));
    scheduler.admit(process(2, 10, 100, SchedulingPolicy::Fcfs, 3));

    for _ in 0..5 {
        scheduler.tick_default();
    }
    assert_eq!(scheduler.location(2), Some(QueueLocation::Ready(3)));
    assert_eq!(scheduler.process(2).unwrap().scheduling.time_in_queue, 50);

    // Residency now exceeds the threshold
    scheduler.tick_default();
    assert_eq!(scheduler.location(2), Some(QueueLocation::Ready(2)));
    assert_eq!(scheduler.process(2).unwrap().scheduling.time_in_queue, 0);
    assert_eq!(scheduler.stats().promotions, 1);

    for _ in 0..12 {
        scheduler.tick_default();
    }
    assert_eq!(scheduler.location(2), Some(QueueLocation::Ready(0)));
    assert_eq!(scheduler.stats().promotions, 3);
    assert_eq!(scheduler.current(), Some(1));
}

#[test]
fn test_idle_ticks_advance_clock() {
    let mut scheduler = Scheduler::new();
    assert_eq!(scheduler.tick(25), None);
    assert_eq!(scheduler.tick(25), None);
    assert_eq!(scheduler.clock(), 50);
    assert_eq!(scheduler.stats().idle_ticks, 2);
    assert_eq!(scheduler.stats().ticks, 2);
}
