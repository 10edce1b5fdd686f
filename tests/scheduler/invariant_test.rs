/*!
 * Scheduler Invariant Tests
 * Property checks over randomized process mixes
 */

use os_sim::scheduler::QueueLocation;
use os_sim::{
    Pid, PriorityClass, ProcessDescriptor, Scheduler, SchedulerConfig, SchedulingParams,
    SchedulingPolicy,
};
use proptest::prelude::*;
use std::collections::HashMap;

const POLICIES: [SchedulingPolicy; 6] = [
    SchedulingPolicy::Fcfs,
    SchedulingPolicy::RoundRobin,
    SchedulingPolicy::Priority,
    SchedulingPolicy::ShortestJobFirst,
    SchedulingPolicy::HighestResponseRatio,
    SchedulingPolicy::MultilevelFeedback,
];

const CLASSES: [PriorityClass; 5] = [
    PriorityClass::RealTime,
    PriorityClass::High,
    PriorityClass::Normal,
    PriorityClass::Low,
    PriorityClass::Idle,
];

#[derive(Debug, Clone)]
struct ProcessShape {
    need: u64,
    slice: u64,
    policy: usize,
    priority: usize,
    preemptable: bool,
    level: usize,
}

fn process_shape() -> impl Strategy<Value = ProcessShape> {
    (1u64..120, 1u64..40, 0usize..6, 0usize..5, any::<bool>(), 0usize..7).prop_map(
        |(need, slice, policy, priority, preemptable, level)| ProcessShape {
            need,
            slice,
            policy,
            priority,
            preemptable,
            level,
        },
    )
}

fn build(rows: &[ProcessShape], threshold: u64) -> Scheduler {
    let mut scheduler = Scheduler::with_config(SchedulerConfig {
        starvation_threshold: threshold,
        tick_length: 10,
    });
    for (i, shape) in rows.iter().enumerate() {
        scheduler.admit(ProcessDescriptor::new(
            i as Pid + 1,
            format!("p{}", i + 1),
            SchedulingParams {
                total_need_time: shape.need,
                time_slice: shape.slice,
                priority: CLASSES[shape.priority],
                policy: POLICIES[shape.policy],
                preemptable: shape.preemptable,
                queue_level: shape.level,
            },
        ));
    }
    scheduler
}

/// Every live pid is in exactly one place, and only once
fn assert_membership(scheduler: &Scheduler) {
    let mut seen: HashMap<Pid, usize> = HashMap::new();
    for level in 0..5 {
        for &pid in scheduler.queue(level).unwrap() {
            *seen.entry(pid).or_default() += 1;
            assert_eq!(scheduler.location(pid), Some(QueueLocation::Ready(level)));
        }
    }
    assert!(seen.values().all(|&count| count == 1), "duplicate queue entry");
    if let Some(current) = scheduler.current() {
        assert!(!seen.contains_key(&current), "running process also enqueued");
    }
    for process in scheduler.processes() {
        let pid = process.pid();
        let placed = seen.contains_key(&pid) || scheduler.current() == Some(pid);
        assert!(placed, "process {pid} lost from every queue");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_queue_membership_is_exclusive(
        rows in prop::collection::vec(process_shape(), 1..8),
        budgets in prop::collection::vec(1u64..30, 1..60),
    ) {
        let mut scheduler = build(&rows, 40);
        for budget in budgets {
            scheduler.tick(budget);
            assert_membership(&scheduler);
        }
    }

    #[test]
    fn prop_every_process_eventually_terminates(
        rows in prop::collection::vec(process_shape(), 1..6),
        budget in 1u64..25,
    ) {
        let mut scheduler = build(&rows, 2000);
        let total_need: u64 = rows.iter().map(|s| s.need).sum();

        for _ in 0..total_need + 2 {
            scheduler.tick(budget);
        }
        prop_assert!(scheduler.is_drained());
        prop_assert_eq!(scheduler.terminated().len(), rows.len());

        let cpu: u64 = scheduler
            .terminated()
            .iter()
            .map(|p| p.scheduling.total_cpu_time)
            .sum();
        prop_assert_eq!(cpu, total_need);
        let idle = scheduler.stats().idle_ticks * budget;
        prop_assert_eq!(scheduler.clock(), total_need + idle);
    }

    #[test]
    fn prop_starving_process_promoted_within_one_tick(
        level in 1usize..5,
        threshold in 10u64..200,
    ) {
        let mut scheduler = Scheduler::with_config(SchedulerConfig {
            starvation_threshold: threshold,
            tick_length: 10,
        });
        scheduler.admit(ProcessDescriptor::new(1, "hog", SchedulingParams {
            total_need_time: 1_000_000,
            time_slice: 1_000_000,
            policy: SchedulingPolicy::Fcfs,
            preemptable: false,
            ..SchedulingParams::default()
        }));
        scheduler.admit(ProcessDescriptor::new(2, "starved", SchedulingParams {
            policy: SchedulingPolicy::Fcfs,
            queue_level: level,
            ..SchedulingParams::default()
        }));

        // Residency passes the threshold after threshold / 10 + 1 ticks
        let mut ticks = 0;
        while scheduler.process(2).unwrap().scheduling.queue_level == level {
            scheduler.tick_default();
            ticks += 1;
            prop_assert!(ticks <= threshold / 10 + 1, "not promoted after {} ticks", ticks);
        }
        prop_assert_eq!(scheduler.process(2).unwrap().scheduling.queue_level, level - 1);
    }
}
