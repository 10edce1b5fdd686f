/*!
 * Allocation Property Tests
 * Ledger invariants and conservation under random request/release traffic
 */

use os_sim::{
    AllocationAuthority, Amount, Pid, ProcessDescriptor, ResourceLedger, ResourceTypes,
    ResourceVector, SchedulingParams,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct System {
    available: Vec<Amount>,
    /// (max demand, allocation) per process
    processes: Vec<(Vec<Amount>, Vec<Amount>)>,
}

#[derive(Debug, Clone)]
enum Op {
    Request(usize, Vec<Amount>),
    Release(usize, Vec<Amount>),
}

fn system(dims: usize) -> impl Strategy<Value = System> {
    let process = prop::collection::vec((0u32..10, 0u32..10), dims).prop_map(|pairs| {
        let max: Vec<Amount> = pairs.iter().map(|&(m, _)| m).collect();
        let alloc = pairs.iter().map(|&(m, a)| a.min(m)).collect();
        (max, alloc)
    });
    (
        prop::collection::vec(0u32..10, dims),
        prop::collection::vec(process, 1..5),
    )
        .prop_map(|(available, processes)| System {
            available,
            processes,
        })
}

fn ops(dims: usize) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0usize..5, prop::collection::vec(0u32..6, dims)).prop_map(|(i, v)| Op::Request(i, v)),
        (0usize..5, prop::collection::vec(0u32..6, dims)).prop_map(|(i, v)| Op::Release(i, v)),
    ];
    prop::collection::vec(op, 1..40)
}

fn scenario() -> impl Strategy<Value = (System, Vec<Op>)> {
    (1usize..4).prop_flat_map(|dims| (system(dims), ops(dims)))
}

fn build(system: &System) -> AllocationAuthority {
    let names: Vec<String> = (0..system.available.len()).map(|i| format!("R{i}")).collect();
    let types = ResourceTypes::new(names).unwrap();
    let processes = system
        .processes
        .iter()
        .enumerate()
        .map(|(i, (max, alloc))| {
            let ledger =
                ResourceLedger::new(&types, max.clone().into(), alloc.clone().into()).unwrap();
            ProcessDescriptor::new(i as Pid + 1, format!("P{}", i + 1), SchedulingParams::default())
                .with_ledger(ledger)
        })
        .collect();
    let mut authority = AllocationAuthority::new(types);
    authority
        .initialize(system.available.clone().into(), processes)
        .unwrap();
    authority
}

fn pid_for(authority: &AllocationAuthority, index: usize) -> Pid {
    (index % authority.processes().len()) as Pid + 1
}

fn check_invariants(authority: &AllocationAuthority, total: &ResourceVector) {
    for process in authority.processes() {
        process.ledger.validate(authority.types()).unwrap();
    }
    assert_eq!(&authority.total_resources(), total, "resources created or lost");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_ledger_invariant_and_conservation((system, ops) in scenario()) {
        let mut authority = build(&system);
        let total = authority.total_resources();

        for op in ops {
            match op {
                Op::Request(i, amounts) => {
                    let pid = pid_for(&authority, i);
                    let _ = authority.request_resources(pid, &amounts.into());
                }
                Op::Release(i, amounts) => {
                    let pid = pid_for(&authority, i);
                    let _ = authority.release_resources(pid, &amounts.into());
                }
            }
            check_invariants(&authority, &total);
        }
    }

    #[test]
    fn prop_request_then_release_is_identity((system, ops) in scenario()) {
        let mut authority = build(&system);

        for op in ops {
            let Op::Request(i, amounts) = op else { continue };
            let pid = pid_for(&authority, i);
            let request: ResourceVector = amounts.into();

            let available = authority.available().clone();
            let ledger = authority.process(pid).unwrap().ledger.clone();
            if authority.request_resources(pid, &request).is_ok() {
                authority.release_resources(pid, &request).unwrap();
            }

            let after = &authority.process(pid).unwrap().ledger;
            prop_assert_eq!(authority.available(), &available);
            prop_assert_eq!(after.allocation(), ledger.allocation());
            prop_assert_eq!(after.need(), ledger.need());
        }
    }

    #[test]
    fn prop_safe_sequence_never_overdraws((system, ops) in scenario()) {
        let mut authority = build(&system);

        for op in ops {
            if let Op::Request(i, amounts) = op {
                let pid = pid_for(&authority, i);
                let _ = authority.request_resources(pid, &amounts.into());
            }

            let report = authority.safety_check();
            if !report.safe {
                continue;
            }
            prop_assert_eq!(report.sequence.len(), authority.processes().len());
            let mut work = authority.available().clone();
            for pid in &report.sequence {
                let ledger = &authority.process(*pid).unwrap().ledger;
                prop_assert!(ledger.need().covered_by(&work));
                work.saturating_add_assign(ledger.allocation());
            }
        }
    }

    #[test]
    fn prop_granted_request_keeps_system_safe((system, ops) in scenario()) {
        let mut authority = build(&system);

        for op in ops {
            let Op::Request(i, amounts) = op else { continue };
            let pid = pid_for(&authority, i);
            if authority.request_resources(pid, &amounts.into()).is_ok() {
                prop_assert!(authority.is_safe_state());
            }
        }
    }
}
