/*!
 * Lifecycle Tests
 * Admission, removal, safety sequences and deadlock detection
 */

use os_sim::{
    AllocationAuthority, AllocationError, Amount, Pid, ProcessDescriptor, ResourceLedger,
    ResourceTypes, ResourceVector, SchedulingParams,
};
use pretty_assertions::assert_eq;

fn types(names: &[&str]) -> ResourceTypes {
    ResourceTypes::new(names.iter().copied()).unwrap()
}

fn process(
    types: &ResourceTypes,
    pid: Pid,
    max: &[Amount],
    alloc: &[Amount],
) -> ProcessDescriptor {
    let ledger = ResourceLedger::new(types, max.to_vec().into(), alloc.to_vec().into()).unwrap();
    ProcessDescriptor::new(pid, format!("P{pid}"), SchedulingParams::default()).with_ledger(ledger)
}

fn two_process_system() -> AllocationAuthority {
    let types = types(&["A", "B"]);
    let processes = vec![
        process(&types, 1, &[7, 5], &[0, 1]),
        process(&types, 2, &[3, 2], &[2, 0]),
    ];
    let mut authority = AllocationAuthority::new(types);
    authority.initialize(vec![8, 4].into(), processes).unwrap();
    authority
}

fn v(amounts: &[Amount]) -> ResourceVector {
    amounts.to_vec().into()
}

#[test]
fn test_add_process_debits_initial_allocation() {
    let mut authority = two_process_system();
    let types = authority.types().clone();

    authority.add_process(process(&types, 3, &[2, 2], &[1, 0])).unwrap();
    assert_eq!(authority.available(), &v(&[7, 4]));
    assert_eq!(authority.processes().len(), 3);
    assert_eq!(authority.total_resources(), v(&[10, 5]));
    assert_eq!(authority.safety_check().sequence, vec![1, 2, 3]);
}

#[test]
fn test_add_process_rejections() {
    let mut authority = two_process_system();
    let types = authority.types().clone();

    assert!(matches!(
        authority.add_process(process(&types, 1, &[1, 1], &[0, 0])),
        Err(AllocationError::DuplicateProcess(1))
    ));
    assert!(matches!(
        authority.add_process(process(&types, 4, &[11, 0], &[0, 0])),
        Err(AllocationError::ExceedsSystemTotal { demand: 11, total: 10, .. })
    ));
    assert!(matches!(
        authority.add_process(process(&types, 5, &[9, 5], &[9, 0])),
        Err(AllocationError::ExceedsAvailable { requested: 9, available: 8, .. })
    ));

    let other = ResourceTypes::new(["A"]).unwrap();
    assert!(matches!(
        authority.add_process(process(&other, 6, &[1], &[0])),
        Err(AllocationError::DimensionMismatch { .. })
    ));

    assert_eq!(authority.processes().len(), 2);
    assert_eq!(authority.available(), &v(&[8, 4]));
}

#[test]
fn test_unsafe_admission_rolled_back() {
    let types = types(&["tape"]);
    let mut authority = AllocationAuthority::new(types.clone());
    authority
        .initialize(
            vec![3].into(),
            vec![process(&types, 1, &[10], &[5]), process(&types, 2, &[4], &[2])],
        )
        .unwrap();

    let result = authority.add_process(process(&types, 3, &[9], &[2]));
    assert!(matches!(result, Err(AllocationError::Unsafe)));
    assert_eq!(authority.processes().len(), 2);
    assert_eq!(authority.available(), &v(&[3]));
    assert!(authority.is_safe_state());
}

#[test]
fn test_remove_process_reclaims_allocation() {
    let mut authority = two_process_system();

    let removed = authority.remove_process(2).unwrap();
    assert_eq!(removed.pid(), 2);
    assert!(removed.ledger.allocation().is_zero());
    assert_eq!(removed.ledger.need(), &v(&[3, 2]));
    assert_eq!(authority.available(), &v(&[10, 4]));

    assert!(matches!(
        authority.remove_process(2),
        Err(AllocationError::ProcessNotFound(2))
    ));
}

#[test]
fn test_safe_sequence_replays() {
    let mut authority = two_process_system();
    let report = authority.safety_check();
    assert!(report.safe);

    let mut work = authority.available().clone();
    for pid in &report.sequence {
        let ledger = &authority.process(*pid).unwrap().ledger;
        assert!(ledger.need().covered_by(&work));
        work.saturating_add_assign(ledger.allocation());
    }
    assert_eq!(work, authority.total_resources());
}

#[test]
fn test_deadlock_detected_and_cleared() {
    let types = types(&["A", "B"]);
    let mut authority = AllocationAuthority::new(types.clone());
    authority
        .initialize(
            vec![0, 0].into(),
            vec![
                process(&types, 1, &[2, 1], &[1, 1]),
                process(&types, 2, &[1, 2], &[1, 1]),
            ],
        )
        .unwrap();

    let deadlocked: Vec<Pid> = authority.detect_deadlock().into_iter().collect();
    assert_eq!(deadlocked, vec![1, 2]);
    assert!(authority.snapshot().deadlock);

    // P1 gives up what it holds, letting P2 and then P1 finish
    authority.release_resources(1, &v(&[1, 1])).unwrap();
    assert!(authority.detect_deadlock().is_empty());
    assert!(authority.processes().iter().all(|p| !p.ledger.deadlocked));
}

#[test]
fn test_snapshot_serializes() {
    let mut authority = two_process_system();
    authority.request_resources(2, &v(&[1, 0])).unwrap();

    let snapshot = authority.snapshot();
    assert!(snapshot.safe);
    assert_eq!(snapshot.available.get("A"), Some(&7));

    let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(json["processes"][1]["allocation"]["A"], 3);
    assert_eq!(json["safe_sequence"], serde_json::json!([1, 2]));
}
