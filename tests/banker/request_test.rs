/*!
 * Request & Release Tests
 * Validation order, rollback and history of resource requests
 */

use os_sim::process::{LedgerOutcome, LedgerPhase};
use os_sim::{
    AllocationAuthority, AllocationError, Amount, Pid, ProcessDescriptor, ResourceLedger,
    ResourceTypes, ResourceVector, SchedulingParams,
};
use pretty_assertions::assert_eq;

fn authority(
    names: &[&str],
    available: Vec<Amount>,
    rows: &[(Pid, Vec<Amount>, Vec<Amount>)],
) -> AllocationAuthority {
    let types = ResourceTypes::new(names.iter().copied()).unwrap();
    let processes = rows
        .iter()
        .map(|(pid, max, alloc)| {
            let ledger =
                ResourceLedger::new(&types, max.clone().into(), alloc.clone().into()).unwrap();
            ProcessDescriptor::new(*pid, format!("P{pid}"), SchedulingParams::default())
                .with_ledger(ledger)
        })
        .collect();
    let mut authority = AllocationAuthority::new(types);
    authority.initialize(available.into(), processes).unwrap();
    authority
}

/// A:10 B:5 with two processes
fn two_process_system() -> AllocationAuthority {
    authority(
        &["A", "B"],
        vec![8, 4],
        &[(1, vec![7, 5], vec![0, 1]), (2, vec![3, 2], vec![2, 0])],
    )
}

/// Twelve units of one resource; safe now, unsafe after one more grant to P3
fn textbook_system() -> AllocationAuthority {
    authority(
        &["tape"],
        vec![3],
        &[(1, vec![10], vec![5]), (2, vec![4], vec![2]), (3, vec![9], vec![2])],
    )
}

fn v(amounts: &[Amount]) -> ResourceVector {
    amounts.to_vec().into()
}

#[test]
fn test_grant_then_reject_over_need() {
    let mut authority = two_process_system();

    authority.request_resources(2, &v(&[1, 0])).unwrap();
    assert_eq!(authority.available(), &v(&[7, 4]));
    let p2 = &authority.process(2).unwrap().ledger;
    assert_eq!(p2.allocation(), &v(&[3, 0]));
    assert_eq!(p2.need(), &v(&[0, 2]));

    let before = authority.snapshot();
    let result = authority.request_resources(1, &v(&[8, 0]));
    assert!(matches!(
        result,
        Err(AllocationError::ExceedsNeed { ref resource, requested: 8, need: 7 }) if resource == "A"
    ));
    assert_eq!(authority.snapshot(), before);
}

#[test]
fn test_unsafe_grant_is_rolled_back() {
    let mut authority = textbook_system();
    assert!(authority.is_safe_state());

    let result = authority.request_resources(3, &v(&[1]));
    assert!(matches!(result, Err(AllocationError::Unsafe)));

    assert_eq!(authority.available(), &v(&[3]));
    let p3 = &authority.process(3).unwrap().ledger;
    assert_eq!(p3.allocation(), &v(&[2]));
    assert_eq!(p3.need(), &v(&[7]));
    assert_eq!(p3.phase(), LedgerPhase::Waiting);
    assert!(matches!(
        p3.history().last().map(|r| &r.outcome),
        Some(LedgerOutcome::Denied(_))
    ));

    // Safety flags reflect the restored state
    assert!(authority.processes().iter().all(|p| p.ledger.in_safe_state));
}

#[test]
fn test_request_beyond_availability_waits() {
    let mut authority = textbook_system();
    let result = authority.request_resources(3, &v(&[4]));
    assert!(matches!(
        result,
        Err(AllocationError::ExceedsAvailable { requested: 4, available: 3, .. })
    ));

    let p3 = &authority.process(3).unwrap().ledger;
    assert_eq!(p3.waiting().len(), 1);
    assert_eq!(p3.allocation(), &v(&[2]));
    assert_eq!(authority.available(), &v(&[3]));
}

#[test]
fn test_shortfall_on_one_type_waits_on_whole_request() {
    let mut authority = two_process_system();
    authority.request_resources(1, &v(&[0, 4])).unwrap();
    assert_eq!(authority.available(), &v(&[8, 0]));

    let result = authority.request_resources(2, &v(&[1, 1]));
    assert!(matches!(
        result,
        Err(AllocationError::ExceedsAvailable { ref resource, .. }) if resource == "B"
    ));
    assert_eq!(authority.process(2).unwrap().ledger.waiting().len(), 2);

    let snapshot = authority.snapshot();
    assert_eq!(snapshot.processes[1].waiting_for, vec!["A", "B"]);
    assert_eq!(snapshot.processes[1].requests.denied, 1);
    assert_eq!(snapshot.processes[0].requests.granted, 1);
}

#[test]
fn test_grant_clears_waiting_set() {
    let mut authority = textbook_system();
    assert!(authority.request_resources(1, &v(&[4])).is_err());
    assert_eq!(
        authority.process(1).unwrap().ledger.phase(),
        LedgerPhase::Waiting
    );

    authority.request_resources(1, &v(&[1])).unwrap();
    let p1 = &authority.process(1).unwrap().ledger;
    assert!(p1.waiting().is_empty());
    assert_eq!(p1.phase(), LedgerPhase::Granted);
    assert_eq!(authority.available(), &v(&[2]));
}

#[test]
fn test_request_then_release_restores_state() {
    let mut authority = two_process_system();
    let before = authority.process(2).unwrap().ledger.clone();
    let available = authority.available().clone();

    authority.request_resources(2, &v(&[1, 1])).unwrap();
    authority.release_resources(2, &v(&[1, 1])).unwrap();

    let after = &authority.process(2).unwrap().ledger;
    assert_eq!(after.allocation(), before.allocation());
    assert_eq!(after.need(), before.need());
    assert_eq!(authority.available(), &available);
    assert_eq!(after.history().len(), 2);
}

#[test]
fn test_release_beyond_allocation_rejected() {
    let mut authority = two_process_system();
    let result = authority.release_resources(1, &v(&[1, 0]));
    assert!(matches!(
        result,
        Err(AllocationError::ExceedsAllocation { released: 1, allocated: 0, .. })
    ));
    assert_eq!(authority.available(), &v(&[8, 4]));
}

#[test]
fn test_unknown_process_and_bad_dimension() {
    let mut authority = two_process_system();
    assert!(matches!(
        authority.request_resources(9, &v(&[1, 0])),
        Err(AllocationError::ProcessNotFound(9))
    ));
    assert!(matches!(
        authority.release_resources(1, &v(&[1])),
        Err(AllocationError::DimensionMismatch { expected: 2, actual: 1 })
    ));
}

#[test]
fn test_zero_request_is_granted_and_recorded() {
    let mut authority = two_process_system();
    authority.advance_time(42);
    authority.request_resources(1, &v(&[0, 0])).unwrap();

    let record = authority.process(1).unwrap().ledger.history()[0].clone();
    assert_eq!(record.time, 42);
    assert_eq!(record.outcome, LedgerOutcome::Granted);
}
