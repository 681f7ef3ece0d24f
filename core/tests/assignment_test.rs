use std::collections::BTreeMap;

use eigenda_core::assignment::{AssignmentCoordinator, StdAssignmentCoordinator};
use eigenda_core::chain::{OperatorInfo, OperatorState};
use eigenda_core::data::OperatorID;
use eigenda_core::errors::AssignmentError;

fn operator_id(i: u8) -> OperatorID {
    let mut bytes = [0u8; 32];
    bytes[31] = i;
    OperatorID::new(bytes)
}

fn state_with_stakes(quorum: u8, stakes: &[u128]) -> OperatorState {
    let operators: BTreeMap<_, _> = stakes
        .iter()
        .enumerate()
        .map(|(i, &stake)| (operator_id(i as u8), OperatorInfo { stake }))
        .collect();
    OperatorState {
        operators: BTreeMap::from([(quorum, operators)]),
        block_number: 100,
    }
}

#[test]
fn ranges_are_contiguous_and_cover_the_domain() {
    let coordinator = StdAssignmentCoordinator;
    let state = state_with_stakes(0, &[100, 300, 50, 550]);

    let (assignments, info) = coordinator.get_assignments(&state, 0, 4).unwrap();

    let mut expected_start = 0usize;
    for assignment in assignments.values() {
        assert_eq!(assignment.start_index, expected_start);
        expected_start += assignment.num_chunks;
    }
    assert_eq!(info.total_chunks, expected_start);
    // ceiling rounding can only add chunks beyond the nominal domain
    assert!(info.total_chunks >= assignments.len() * 4);
}

#[test]
fn equal_stakes_split_evenly() {
    let coordinator = StdAssignmentCoordinator;
    let state = state_with_stakes(1, &[10, 10, 10, 10]);

    let (assignments, info) = coordinator.get_assignments(&state, 1, 2).unwrap();
    assert_eq!(info.total_chunks, 8);
    for assignment in assignments.values() {
        assert_eq!(assignment.num_chunks, 2);
    }
}

#[test]
fn assignment_is_deterministic_in_operator_order() {
    let coordinator = StdAssignmentCoordinator;
    let state = state_with_stakes(0, &[7, 11, 13, 17, 19]);

    let first = coordinator.get_assignments(&state, 0, 3).unwrap();
    let second = coordinator.get_assignments(&state, 0, 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stake_weight_orders_chunk_counts() {
    let coordinator = StdAssignmentCoordinator;
    let state = state_with_stakes(0, &[900, 50, 50]);

    let (assignments, _) = coordinator.get_assignments(&state, 0, 10).unwrap();
    let heavy = assignments[&operator_id(0)].num_chunks;
    let light = assignments[&operator_id(1)].num_chunks;
    assert!(heavy > light);
}

#[test]
fn unknown_quorum_is_rejected() {
    let coordinator = StdAssignmentCoordinator;
    let state = state_with_stakes(0, &[1]);
    assert_eq!(
        coordinator.get_assignments(&state, 9, 1),
        Err(AssignmentError::QuorumNotFound(9))
    );
}

#[test]
fn minimum_chunk_length_is_a_power_of_two() {
    let coordinator = StdAssignmentCoordinator;
    for blob_length in [1u64, 10, 100, 1000, 4096] {
        let chunk_length = coordinator
            .get_minimum_chunk_length(8, blob_length, 2, 80, 40)
            .unwrap();
        assert!(chunk_length.is_power_of_two(), "blob_length {blob_length}");
        assert!(chunk_length >= 1);
    }
}

#[test]
fn tighter_threshold_gap_needs_longer_chunks() {
    let coordinator = StdAssignmentCoordinator;
    let wide_gap = coordinator
        .get_minimum_chunk_length(8, 1024, 1, 90, 30)
        .unwrap();
    let narrow_gap = coordinator
        .get_minimum_chunk_length(8, 1024, 1, 60, 50)
        .unwrap();
    assert!(narrow_gap > wide_gap);
}

#[test]
fn inverted_thresholds_are_rejected() {
    let coordinator = StdAssignmentCoordinator;
    assert_eq!(
        coordinator.get_minimum_chunk_length(8, 1024, 1, 40, 50),
        Err(AssignmentError::InvalidThresholds {
            quorum_threshold: 40,
            adversary_threshold: 50
        })
    );
}
