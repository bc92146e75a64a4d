//! Rotation Ordering Invariant Tests
//!
//! The engine's contract: within a shift, active members always occupy
//! positions 0..N exactly once, whatever sequence of events hits the
//! rotation. These tests drive mixed operation sequences and check density
//! after every step.

use chrono::NaiveDate;
use holdline::roster::{Firefighter, Shift};
use holdline::rotation::{self, RotationError};
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

fn roster(n: usize) -> Vec<Firefighter> {
    (0..n)
        .map(|i| Firefighter::new(format!("Member {}", i), Shift::A, i as u32))
        .collect()
}

fn assert_dense(list: &[Firefighter]) {
    let mut positions: Vec<u32> = list.iter().map(|ff| ff.order_position).collect();
    positions.sort_unstable();
    let expected: Vec<u32> = (0..list.len() as u32).collect();
    assert_eq!(
        positions, expected,
        "positions must be exactly 0..{} once each",
        list.len()
    );
    // Array order and position order agree.
    for (i, ff) in list.iter().enumerate() {
        assert_eq!(ff.order_position, i as u32);
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
}

// =============================================================================
// Density Under Mixed Sequences
// =============================================================================

/// Density holds across completes, skips, deactivations, reactivations,
/// transfers in, and manual reorders.
#[test]
fn test_density_survives_mixed_operation_sequence() {
    let mut list = roster(6);
    assert_dense(&list);

    // Hold completed by the head, default to bottom.
    let head = list[0].id;
    list = rotation::complete_hold(&list, head, list.len() - 1, date(1)).unwrap();
    assert_dense(&list);

    // Voluntary skip from the middle.
    let mid = list[2].id;
    list = rotation::move_to_bottom(&list, mid).unwrap();
    assert_dense(&list);

    // Deactivate position 1.
    let (parked, rest) = rotation::deactivate(&list, list[1].id).unwrap();
    list = rest;
    assert_dense(&list);

    // A transfer arrives from another shift.
    let incoming = Firefighter::new("Transfer In", Shift::B, 4);
    list = rotation::transfer_in(&list, incoming, Shift::A);
    assert_dense(&list);

    // Manual reorder: reverse the whole rotation.
    let reversed: Vec<Uuid> = list.iter().rev().map(|ff| ff.id).collect();
    list = rotation::reorder(&list, &reversed).unwrap();
    assert_dense(&list);

    // The parked member returns.
    list = rotation::reactivate(&list, parked);
    assert_dense(&list);
    assert_eq!(list.len(), 7);
}

/// Completing holds with explicit targets at every slot keeps density.
#[test]
fn test_density_survives_every_target_position() {
    for target in 0..5 {
        let list = roster(5);
        let moved = list[2].id;
        let result = rotation::complete_hold(&list, moved, target, date(2)).unwrap();
        assert_dense(&result);
        assert_eq!(result[target].id, moved);
    }
}

// =============================================================================
// Round-Robin Fairness Properties
// =============================================================================

/// A full cycle of voluntary skips returns every member to their original
/// slot.
#[test]
fn test_move_to_bottom_full_cycle_is_identity() {
    let original = roster(7);
    let mut list = original.clone();

    for _ in 0..original.len() {
        let head = list[0].id;
        list = rotation::move_to_bottom(&list, head).unwrap();
        assert_dense(&list);
    }

    let original_ids: Vec<Uuid> = original.iter().map(|ff| ff.id).collect();
    let cycled_ids: Vec<Uuid> = list.iter().map(|ff| ff.id).collect();
    assert_eq!(cycled_ids, original_ids);
}

/// A full round of completed holds also cycles back to the original order,
/// with every member stamped.
#[test]
fn test_complete_hold_round_trip_stamps_everyone() {
    let original = roster(4);
    let mut list = original.clone();

    for day in 1..=original.len() as u32 {
        let head = list[0].id;
        list = rotation::complete_hold(&list, head, list.len() - 1, date(day)).unwrap();
        assert_dense(&list);
    }

    let original_ids: Vec<Uuid> = original.iter().map(|ff| ff.id).collect();
    let cycled_ids: Vec<Uuid> = list.iter().map(|ff| ff.id).collect();
    assert_eq!(cycled_ids, original_ids);
    assert!(list.iter().all(|ff| ff.last_hold_date.is_some()));
}

// =============================================================================
// Policy Properties
// =============================================================================

/// Reactivation always front-inserts, regardless of how many members have
/// come and gone since the deactivation.
#[test]
fn test_reactivate_always_front_even_after_churn() {
    let list = roster(5);
    let (parked, mut rest) = rotation::deactivate(&list, list[3].id).unwrap();

    // Churn while they are away.
    let head = rest[0].id;
    rest = rotation::complete_hold(&rest, head, rest.len() - 1, date(9)).unwrap();
    rest = rotation::move_to_bottom(&rest, rest[1].id).unwrap();

    let returned = rotation::reactivate(&rest, parked.clone());
    assert_dense(&returned);
    assert_eq!(returned[0].id, parked.id);
}

/// Transfers always land last and arrive with no hold history.
#[test]
fn test_transfer_lands_last_with_cleared_history() {
    for dest_size in 0..4 {
        let dest = roster(dest_size);
        let mut incoming = Firefighter::new("Mutual Aid", Shift::C, 0);
        incoming.last_hold_date = Some(date(20));

        let result = rotation::transfer_in(&dest, incoming.clone(), Shift::A);
        assert_dense(&result);
        assert_eq!(result.last().unwrap().id, incoming.id);
        assert_eq!(result.last().unwrap().order_position, dest_size as u32);
        assert!(result.last().unwrap().last_hold_date.is_none());
    }
}

// =============================================================================
// Failure Signaling
// =============================================================================

/// Unknown ids fail loudly on every operation and leave the input alone.
#[test]
fn test_not_found_on_every_operation() {
    let list = roster(3);
    let ghost = Uuid::new_v4();

    assert_eq!(
        rotation::complete_hold(&list, ghost, 2, date(1)).unwrap_err(),
        RotationError::NotFound(ghost)
    );
    assert_eq!(
        rotation::move_to_bottom(&list, ghost).unwrap_err(),
        RotationError::NotFound(ghost)
    );
    assert_eq!(
        rotation::deactivate(&list, ghost).unwrap_err(),
        RotationError::NotFound(ghost)
    );
    assert_eq!(
        rotation::remove(&list, ghost).unwrap_err(),
        RotationError::NotFound(ghost)
    );

    // Input snapshot untouched.
    assert_dense(&list);
}

/// Out-of-range targets are rejected before any mutation.
#[test]
fn test_invalid_position_is_rejected() {
    let list = roster(4);
    let id = list[0].id;

    let err = rotation::complete_hold(&list, id, 4, date(1)).unwrap_err();
    assert_eq!(err, RotationError::InvalidPosition { position: 4, len: 4 });
    assert_dense(&list);
}
