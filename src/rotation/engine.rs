//! Pure ordering functions over roster snapshots.
//!
//! All functions take the active members of a single shift, ordered by
//! `order_position`, and return a new list whose positions are dense and
//! zero-based. One remove/reinsert primitive ([`remove`] + insertion)
//! underlies hold completion and voluntary skips, so the two paths can never
//! drift apart.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::roster::{Firefighter, Shift};

use super::errors::{RotationError, RotationResult};

/// Renumbers `order_position` to match array order: `position[i] = i`.
///
/// The final normalization step after every structural change. The input
/// order is trusted to already be the desired rotation order.
pub fn assign_positions(list: &[Firefighter]) -> Vec<Firefighter> {
    list.iter()
        .enumerate()
        .map(|(i, ff)| {
            let mut ff = ff.clone();
            ff.order_position = i as u32;
            ff
        })
        .collect()
}

/// Removes the member with `id`, closing the gap left behind.
///
/// Returns the removed member (position left stale) and the re-densified
/// remainder. This is the canonical primitive: deactivation, hold
/// completion, voluntary skips, and the source side of a transfer all go
/// through it.
pub fn remove(list: &[Firefighter], id: Uuid) -> RotationResult<(Firefighter, Vec<Firefighter>)> {
    let index = index_of(list, id)?;
    let mut rest: Vec<Firefighter> = list.to_vec();
    let member = rest.remove(index);
    Ok((member, assign_positions(&rest)))
}

/// Reinserts `member` at `index` and re-densifies.
fn insert_at(mut list: Vec<Firefighter>, member: Firefighter, index: usize) -> Vec<Firefighter> {
    let index = index.min(list.len());
    list.insert(index, member);
    assign_positions(&list)
}

/// Completes a hold: the member moves to `target` (0-indexed slot in the
/// resulting list) and their `last_hold_date` is stamped.
///
/// Callers present positions 1-indexed and usually default to the bottom of
/// the list, the fair round-robin outcome; an explicit target lets a shift
/// commander handle exceptions such as an immediate repeat hold.
pub fn complete_hold(
    list: &[Firefighter],
    id: Uuid,
    target: usize,
    hold_date: NaiveDate,
) -> RotationResult<Vec<Firefighter>> {
    if target >= list.len() {
        return Err(RotationError::InvalidPosition {
            position: target,
            len: list.len(),
        });
    }
    let (mut member, rest) = remove(list, id)?;
    member.last_hold_date = Some(hold_date);
    Ok(insert_at(rest, member, target))
}

/// Sends the member to the end of the rotation without recording a hold.
///
/// Used when someone passes on a hold voluntarily: they give up their spot
/// but `last_hold_date` stays untouched because no hold was served.
pub fn move_to_bottom(list: &[Firefighter], id: Uuid) -> RotationResult<Vec<Firefighter>> {
    let (member, rest) = remove(list, id)?;
    let end = rest.len();
    Ok(insert_at(rest, member, end))
}

/// Takes the member out of the position-bearing set and marks them inactive.
///
/// Returns the deactivated member alongside the re-densified remainder;
/// reversible via [`reactivate`].
pub fn deactivate(
    list: &[Firefighter],
    id: Uuid,
) -> RotationResult<(Firefighter, Vec<Firefighter>)> {
    let (mut member, rest) = remove(list, id)?;
    member.is_active = false;
    Ok((member, rest))
}

/// Reinserts a previously-deactivated member at the front of the rotation.
///
/// Returning members come back at position 0, not the tail: they never held
/// the slot they vacated, so they are next up.
pub fn reactivate(list: &[Firefighter], mut member: Firefighter) -> Vec<Firefighter> {
    member.is_active = true;
    member.is_available = true;
    insert_at(list.to_vec(), member, 0)
}

/// Appends a member arriving from another shift at the end of `dest`.
///
/// Hold history carries no fairness weight across shifts, so
/// `last_hold_date` is cleared. The source shift's list is re-densified
/// separately via [`remove`].
pub fn transfer_in(dest: &[Firefighter], mut member: Firefighter, shift: Shift) -> Vec<Firefighter> {
    member.shift = shift;
    member.last_hold_date = None;
    let end = dest.len();
    insert_at(dest.to_vec(), member, end)
}

/// Applies an explicit caller-supplied ordering (drag-and-drop).
///
/// The ordering is trusted completely; manual override is an explicit
/// admin capability. `ids` must name every member exactly once; an unknown
/// or duplicated id, or one left out, signals `NotFound`.
pub fn reorder(list: &[Firefighter], ids: &[Uuid]) -> RotationResult<Vec<Firefighter>> {
    let mut remaining: Vec<Firefighter> = list.to_vec();
    let mut ordered = Vec::with_capacity(list.len());

    for &id in ids {
        match remaining.iter().position(|ff| ff.id == id) {
            Some(index) => ordered.push(remaining.remove(index)),
            None => return Err(RotationError::NotFound(id)),
        }
    }

    if let Some(left_out) = remaining
        .iter()
        .min_by_key(|ff| ff.order_position)
    {
        return Err(RotationError::NotFound(left_out.id));
    }

    Ok(assign_positions(&ordered))
}

/// The next member up for a hold: lowest position among the available.
pub fn next_up(list: &[Firefighter]) -> Option<&Firefighter> {
    list.iter()
        .filter(|ff| ff.is_available)
        .min_by_key(|ff| ff.order_position)
}

/// Presentation order: available members by position, then unavailable ones.
pub fn sort_rotation(list: &[Firefighter]) -> Vec<Firefighter> {
    let mut sorted: Vec<Firefighter> = list.to_vec();
    sorted.sort_by_key(|ff| (!ff.is_available, ff.order_position));
    sorted
}

fn index_of(list: &[Firefighter], id: Uuid) -> RotationResult<usize> {
    list.iter()
        .position(|ff| ff.id == id)
        .ok_or(RotationError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Firefighter> {
        (0..n)
            .map(|i| Firefighter::new(format!("FF{}", i), Shift::A, i as u32))
            .collect()
    }

    fn ids(list: &[Firefighter]) -> Vec<Uuid> {
        list.iter().map(|ff| ff.id).collect()
    }

    fn assert_dense(list: &[Firefighter]) {
        for (i, ff) in list.iter().enumerate() {
            assert_eq!(
                ff.order_position, i as u32,
                "position {} held by {} breaks density",
                i, ff.name
            );
        }
    }

    #[test]
    fn test_assign_positions_renumbers_in_array_order() {
        let mut list = roster(4);
        list.reverse();
        let result = assign_positions(&list);
        assert_dense(&result);
        assert_eq!(result[0].name, "FF3");
    }

    #[test]
    fn test_complete_hold_defaults_to_bottom() {
        let list = roster(5);
        let first = list[0].id;
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let result = complete_hold(&list, first, list.len() - 1, date).unwrap();

        assert_dense(&result);
        assert_eq!(result[4].id, first);
        assert_eq!(result[4].last_hold_date, Some(date));
        // Everyone previously at 1..=4 shifted up one.
        for (i, original) in list.iter().skip(1).enumerate() {
            assert_eq!(result[i].id, original.id);
        }
    }

    #[test]
    fn test_complete_hold_with_explicit_target() {
        let list = roster(5);
        let moved = list[2].id;
        let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

        let result = complete_hold(&list, moved, 1, date).unwrap();

        assert_dense(&result);
        let expected: Vec<Uuid> = vec![
            list[0].id, moved, list[1].id, list[3].id, list[4].id,
        ];
        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn test_complete_hold_rejects_out_of_range_target() {
        let list = roster(3);
        let id = list[0].id;
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let err = complete_hold(&list, id, 3, date).unwrap_err();
        assert_eq!(err, RotationError::InvalidPosition { position: 3, len: 3 });
    }

    #[test]
    fn test_complete_hold_unknown_id_leaves_no_output() {
        let list = roster(4);
        let ghost = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let err = complete_hold(&list, ghost, 3, date).unwrap_err();
        assert_eq!(err, RotationError::NotFound(ghost));
        // The input snapshot is untouched by construction (pure function),
        // but assert the original ordering anyway.
        assert_dense(&list);
    }

    #[test]
    fn test_move_to_bottom_keeps_last_hold_date() {
        let mut list = roster(4);
        let date = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        list[0].last_hold_date = Some(date);
        let skipped = list[0].id;

        let result = move_to_bottom(&list, skipped).unwrap();

        assert_dense(&result);
        assert_eq!(result[3].id, skipped);
        assert_eq!(result[3].last_hold_date, Some(date));
    }

    #[test]
    fn test_move_to_bottom_full_cycle_restores_order() {
        let original = roster(5);
        let mut list = original.clone();

        for _ in 0..original.len() {
            let head = list[0].id;
            list = move_to_bottom(&list, head).unwrap();
            assert_dense(&list);
        }

        assert_eq!(ids(&list), ids(&original));
    }

    #[test]
    fn test_deactivate_re_densifies_remainder() {
        let list = roster(5);
        let gone = list[2].id;

        let (member, rest) = deactivate(&list, gone).unwrap();

        assert!(!member.is_active);
        assert_eq!(rest.len(), 4);
        assert_dense(&rest);
        assert!(rest.iter().all(|ff| ff.id != gone));
    }

    #[test]
    fn test_reactivate_always_lands_at_front() {
        let list = roster(4);
        let (returning, rest) = deactivate(&list, list[1].id).unwrap();

        let result = reactivate(&rest, returning.clone());

        assert_dense(&result);
        assert_eq!(result[0].id, returning.id);
        assert!(result[0].is_active);
        assert!(result[0].is_available);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_transfer_in_appends_and_clears_history() {
        let dest = roster(3);
        let mut incoming = Firefighter::new("Transfer", Shift::B, 0);
        incoming.last_hold_date = NaiveDate::from_ymd_opt(2024, 12, 25);

        let result = transfer_in(&dest, incoming.clone(), Shift::A);

        assert_dense(&result);
        let landed = &result[3];
        assert_eq!(landed.id, incoming.id);
        assert_eq!(landed.shift, Shift::A);
        assert_eq!(landed.order_position, 3);
        assert!(landed.last_hold_date.is_none());
    }

    #[test]
    fn test_reorder_trusts_caller_ordering() {
        let list = roster(3);
        let new_order = vec![list[1].id, list[0].id, list[2].id];

        let result = reorder(&list, &new_order).unwrap();

        assert_dense(&result);
        assert_eq!(ids(&result), new_order);
    }

    #[test]
    fn test_reorder_rejects_unknown_and_missing_ids() {
        let list = roster(3);
        let ghost = Uuid::new_v4();

        let unknown = vec![list[0].id, ghost, list[2].id];
        assert_eq!(
            reorder(&list, &unknown).unwrap_err(),
            RotationError::NotFound(ghost)
        );

        let short = vec![list[0].id, list[1].id];
        assert_eq!(
            reorder(&list, &short).unwrap_err(),
            RotationError::NotFound(list[2].id)
        );

        let duplicated = vec![list[0].id, list[0].id, list[1].id];
        assert_eq!(
            reorder(&list, &duplicated).unwrap_err(),
            RotationError::NotFound(list[0].id)
        );
    }

    #[test]
    fn test_next_up_skips_unavailable() {
        let mut list = roster(3);
        list[0].is_available = false;

        let next = next_up(&list).unwrap();
        assert_eq!(next.id, list[1].id);
    }

    #[test]
    fn test_next_up_empty_when_nobody_available() {
        let mut list = roster(2);
        for ff in &mut list {
            ff.is_available = false;
        }
        assert!(next_up(&list).is_none());
    }

    #[test]
    fn test_sort_rotation_puts_unavailable_last() {
        let mut list = roster(4);
        list[0].is_available = false;

        let sorted = sort_rotation(&list);

        assert_eq!(sorted[3].id, list[0].id);
        assert!(sorted[0].is_available);
    }
}
