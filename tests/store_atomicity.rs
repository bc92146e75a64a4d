//! Store Integrity Tests
//!
//! - Snapshot replaces are atomic: no temp residue, full-body checksums.
//! - Corruption is an explicit failure, never an empty read.
//! - Roster replaces are version-guarded: stale writers lose.
//! - The activity log is append-only and survives torn tails.

use holdline::roster::{ActivityEntry, Firefighter, Shift};
use holdline::store::{RosterSnapshot, Store, StoreError};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn members(shift: Shift, names: &[&str]) -> Vec<Firefighter> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Firefighter::new(*name, shift, i as u32))
        .collect()
}

// =============================================================================
// Atomic Replace
// =============================================================================

#[test]
fn test_replace_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();

    store
        .roster()
        .replace(Shift::A, 0, members(Shift::A, &["One", "Two"]))
        .unwrap();

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
        .collect();
    assert!(leftovers.is_empty(), "temp files must not survive a replace");
}

#[test]
fn test_replace_swaps_the_entire_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();

    store
        .roster()
        .replace(Shift::A, 0, members(Shift::A, &["Old1", "Old2", "Old3"]))
        .unwrap();
    store
        .roster()
        .replace(Shift::A, 1, members(Shift::A, &["New1"]))
        .unwrap();

    let snapshot = store.roster().load(Shift::A).unwrap();
    assert_eq!(snapshot.version, 2);
    assert_eq!(snapshot.members.len(), 1);
    assert_eq!(snapshot.members[0].name, "New1");
}

// =============================================================================
// Corruption Detection
// =============================================================================

#[test]
fn test_corrupted_roster_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();
    store
        .roster()
        .replace(Shift::B, 0, members(Shift::B, &["One"]))
        .unwrap();

    // Flip a byte in the JSON body.
    let path = dir.path().join("roster_b.json");
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = store.roster().load(Shift::B).unwrap_err();
    assert!(
        matches!(err, StoreError::Corrupt { .. }),
        "corruption must surface as Corrupt, got: {}",
        err
    );
}

#[test]
fn test_truncated_header_is_malformed_not_empty() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();

    let path = dir.path().join("roster_c.json");
    fs::write(&path, b"no checksum header here").unwrap();

    let err = store.roster().load(Shift::C).unwrap_err();
    assert!(matches!(err, StoreError::Malformed { .. }));
}

// =============================================================================
// Version Guarding
// =============================================================================

#[test]
fn test_concurrent_writers_cannot_both_win() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();

    // Two writers read version 0.
    let base: RosterSnapshot = store.roster().load(Shift::A).unwrap();
    assert_eq!(base.version, 0);

    // First writer wins.
    store
        .roster()
        .replace(Shift::A, base.version, members(Shift::A, &["Winner"]))
        .unwrap();

    // Second writer is stale and must be rejected, leaving the winner's
    // write intact.
    let err = store
        .roster()
        .replace(Shift::A, base.version, members(Shift::A, &["Loser"]))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            shift: Shift::A,
            expected: 0,
            found: 1,
        }
    ));

    let snapshot = store.roster().load(Shift::A).unwrap();
    assert_eq!(snapshot.members[0].name, "Winner");
}

#[test]
fn test_versions_are_per_shift() {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path()).unwrap();

    store
        .roster()
        .replace(Shift::A, 0, members(Shift::A, &["A1"]))
        .unwrap();

    // Shift B still accepts version 0 writes.
    store
        .roster()
        .replace(Shift::B, 0, members(Shift::B, &["B1"]))
        .unwrap();
}

// =============================================================================
// Activity Log
// =============================================================================

#[test]
fn test_activity_log_is_append_only_across_reopens() {
    let dir = TempDir::new().unwrap();

    {
        let store = Store::init(dir.path()).unwrap();
        store
            .activity()
            .append(&ActivityEntry::new("added", "First", Some(Shift::A)))
            .unwrap();
    }

    // Reopen and keep appending; earlier entries survive.
    let store = Store::open(dir.path()).unwrap();
    store
        .activity()
        .append(&ActivityEntry::new("removed", "Second", Some(Shift::A)))
        .unwrap();

    let entries = store.activity().recent(None, 10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].description, "Second");
    assert_eq!(entries[1].description, "First");
}
