//! Tests for Table iteration
//!
//! These tests verify:
//! - Forward iteration over the live range in ascending order
//! - Range slices clamp to the live range
//! - Iterators capture the end index at creation

#[path = "../common/mod.rs"]
mod common;

use common::*;

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iter_empty_table() {
    let (_temp, _path, table) = setup_temp_table();

    assert_eq!(table.iter().next(), None);
    assert_eq!(table.iter().len(), 0);
}

#[test]
fn test_iter_yields_sorted_records() {
    let (_temp, _path, table) = setup_table_with_ids([8, 2, 6, 4]);

    let records: Vec<_> = table.iter().collect();

    assert_eq!(records, vec![row(2), row(4), row(6), row(8)]);
}

#[test]
fn test_iter_is_exact_size() {
    let (_temp, _path, table) = setup_table_with_ids(0..10);
    let mut iter = table.iter();

    assert_eq!(iter.len(), 10);
    iter.next();
    iter.next();
    assert_eq!(iter.len(), 8);
    assert_eq!(iter.size_hint(), (8, Some(8)));
}

#[test]
fn test_iter_new_iterator_starts_over() {
    let (_temp, _path, table) = setup_table_with_ids(0..5);

    let mut first = table.iter();
    first.next();
    first.next();

    assert_eq!(table.iter().next(), Some(row(0)));
    assert_eq!(first.next(), Some(row(2)));
}

#[test]
fn test_for_loop_over_table_reference() {
    let (_temp, _path, table) = setup_table_with_ids(1..=4);
    let mut sum = 0;

    for record in &table {
        sum += record.row_id;
    }

    assert_eq!(sum, 10);
}

#[test]
fn test_iter_reflects_current_count() {
    let (_temp, _path, mut table) = setup_table_with_ids(0..5);
    assert_eq!(table.iter().count(), 5);

    table.delete_at(0);
    table.append_all(&[row(10), row(11)]).unwrap();

    assert_eq!(table.iter().count(), 6);
}

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn test_range_within_live_records() {
    let (_temp, _path, table) = setup_table_with_ids(0..10);

    let slice: Vec<i64> = table.range(3..6).map(|r| r.row_id).collect();

    assert_eq!(slice, vec![3, 4, 5]);
}

#[test]
fn test_range_clamps_to_count() {
    let (_temp, _path, table) = setup_table_with_ids(0..10);

    let slice: Vec<i64> = table.range(8..100).map(|r| r.row_id).collect();

    assert_eq!(slice, vec![8, 9]);
    assert_eq!(table.range(50..60).count(), 0);
}

#[test]
#[allow(clippy::reversed_empty_ranges)]
fn test_range_empty_when_reversed() {
    let (_temp, _path, table) = setup_table_with_ids(0..10);

    assert_eq!(table.range(6..3).count(), 0);
}

#[test]
fn test_to_vec_matches_get() {
    let (_temp, _path, table) = setup_table_with_ids([5, 1, 3]);

    let all = table.to_vec();

    for (i, record) in all.iter().enumerate() {
        assert_eq!(table.get(i), Some(*record));
    }
    assert_eq!(table.get(all.len()), None);
}
