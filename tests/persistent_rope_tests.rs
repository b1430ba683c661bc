//! Unit tests for PersistentRope.
//!
//! This module exercises the public rope API: construction, insertion,
//! removal, slicing, copying and rebalancing, including the persistence of
//! every version an edit was derived from.

use persistent_rope::error::RopeError;
use persistent_rope::persistent::PersistentRope;
use persistent_rope::settings::RopeSettings;
use rstest::{fixture, rstest};
use std::collections::HashSet;

#[fixture]
fn settings() -> RopeSettings {
    RopeSettings::new(4, 2, 1.001).unwrap()
}

#[fixture]
fn eight(settings: RopeSettings) -> PersistentRope<i32> {
    PersistentRope::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7], settings)
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_new_creates_empty_rope() {
    let rope: PersistentRope<i32> = PersistentRope::new();
    assert!(rope.is_empty());
    assert_eq!(rope.len(), 0);
    assert_eq!(rope.depth(), 1);
    assert_eq!(rope.settings(), &RopeSettings::DEFAULT);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(4)]
fn test_short_sequence_is_single_leaf(settings: RopeSettings, #[case] length: i32) {
    let rope = PersistentRope::from_vec((0..length).collect(), settings);
    assert_eq!(rope.depth(), 1);
    assert_eq!(rope.chunks().count(), usize::from(length > 0));
}

#[rstest]
fn test_long_sequence_is_split(settings: RopeSettings) {
    let rope = PersistentRope::from_vec((0..5).collect(), settings);
    assert_eq!(rope.depth(), 2);
    let chunks: Vec<&[i32]> = rope.chunks().collect();
    assert_eq!(chunks, vec![&[0, 1][..], &[2, 3, 4][..]]);
}

#[rstest]
fn test_from_slice_matches_from_vec(settings: RopeSettings) {
    let elements: Vec<String> = ["a", "b", "c", "d", "e", "f"].map(String::from).to_vec();
    let from_slice = PersistentRope::from_slice(&elements, settings);
    let from_vec = PersistentRope::from_vec(elements.clone(), settings);
    assert_eq!(from_slice, from_vec);
    assert_eq!(from_slice.to_vec(), elements);
}

#[rstest]
fn test_collect_uses_default_settings() {
    let rope: PersistentRope<i32> = (0..1000).collect();
    assert_eq!(rope.settings(), &RopeSettings::default());
    assert_eq!(rope.len(), 1000);
    assert!(rope.chunks().all(|chunk| chunk.len() <= 400));
}

// =============================================================================
// Insert
// =============================================================================

#[rstest]
fn test_insert_splices_sequence(eight: PersistentRope<i32>) {
    let inserted = eight.insert(2, &[-1, -2, -3]);

    assert_eq!(inserted.to_vec(), vec![0, 1, -1, -2, -3, 2, 3, 4, 5, 6, 7]);
    assert_eq!(eight.to_vec(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[rstest]
#[case(0, vec![9, 0, 1, 2, 3, 4, 5, 6, 7])]
#[case(4, vec![0, 1, 2, 3, 9, 4, 5, 6, 7])]
#[case(8, vec![0, 1, 2, 3, 4, 5, 6, 7, 9])]
fn test_insert_at_edges(
    eight: PersistentRope<i32>,
    #[case] index: usize,
    #[case] expected: Vec<i32>,
) {
    assert_eq!(eight.insert(index, &[9]).to_vec(), expected);
}

#[rstest]
fn test_insert_into_empty_rope(settings: RopeSettings) {
    let rope = PersistentRope::with_settings(settings);
    let inserted = rope.insert(0, &[1, 2, 3, 4, 5, 6]);
    assert_eq!(inserted.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    assert!(rope.is_empty());
}

#[rstest]
fn test_try_insert_out_of_bounds(eight: PersistentRope<i32>) {
    assert_eq!(
        eight.try_insert(9, &[1]),
        Err(RopeError::IndexOutOfBounds {
            index: 9,
            length: 8
        })
    );
}

#[rstest]
#[should_panic(expected = "index 9 is out of bounds for a rope of length 8")]
fn test_insert_out_of_bounds_panics(eight: PersistentRope<i32>) {
    let _ = eight.insert(9, &[1]);
}

// =============================================================================
// Remove
// =============================================================================

#[rstest]
fn test_remove_excises_range(eight: PersistentRope<i32>) {
    let removed = eight.remove(1..6);

    assert_eq!(removed.to_vec(), vec![0, 6, 7]);
    assert_eq!(eight.to_vec(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(8)]
fn test_remove_empty_range_is_identity(eight: PersistentRope<i32>, #[case] position: usize) {
    let removed = eight.remove(position..position);
    assert_eq!(removed, eight);
    assert_eq!(removed.depth(), eight.depth());
}

#[rstest]
fn test_remove_everything(eight: PersistentRope<i32>) {
    let removed = eight.remove(..);
    assert!(removed.is_empty());
    assert_eq!(removed.depth(), 1);
}

#[rstest]
fn test_remove_inclusive_range(eight: PersistentRope<i32>) {
    assert_eq!(eight.remove(2..=5).to_vec(), vec![0, 1, 6, 7]);
}

#[rstest]
#[case(3..9, RopeError::RangeOutOfBounds { start: 3, end: 9, length: 8 })]
#[case(5..2, RopeError::InvertedRange { start: 5, end: 2 })]
fn test_try_remove_invalid_range(
    eight: PersistentRope<i32>,
    #[case] range: std::ops::Range<usize>,
    #[case] expected: RopeError,
) {
    assert_eq!(eight.try_remove(range), Err(expected));
}

#[rstest]
#[should_panic(expected = "PersistentRope::remove")]
fn test_remove_out_of_bounds_panics(eight: PersistentRope<i32>) {
    let _ = eight.remove(0..20);
}

// =============================================================================
// Read Access
// =============================================================================

#[rstest]
fn test_slice_matches_value(settings: RopeSettings) {
    let elements: Vec<i32> = (0..37).collect();
    let rope = PersistentRope::from_vec(elements, settings).insert(10, &[100, 101]);
    let value = rope.to_vec();

    for start in 0..value.len() {
        for end in start..=value.len() {
            assert_eq!(rope.slice(start..end), value[start..end]);
        }
    }
}

#[rstest]
fn test_try_slice_out_of_bounds(eight: PersistentRope<i32>) {
    assert!(matches!(
        eight.try_slice(4..12),
        Err(RopeError::RangeOutOfBounds { .. })
    ));
}

#[rstest]
fn test_copy_to_exact_buffer(eight: PersistentRope<i32>) {
    let mut destination = [0; 8];
    eight.copy_to(&mut destination);
    assert_eq!(destination, [0, 1, 2, 3, 4, 5, 6, 7]);
}

#[rstest]
fn test_copy_range_to_writes_prefix(eight: PersistentRope<i32>) {
    let mut destination = [-1; 6];
    eight.copy_range_to(&mut destination, 2..6);
    assert_eq!(destination, [2, 3, 4, 5, -1, -1]);
}

#[rstest]
fn test_try_copy_range_to_short_destination(eight: PersistentRope<i32>) {
    let mut destination = [-1; 3];
    assert_eq!(
        eight.try_copy_range_to(&mut destination, 2..6),
        Err(RopeError::DestinationTooShort {
            required: 4,
            actual: 3
        })
    );
    assert_eq!(destination, [-1; 3]);
}

#[rstest]
#[should_panic(expected = "destination holds 2 elements but 8 are required")]
fn test_copy_to_short_destination_panics(eight: PersistentRope<i32>) {
    let mut destination = [0; 2];
    eight.copy_to(&mut destination);
}

#[rstest]
fn test_get_and_iter(settings: RopeSettings) {
    let rope = PersistentRope::from_vec((0..50).collect(), settings).remove(10..20);
    assert_eq!(rope.get(9), Some(&9));
    assert_eq!(rope.get(10), Some(&20));
    assert_eq!(rope.get(40), None);

    let iterator = rope.iter();
    assert_eq!(iterator.len(), 40);
    assert!(rope.iter().copied().eq((0..10).chain(20..50)));
}

#[rstest]
fn test_owned_iteration(eight: PersistentRope<i32>) {
    let reversed: Vec<i32> = eight.clone().into_iter().rev().collect();
    assert_eq!(reversed, vec![7, 6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(eight.len(), 8);
}

// =============================================================================
// Append
// =============================================================================

#[rstest]
fn test_append_concatenates(settings: RopeSettings) {
    let front = PersistentRope::from_vec((0..10).collect(), settings);
    let back = PersistentRope::from_vec((10..25).collect(), settings);
    let whole = front.append(&back);

    assert_eq!(whole.to_vec(), (0..25).collect::<Vec<_>>());
    assert_eq!(front.len(), 10);
    assert_eq!(back.len(), 15);
}

#[rstest]
fn test_append_empty_sides(eight: PersistentRope<i32>, settings: RopeSettings) {
    let empty = PersistentRope::with_settings(settings);
    assert_eq!(eight.append(&empty), eight);
    assert_eq!(empty.append(&eight), eight);
}

#[rstest]
fn test_append_tiny_ropes_joins(settings: RopeSettings) {
    let joined = PersistentRope::from_vec(vec![1], settings)
        .append(&PersistentRope::from_vec(Vec::new(), settings))
        .append(&PersistentRope::from_vec(vec![2], settings));
    assert_eq!(joined.to_vec(), vec![1, 2]);
}

// =============================================================================
// Rebalance
// =============================================================================

fn prepend_repeatedly(settings: RopeSettings, count: usize) -> PersistentRope<i32> {
    let mut rope = PersistentRope::with_settings(settings);
    for _ in 0..count {
        rope = rope.insert(0, &[0, 1, 2, 3, 4, 5, 6, 7]);
    }
    rope
}

#[rstest]
fn test_rebalance_rebuilt_rope_bounds_depth(settings: RopeSettings) {
    const COUNT: usize = 1000;
    let original: PersistentRope<i32> = PersistentRope::with_settings(settings);
    let skewed = prepend_repeatedly(settings, COUNT);

    assert!(skewed.depth() >= 10, "max depth too low: {}", skewed.depth());

    let mut balanced = PersistentRope::from_vec(skewed.to_vec(), settings);
    balanced.rebalance();

    let bound = ((COUNT * 8) as f64).log2() as usize;
    assert!(
        balanced.depth() <= bound,
        "rebalance did not bound depth: {}",
        balanced.depth()
    );
    assert!(original.is_empty());
    assert_eq!(balanced, skewed);
}

#[rstest]
fn test_rebalance_skewed_rope_directly(settings: RopeSettings) {
    let skewed = prepend_repeatedly(settings, 1000);
    let mut rebalanced = skewed.clone();
    rebalanced.rebalance();

    assert!(rebalanced.depth() <= 12);
    assert!(skewed.depth() > rebalanced.depth());
    assert_eq!(rebalanced.to_vec(), skewed.to_vec());
}

#[rstest]
fn test_rebalance_does_not_affect_derived_ropes(settings: RopeSettings) {
    let base = prepend_repeatedly(settings, 100);
    let derived = base.insert(400, &[-1]);
    let derived_depth = derived.depth();

    let mut handle = base.clone();
    handle.rebalance();

    assert_eq!(derived.depth(), derived_depth);
    assert_eq!(derived.get(400), Some(&-1));
    assert_eq!(derived.len(), 801);
    assert_eq!(handle, base);
}

#[rstest]
fn test_rebalanced_leaves_original(settings: RopeSettings) {
    let skewed = prepend_repeatedly(settings, 100);
    let depth = skewed.depth();
    let rebalanced = skewed.rebalanced();

    assert_eq!(skewed.depth(), depth);
    assert!(rebalanced.depth() < depth);
    assert_eq!(rebalanced, skewed);
}

#[rstest]
fn test_rebalance_leaf_is_noop(settings: RopeSettings) {
    let mut rope = PersistentRope::from_vec(vec![1, 2, 3], settings);
    rope.rebalance();
    assert_eq!(rope.to_vec(), vec![1, 2, 3]);
    assert_eq!(rope.depth(), 1);
}

// =============================================================================
// Deep Trees
// =============================================================================

/// Appends a four-element rope `levels` times, adding one level per append.
fn left_spine(settings: RopeSettings, levels: usize) -> PersistentRope<i32> {
    let piece = PersistentRope::from_vec(vec![1, 2, 3, 4], settings);
    let mut rope = piece.clone();
    for _ in 0..levels {
        rope = rope.append(&piece);
    }
    rope
}

#[rstest]
fn test_deep_unbalanced_rope_supports_every_operation(settings: RopeSettings) {
    const LEVELS: usize = 20_000;
    let rope = left_spine(settings, LEVELS);
    let length = 4 * (LEVELS + 1);
    assert_eq!(rope.depth(), LEVELS + 1);
    assert_eq!(rope.len(), length);

    let removed = rope.remove(0..1);
    assert_eq!(removed.len(), length - 1);
    assert_eq!(removed.get(0), Some(&2));

    let inserted = rope.insert(0, &[9]);
    assert_eq!(inserted.get(0), Some(&9));
    assert_eq!(inserted.len(), length + 1);

    assert_eq!(rope.slice(length - 6..), vec![3, 4, 1, 2, 3, 4]);
    let mut destination = [0; 5];
    rope.copy_range_to(&mut destination, 2..7);
    assert_eq!(destination, [3, 4, 1, 2, 3]);

    let rebalanced = rope.rebalanced();
    assert!(rebalanced.depth() < 20, "depth {}", rebalanced.depth());
    assert_eq!(rebalanced, rope);

    drop(removed);
    drop(inserted);
    drop(rebalanced);
    drop(rope);
}

#[rstest]
fn test_prepend_loop_discards_old_versions(settings: RopeSettings) {
    let mut rope = left_spine(settings, 20_000);
    for round in 0..50 {
        rope = rope.insert(0, &[round]);
    }
    assert_eq!(rope.get(0), Some(&49));
    assert_eq!(rope.len(), 4 * 20_001 + 50);
}

// =============================================================================
// Standard Traits
// =============================================================================

#[rstest]
fn test_equality_ignores_shape(settings: RopeSettings) {
    let built = PersistentRope::from_vec((0..20).collect(), settings);
    let edited = PersistentRope::from_vec((5..20).collect(), settings).insert(0, &[0, 1, 2, 3, 4]);
    assert_eq!(built, edited);

    let mut set = HashSet::new();
    set.insert(built);
    assert!(set.contains(&edited));
}

#[rstest]
fn test_inequality(eight: PersistentRope<i32>) {
    assert_ne!(eight, eight.insert(8, &[8]));
    assert_ne!(eight, eight.remove(7..).insert(7, &[70]));
}

#[rstest]
fn test_display_and_debug(eight: PersistentRope<i32>) {
    assert_eq!(format!("{eight}"), "[0, 1, 2, 3, 4, 5, 6, 7]");
    assert_eq!(format!("{eight:?}"), "[0, 1, 2, 3, 4, 5, 6, 7]");
}

#[rstest]
fn test_non_copy_elements(settings: RopeSettings) {
    let words: Vec<String> = "the quick brown fox jumps over the lazy dog"
        .split(' ')
        .map(String::from)
        .collect();
    let rope = PersistentRope::from_vec(words, settings);
    let edited = rope.remove(1..3).insert(1, &["slow".to_string()]);
    let sentence: Vec<&str> = edited.iter().map(String::as_str).collect();
    assert_eq!(
        sentence.join(" "),
        "the slow fox jumps over the lazy dog"
    );
}
