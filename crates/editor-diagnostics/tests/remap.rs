use editor_diagnostics::{Bias, ChangeError, ChangeSet, ChangeSpec, TextDelta, TextDeltaEdit};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_insertion_shifts_later_positions() {
    let changes = ChangeSet::single(10, ChangeSpec::insert(3, "abc")).unwrap();
    assert_eq!(changes.map_pos(2, Bias::Right), Some(2));
    assert_eq!(changes.map_pos(5, Bias::Left), Some(8));
    assert_eq!(changes.map_pos(10, Bias::Left), Some(13));
}

#[test]
fn test_bias_decides_side_of_insertion() {
    let changes = ChangeSet::single(10, ChangeSpec::insert(3, "abc")).unwrap();
    assert_eq!(changes.map_pos(3, Bias::Left), Some(3));
    assert_eq!(changes.map_pos(3, Bias::Right), Some(6));
}

#[test]
fn test_positions_inside_deletion_are_lost() {
    let changes = ChangeSet::single(10, ChangeSpec::delete(2, 6)).unwrap();
    assert_eq!(changes.map_pos(4, Bias::Left), None);
    assert_eq!(changes.map_pos_lossy(4, Bias::Left), 2);
    assert_eq!(changes.map_pos_lossy(4, Bias::Right), 2);

    // Deletion boundaries survive.
    assert_eq!(changes.map_pos(2, Bias::Right), Some(2));
    assert_eq!(changes.map_pos(6, Bias::Left), Some(2));
    assert_eq!(changes.map_pos(8, Bias::Left), Some(4));
}

#[test]
fn test_replacement_collapses_to_its_sides() {
    let changes = ChangeSet::single(10, ChangeSpec::replace(2, 6, "xy")).unwrap();
    assert_eq!(changes.map_pos(3, Bias::Left), None);
    assert_eq!(changes.map_pos_lossy(3, Bias::Left), 2);
    assert_eq!(changes.map_pos_lossy(3, Bias::Right), 4);
    assert_eq!(changes.map_pos(2, Bias::Right), Some(4));
    assert_eq!(changes.map_pos(6, Bias::Left), Some(4));
}

#[test]
fn test_multibyte_text_is_counted_in_chars() {
    let changes = ChangeSet::single(4, ChangeSpec::insert(0, "é→")).unwrap();
    assert_eq!(changes.len_after(), 6);
    assert_eq!(changes.apply_to_str("1 + ").unwrap(), "é→1 + ");
    assert_eq!(changes.map_pos(4, Bias::Left), Some(6));
}

#[test]
fn test_invalid_specs_are_rejected() {
    assert_eq!(
        ChangeSet::single(5, ChangeSpec::delete(3, 2)),
        Err(ChangeError::InvalidRange { from: 3, to: 2 })
    );
    assert_eq!(
        ChangeSet::single(5, ChangeSpec::delete(3, 7)),
        Err(ChangeError::OutOfBounds {
            from: 3,
            to: 7,
            len: 5
        })
    );
    assert_eq!(
        ChangeSet::new(5, [ChangeSpec::delete(0, 3), ChangeSpec::insert(2, "x")]),
        Err(ChangeError::Overlap { offset: 2 })
    );
}

#[test]
fn test_apply_checks_document_length() {
    let changes = ChangeSet::single(5, ChangeSpec::insert(0, "x")).unwrap();
    assert_eq!(
        changes.apply_to_str("abc"),
        Err(ChangeError::LengthMismatch {
            expected: 5,
            actual: 3
        })
    );
}

#[test]
fn test_touches_range_includes_boundaries() {
    let changes = ChangeSet::single(20, ChangeSpec::insert(10, "x")).unwrap();
    assert!(changes.touches_range(5, 10));
    assert!(changes.touches_range(10, 15));
    assert!(!changes.touches_range(0, 9));
    assert!(!changes.touches_range(11, 20));
}

#[test]
fn test_touches_range_follows_later_steps() {
    let first = ChangeSet::single(20, ChangeSpec::insert(0, "abc")).unwrap();
    let second = ChangeSet::single(23, ChangeSpec::delete(14, 15)).unwrap();
    let composed = first.compose(second);
    // 11..12 in the starting document is 14..15 after the first step.
    assert!(composed.touches_range(11, 12));
    assert!(!composed.touches_range(1, 5));
}

#[test]
fn test_compose_maps_through_both_edits() {
    let first = ChangeSet::single(10, ChangeSpec::insert(0, "ab")).unwrap();
    let second = ChangeSet::single(12, ChangeSpec::delete(4, 8)).unwrap();
    let composed = first.clone().compose(second.clone());

    assert_eq!(composed.len_before(), 10);
    assert_eq!(composed.len_after(), 8);
    assert_eq!(composed.map_pos(1, Bias::Left), Some(3));
    assert_eq!(composed.map_pos(4, Bias::Left), None);
    assert_eq!(composed.map_pos(9, Bias::Left), Some(7));
    assert_eq!(
        composed.apply_to_str("0123456789").unwrap(),
        second
            .apply_to_str(&first.apply_to_str("0123456789").unwrap())
            .unwrap()
    );
}

#[test]
#[should_panic(expected = "composed change sets must be adjacent")]
fn test_compose_rejects_non_adjacent_sets() {
    let first = ChangeSet::single(10, ChangeSpec::insert(0, "ab")).unwrap();
    let second = ChangeSet::single(10, ChangeSpec::insert(0, "cd")).unwrap();
    let _ = first.compose(second);
}

#[test]
fn test_text_delta_edits_apply_in_sequence() {
    let delta = TextDelta {
        before_char_count: 5,
        after_char_count: 5,
        edits: vec![
            TextDeltaEdit {
                start: 0,
                deleted_text: String::new(),
                inserted_text: "xy".to_string(),
            },
            // Offsets of the second edit already include the first one.
            TextDeltaEdit {
                start: 5,
                deleted_text: "de".to_string(),
                inserted_text: String::new(),
            },
        ],
    };
    let changes = delta.to_change_set().unwrap();
    assert_eq!(changes.apply_to_str("abcde").unwrap(), "xyabc");
    assert_eq!(changes.map_pos(2, Bias::Left), Some(4));
    assert_eq!(changes.map_pos(4, Bias::Left), None);
}

#[test]
fn test_text_delta_length_must_match() {
    let delta = TextDelta {
        before_char_count: 3,
        after_char_count: 10,
        edits: vec![TextDeltaEdit {
            start: 0,
            deleted_text: "a".to_string(),
            inserted_text: String::new(),
        }],
    };
    assert_eq!(
        delta.to_change_set(),
        Err(ChangeError::LengthMismatch {
            expected: 10,
            actual: 2
        })
    );
}

type EditSeed = (usize, usize, usize);

fn build(len: usize, seeds: &[EditSeed]) -> ChangeSet {
    let specs = seeds.iter().scan(0usize, |floor, &(a, b, insert)| {
        if *floor > len {
            return None;
        }
        let from = *floor + a % (len - *floor + 1);
        let to = from + b % (len - from + 1);
        *floor = to + 1;
        Some(ChangeSpec::replace(from, to, "x".repeat(insert)))
    });
    ChangeSet::new(len, specs.collect::<Vec<_>>()).unwrap()
}

fn arb_edit() -> impl Strategy<Value = Vec<EditSeed>> {
    prop::collection::vec((any::<usize>(), any::<usize>(), 0usize..4), 0..3)
}

fn arb_bias() -> impl Strategy<Value = Bias> {
    prop_oneof![Just(Bias::Left), Just(Bias::Right)]
}

proptest! {
    /// Mapping through composed change sets does not depend on grouping.
    #[test]
    fn prop_compose_is_associative(
        len in 0usize..24,
        a in arb_edit(),
        b in arb_edit(),
        c in arb_edit(),
        pos in 0usize..32,
        bias in arb_bias(),
    ) {
        let a = build(len, &a);
        let b = build(a.len_after(), &b);
        let c = build(b.len_after(), &c);
        let pos = pos.min(len);

        let left = a.clone().compose(b.clone()).compose(c.clone());
        let right = a.clone().compose(b.clone().compose(c.clone()));

        prop_assert_eq!(left.map_pos(pos, bias), right.map_pos(pos, bias));
        prop_assert_eq!(left.map_pos_lossy(pos, bias), right.map_pos_lossy(pos, bias));

        let sequential = a
            .map_pos(pos, bias)
            .and_then(|p| b.map_pos(p, bias))
            .and_then(|p| c.map_pos(p, bias));
        prop_assert_eq!(left.map_pos(pos, bias), sequential);
    }

    /// Mapped positions always land inside the new document.
    #[test]
    fn prop_lossy_mapping_stays_in_bounds(
        len in 0usize..24,
        edit in arb_edit(),
        pos in 0usize..32,
        bias in arb_bias(),
    ) {
        let changes = build(len, &edit);
        let mapped = changes.map_pos_lossy(pos.min(len), bias);
        prop_assert!(mapped <= changes.len_after());
        let text = changes.apply_to_str(&"a".repeat(len)).unwrap();
        prop_assert_eq!(text.chars().count(), changes.len_after());
    }
}
