//! Integration tests for the chordbook model
//!
//! Exercises editing, layout and rendering together, the way the editor
//! drives them.

use chordbook_core::{
    apply_edit, auto_starting_fret, is_fret_visible, layout, parse_sequence, render_staff,
    reorder, resolve_drop, staff_to_svg, toggle_marker, validate, Barline, Chord, ChordId,
    ChordMap, DropAction, DropTarget, EditOutcome, Fretboard, Marker, RemoveMeasure, Sequence,
    SequenceEdit, SlotContent,
};

fn assert_contiguous(sequence: &Sequence) {
    for (i, measure) in sequence.measures.iter().enumerate() {
        assert_eq!(measure.position, i, "measure {} has position {}", i, measure.position);
        assert_eq!(measure.beats.len(), sequence.time_signature_numerator as usize);
        for (j, beat) in measure.beats.iter().enumerate() {
            assert_eq!(beat.beat_position as usize, j + 1);
        }
    }
}

#[test]
fn test_fret_window_always_shows_every_marker() {
    // Every pair of frets on two strings, every saved start
    for low in 0..=15u8 {
        for high in low..=15u8 {
            // Spans wider than the window cannot be shown at once
            if (low > 0 && high - low > 4) || (low == 0 && high > 5) {
                continue;
            }
            let markers = vec![Marker::new(0, low), Marker::new(1, high)];
            for saved in 0..=19u8 {
                let start = auto_starting_fret(&markers, saved);
                for marker in &markers {
                    assert!(
                        is_fret_visible(marker.fret, start, 5),
                        "frets {}..{} saved {} gave start {}",
                        low,
                        high,
                        saved,
                        start
                    );
                }
            }
        }
    }
}

#[test]
fn test_fret_window_keeps_saved_start_when_everything_fits() {
    let markers = vec![Marker::new(2, 7), Marker::new(3, 9)];
    assert_eq!(auto_starting_fret(&markers, 5), 5);
    assert_eq!(auto_starting_fret(&[], 12), 12);
}

#[test]
fn test_add_and_remove_keep_positions_contiguous() {
    let mut sequence = Sequence::default();
    let chord = ChordId::new();

    let added = sequence.add_measure();
    sequence.assign_chord(added, 2, chord).unwrap();
    assert_contiguous(&sequence);

    let second = sequence.measures[1].id;
    assert!(matches!(
        sequence.remove_measure(second, false).unwrap(),
        RemoveMeasure::Removed(_)
    ));
    assert_contiguous(&sequence);

    // The appended measure now holds a chord and needs confirmation
    assert_eq!(
        sequence.remove_measure(added, false).unwrap(),
        RemoveMeasure::NeedsConfirmation { assigned_chords: 1 }
    );
    assert_eq!(sequence.len(), 4);
    sequence.remove_measure(added, true).unwrap();
    assert_eq!(sequence.len(), 3);
    assert_contiguous(&sequence);
    assert!(validate(&sequence).is_ok());
}

#[test]
fn test_clearing_a_beat_keeps_its_slot() {
    let mut sequence = Sequence::default();
    let measure_id = sequence.measures[0].id;
    let chord = ChordId::new();

    sequence.assign_chord(measure_id, 2, chord).unwrap();
    sequence.clear_beat(measure_id, 2).unwrap();

    let measure = sequence.measure(measure_id).unwrap();
    assert_eq!(measure.beats.len(), 4);
    let beat = measure.beat(2).unwrap();
    assert_eq!(beat.beat_position, 2);
    assert_eq!(beat.chord_id, None);
}

#[test]
fn test_reorder_moves_last_to_front() {
    let chords: Vec<Chord> = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(i, name)| Chord::new(ChordId::new()).with_name(*name).with_position(i))
        .collect();

    let reordered = reorder(&chords, 3, 0).unwrap();
    let summary: Vec<(&str, usize)> = reordered.iter().map(|c| (c.label(), c.position)).collect();
    assert_eq!(summary, vec![("D", 0), ("A", 1), ("B", 2), ("C", 3)]);
}

#[test]
fn test_combined_repeat_barline_between_measures() {
    let mut sequence = Sequence::default();
    sequence.measures[0].repeat_end = true;
    sequence.measures[1].repeat_start = true;

    let staff = layout(&sequence, &ChordMap::default());
    let first = &staff.lines[0].measures[0];
    assert_eq!(first.closing, Barline::EndStartRepeat);
    assert_ne!(first.closing, Barline::EndRepeat);
    assert_ne!(first.closing, Barline::StartRepeat);
}

#[test]
fn test_deleted_chord_still_renders() {
    let kept = Chord::new(ChordId::new()).with_name("G");
    let deleted = Chord::new(ChordId::new()).with_name("D");

    let mut sequence = Sequence::default();
    let measure_id = sequence.measures[0].id;
    sequence.assign_chord(measure_id, 1, kept.id).unwrap();
    sequence.assign_chord(measure_id, 3, deleted.id).unwrap();

    // The chord list no longer has `deleted`, but the beat still points at it
    let chords = ChordMap::from_chords(&[kept.clone()]);
    let staff = layout(&sequence, &chords);
    let third = &staff.lines[0].measures[0].slots[2];
    assert_eq!(third.content, SlotContent::Dangling { chord_id: deleted.id });
    assert_eq!(third.content.label(), Some("Untitled"));

    let svg = staff_to_svg(&staff);
    assert!(svg.contains(">Untitled</text>"));
    assert!(svg.contains(">G</text>"));

    // Clearing references afterwards empties the slot
    assert_eq!(sequence.clear_chord_references(deleted.id), 1);
    let staff = layout(&sequence, &chords);
    assert_eq!(staff.lines[0].measures[0].slots[2].content, SlotContent::Empty);
}

#[test]
fn test_drag_chord_onto_staff_then_render() {
    let chords = vec![
        Chord::new(ChordId::new()).with_name("Em").with_position(0),
        Chord::new(ChordId::new()).with_name("C").with_position(1),
    ];
    let mut sequence = Sequence::default();
    let staff = layout(&sequence, &ChordMap::from_chords(&chords));
    let target = staff.lines[0].measures[1].slots[0].drop_target();

    let action = resolve_drop(chords[1].id, Some(&target), &chords).unwrap();
    let DropAction::AssignBeat {
        measure_id,
        beat_position,
        chord_id,
    } = action
    else {
        panic!("expected a beat assignment, got {:?}", action);
    };

    let outcome = apply_edit(
        &mut sequence,
        &SequenceEdit::AssignChord {
            measure_id,
            beat_position,
            chord_id,
        },
    )
    .unwrap();
    assert_eq!(outcome, EditOutcome::Applied);

    let staff = layout(&sequence, &ChordMap::from_chords(&chords));
    assert_eq!(staff.lines[0].measures[1].slots[0].content.label(), Some("C"));

    // Card onto card reorders instead
    let card = DropTarget::ChordCard {
        chord_id: chords[0].id,
    };
    assert_eq!(
        resolve_drop(chords[1].id, Some(&card), &chords),
        Some(DropAction::Reorder { from: 1, to: 0 })
    );
}

#[test]
fn test_numerator_change_keeps_surviving_chords() {
    let mut sequence = Sequence::default();
    let measure_id = sequence.measures[0].id;
    let c = ChordId::new();
    let g = ChordId::new();
    sequence.assign_chord(measure_id, 1, c).unwrap();
    sequence.assign_chord(measure_id, 4, g).unwrap();

    apply_edit(
        &mut sequence,
        &SequenceEdit::SetTimeSignature {
            numerator: 3,
            denominator: 4,
        },
    )
    .unwrap();
    assert_contiguous(&sequence);
    let measure = sequence.measure(measure_id).unwrap();
    assert_eq!(measure.beat(1).unwrap().chord_id, Some(c));
    assert!(measure.beat(4).is_none());
}

#[test]
fn test_fretboard_tap_toggles_through_caller() {
    let board = Fretboard::new(vec![Marker::new(3, 2)]);
    let mut markers = board.markers.clone();

    assert!(board.tap(3, 2, |m| markers = toggle_marker(&markers, m)));
    assert!(markers.is_empty());
    assert!(board.tap(0, 0, |m| markers = toggle_marker(&markers, m)));
    assert_eq!(markers, vec![Marker::new(0, 0)]);

    // Fret 7 is outside a window at the nut
    assert!(!board.tap(0, 7, |m| markers = toggle_marker(&markers, m)));
}

#[test]
fn test_render_staff_from_document() {
    let source = r#"
time_signature_numerator: 4
time_signature_denominator: 4
measures_per_line: 2
measures:
  - repeat_start: true
  - repeat_end: true
    ending_number: 1
  - ending_number: 2
"#;
    let sequence = parse_sequence(source).unwrap();
    assert!(validate(&sequence).is_ok());
    let staff = layout(&sequence, &ChordMap::default());
    assert_eq!(staff.lines.len(), 2);
    assert_eq!(staff.lines[0].opening, Barline::StartRepeat);
    assert_eq!(staff.lines[0].measures[1].closing, Barline::EndRepeat);
    assert_eq!(staff.lines[1].measures[0].closing, Barline::Double);

    let svg = render_staff(source, &ChordMap::default()).unwrap();
    assert!(svg.contains(">1.</text>"));
    assert!(svg.contains(">2.</text>"));
}
