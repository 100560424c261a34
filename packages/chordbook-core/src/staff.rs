//! # Chord Staff Layout
//!
//! Turns a flat [`Sequence`] into lines of measures with barlines, ending
//! brackets and beat slots. Pure data out, so the wasm front end and the SVG
//! renderer draw from the same layout.
//!
//! ```text
//!  4 |  C  .  G  . |  Am .  .  . ||:  F  .  .  . :||:  C  .  .  . ||
//!  4    ^ slot        ^ single      ^ start/end repeat combined       ^ double
//! ```
//!
//! ## Barline precedence (after measure `i`)
//!
//! 1. `i.repeat_end` and `i+1` in the same line has `repeat_start` -> [`Barline::EndStartRepeat`]
//! 2. `i.repeat_end` -> [`Barline::EndRepeat`]
//! 3. `i+1` in the same line has `repeat_start` -> [`Barline::StartRepeat`]
//! 4. `i` is last in its line -> [`Barline::Double`]
//! 5. otherwise -> [`Barline::Single`]
//!
//! A line opens with [`Barline::StartRepeat`] when its first measure has
//! `repeat_start`, and with [`Barline::Single`] otherwise.

use serde::Serialize;

use crate::chord::{ChordMap, UNTITLED};
use crate::dnd::DropTarget;
use crate::ids::{ChordId, MeasureId};
use crate::sequence::{Sequence, SequenceBeat, SequenceMeasure, TimeSignature};

/// Drawing primitive of a barline, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Glyph {
    Dots,
    Thin,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Barline {
    Single,
    Double,
    StartRepeat,
    EndRepeat,
    EndStartRepeat,
}

impl Barline {
    pub fn glyphs(self) -> &'static [Glyph] {
        use Glyph::*;
        match self {
            Barline::Single => &[Thin],
            Barline::Double => &[Thin, Thin],
            Barline::StartRepeat => &[Thin, Heavy, Dots],
            Barline::EndRepeat => &[Dots, Heavy, Thin],
            Barline::EndStartRepeat => &[Dots, Heavy, Thin, Heavy, Dots],
        }
    }

    pub fn is_repeat(self) -> bool {
        !matches!(self, Barline::Single | Barline::Double)
    }
}

/// Barline drawn at the start of a line
pub fn opening_barline(first: &SequenceMeasure) -> Barline {
    if first.repeat_start {
        Barline::StartRepeat
    } else {
        Barline::Single
    }
}

/// Barline drawn after `measure`; `next_in_line` is `None` at the end of a line
pub fn closing_barline(measure: &SequenceMeasure, next_in_line: Option<&SequenceMeasure>) -> Barline {
    let next_starts_repeat = next_in_line.map_or(false, |next| next.repeat_start);
    match (measure.repeat_end, next_starts_repeat) {
        (true, true) => Barline::EndStartRepeat,
        (true, false) => Barline::EndRepeat,
        (false, true) => Barline::StartRepeat,
        (false, false) if next_in_line.is_none() => Barline::Double,
        (false, false) => Barline::Single,
    }
}

/// What a beat slot shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotContent {
    Empty,
    #[serde(rename_all = "camelCase")]
    Chord { chord_id: ChordId, label: String },
    /// Assigned id that is not in the chord map
    #[serde(rename_all = "camelCase")]
    Dangling { chord_id: ChordId },
}

impl SlotContent {
    pub fn label(&self) -> Option<&str> {
        match self {
            SlotContent::Empty => None,
            SlotContent::Chord { label, .. } => Some(label),
            SlotContent::Dangling { .. } => Some(UNTITLED),
        }
    }

    pub fn chord_id(&self) -> Option<ChordId> {
        match self {
            SlotContent::Empty => None,
            SlotContent::Chord { chord_id, .. } | SlotContent::Dangling { chord_id } => Some(*chord_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatSlot {
    pub measure_id: MeasureId,
    pub beat_position: u8,
    pub content: SlotContent,
}

impl BeatSlot {
    fn new(measure_id: MeasureId, beat: &SequenceBeat, chords: &ChordMap) -> Self {
        let content = match beat.chord_id {
            None => SlotContent::Empty,
            Some(chord_id) => match chords.label(&chord_id) {
                Some(label) => SlotContent::Chord {
                    chord_id,
                    label: label.to_string(),
                },
                None => SlotContent::Dangling { chord_id },
            },
        };
        Self {
            measure_id,
            beat_position: beat.beat_position,
            content,
        }
    }

    /// Every slot accepts a chord drop
    pub fn drop_target(&self) -> DropTarget {
        DropTarget::Beat {
            measure_id: self.measure_id,
            beat_position: self.beat_position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMeasure {
    pub measure_id: MeasureId,
    pub position: usize,
    /// Bracket text such as `"1."`
    pub ending: Option<String>,
    pub closing: Barline,
    pub slots: Vec<BeatSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLine {
    pub index: usize,
    /// Only set on the first line
    pub time_signature: Option<TimeSignature>,
    pub opening: Barline,
    pub measures: Vec<StaffMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLayout {
    pub time_signature: TimeSignature,
    pub measures_per_line: usize,
    pub lines: Vec<StaffLine>,
}

impl StaffLayout {
    pub fn measures(&self) -> impl Iterator<Item = &StaffMeasure> {
        self.lines.iter().flat_map(|line| line.measures.iter())
    }

    pub fn slots(&self) -> impl Iterator<Item = &BeatSlot> {
        self.measures().flat_map(|measure| measure.slots.iter())
    }

    /// Barline between two measures given by sequence index
    pub fn barline_after(&self, position: usize) -> Option<Barline> {
        self.measures()
            .find(|measure| measure.position == position)
            .map(|measure| measure.closing)
    }
}

/// Lay out a sequence into staff lines
pub fn layout(sequence: &Sequence, chords: &ChordMap) -> StaffLayout {
    let measures_per_line = (sequence.measures_per_line as usize).max(1);

    let lines = sequence
        .measures
        .chunks(measures_per_line)
        .enumerate()
        .map(|(index, line_measures)| layout_line(index, line_measures, sequence, chords))
        .collect();

    StaffLayout {
        time_signature: sequence.time_signature(),
        measures_per_line,
        lines,
    }
}

fn layout_line(
    index: usize,
    line_measures: &[SequenceMeasure],
    sequence: &Sequence,
    chords: &ChordMap,
) -> StaffLine {
    let opening = line_measures
        .first()
        .map(opening_barline)
        .unwrap_or(Barline::Single);

    let measures = line_measures
        .iter()
        .enumerate()
        .map(|(i, measure)| {
            let next = line_measures.get(i + 1);
            let mut beats: Vec<&SequenceBeat> = measure.beats.iter().collect();
            beats.sort_by_key(|beat| beat.beat_position);

            StaffMeasure {
                measure_id: measure.id,
                position: measure.position,
                ending: measure.ending.map(|ending| ending.label()),
                closing: closing_barline(measure, next),
                slots: beats
                    .into_iter()
                    .map(|beat| BeatSlot::new(measure.id, beat, chords))
                    .collect(),
            }
        })
        .collect();

    StaffLine {
        index,
        time_signature: (index == 0).then(|| sequence.time_signature()),
        opening,
        measures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;
    use crate::sequence::Ending;
    use pretty_assertions::assert_eq;

    fn sequence(count: usize, per_line: u8) -> Sequence {
        Sequence::with_empty_measures(4, 4, per_line, count)
    }

    fn closings(layout: &StaffLayout) -> Vec<Barline> {
        layout.measures().map(|m| m.closing).collect()
    }

    #[test]
    fn test_lines_are_chunks() {
        let layout = layout(&sequence(10, 4), &ChordMap::default());
        let sizes: Vec<usize> = layout.lines.iter().map(|l| l.measures.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_time_signature_on_first_line_only() {
        let layout = layout(&sequence(6, 2), &ChordMap::default());
        assert!(layout.lines[0].time_signature.is_some());
        assert!(layout.lines[1..].iter().all(|l| l.time_signature.is_none()));
    }

    #[test]
    fn test_zero_measures_per_line_is_one() {
        let layout = layout(&sequence(3, 0), &ChordMap::default());
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.measures_per_line, 1);
    }

    #[test]
    fn test_plain_barlines() {
        let layout = layout(&sequence(5, 4), &ChordMap::default());
        assert_eq!(
            closings(&layout),
            vec![
                Barline::Single,
                Barline::Single,
                Barline::Single,
                Barline::Double,
                Barline::Double
            ]
        );
        assert!(layout.lines.iter().all(|l| l.opening == Barline::Single));
    }

    #[test]
    fn test_combined_repeat_barline() {
        let mut seq = sequence(4, 4);
        seq.measures[0].repeat_end = true;
        seq.measures[1].repeat_start = true;
        let layout = layout(&seq, &ChordMap::default());
        assert_eq!(layout.barline_after(0), Some(Barline::EndStartRepeat));
        assert_eq!(
            Barline::EndStartRepeat.glyphs(),
            &[Glyph::Dots, Glyph::Heavy, Glyph::Thin, Glyph::Heavy, Glyph::Dots]
        );
    }

    #[test]
    fn test_repeat_across_line_break_is_not_combined() {
        let mut seq = sequence(4, 2);
        seq.measures[1].repeat_end = true;
        seq.measures[2].repeat_start = true;
        let layout = layout(&seq, &ChordMap::default());
        assert_eq!(layout.barline_after(1), Some(Barline::EndRepeat));
        assert_eq!(layout.lines[1].opening, Barline::StartRepeat);
    }

    #[test]
    fn test_start_repeat_between_measures() {
        let mut seq = sequence(3, 4);
        seq.measures[1].repeat_start = true;
        let layout = layout(&seq, &ChordMap::default());
        assert_eq!(
            closings(&layout),
            vec![Barline::StartRepeat, Barline::Single, Barline::Double]
        );
    }

    #[test]
    fn test_end_repeat_beats_double() {
        let mut seq = sequence(2, 4);
        seq.measures[1].repeat_end = true;
        let layout = layout(&seq, &ChordMap::default());
        assert_eq!(layout.barline_after(1), Some(Barline::EndRepeat));
    }

    #[test]
    fn test_ending_bracket_label() {
        let mut seq = sequence(2, 4);
        seq.measures[0].ending = Some(Ending::First);
        seq.measures[1].ending = Some(Ending::Second);
        let layout = layout(&seq, &ChordMap::default());
        let endings: Vec<Option<String>> = layout.measures().map(|m| m.ending.clone()).collect();
        assert_eq!(endings, vec![Some("1.".to_string()), Some("2.".to_string())]);
    }

    #[test]
    fn test_slot_labels_and_dangling() {
        let c = Chord::new(ChordId::new()).with_name("C");
        let unnamed = Chord::new(ChordId::new());
        let deleted = ChordId::new();
        let chords = ChordMap::from_chords(&[c.clone(), unnamed.clone()]);

        let mut seq = sequence(1, 4);
        let measure_id = seq.measures[0].id;
        seq.assign_chord(measure_id, 1, c.id).unwrap();
        seq.assign_chord(measure_id, 2, unnamed.id).unwrap();
        seq.assign_chord(measure_id, 3, deleted).unwrap();

        let layout = layout(&seq, &chords);
        let labels: Vec<Option<&str>> = layout.slots().map(|s| s.content.label()).collect();
        assert_eq!(labels, vec![Some("C"), Some("Untitled"), Some("Untitled"), None]);
        assert_eq!(
            layout.slots().nth(2).map(|s| s.content.clone()),
            Some(SlotContent::Dangling { chord_id: deleted })
        );
    }

    #[test]
    fn test_slot_drop_targets() {
        let seq = sequence(1, 4);
        let layout = layout(&seq, &ChordMap::default());
        let slot = layout.slots().nth(1).unwrap();
        assert_eq!(
            slot.drop_target(),
            DropTarget::Beat {
                measure_id: seq.measures[0].id,
                beat_position: 2
            }
        );
    }

    #[test]
    fn test_empty_sequence_has_no_lines() {
        let layout = layout(&Sequence::new(3, 4, 4), &ChordMap::default());
        assert!(layout.lines.is_empty());
        assert_eq!(layout.time_signature.numerator, 3);
    }
}
