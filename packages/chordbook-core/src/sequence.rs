//! # Chord Sequence Model
//!
//! ## Type Hierarchy
//! ```text
//! Sequence
//!   ├── time_signature_numerator / _denominator
//!   ├── measures_per_line
//!   └── Vec<SequenceMeasure>            position == index, always
//!         ├── id: MeasureId
//!         ├── repeat_start / repeat_end: bool
//!         ├── ending: Option<Ending>    1. or 2. bracket
//!         └── Vec<SequenceBeat>         one per numerator beat, 1-based
//!               └── chord_id: Option<ChordId>
//! ```
//!
//! Every mutation keeps two invariants:
//! - `measures[i].position == i`
//! - `measures[i].beats[j].beat_position == j + 1` and `beats.len() == numerator`
//!
//! Beats hold a non-owning chord reference. Deleting a chord should go
//! through [`Sequence::clear_chord_references`]; the staff still renders a
//! dangling reference if one slips through.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChordbookError;
use crate::ids::{ChordId, MeasureId};

pub const DEFAULT_NUMERATOR: u8 = 4;
pub const DEFAULT_DENOMINATOR: u8 = 4;
pub const DEFAULT_MEASURES_PER_LINE: u8 = 4;
pub const DEFAULT_MEASURE_COUNT: usize = 4;

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: DEFAULT_NUMERATOR,
            denominator: DEFAULT_DENOMINATOR,
        }
    }
}

/// Ending type for volta brackets (1st/2nd endings)
///
/// Serialized as the bracket number, `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Ending {
    First,  // 1.
    Second, // 2.
}

impl Ending {
    pub fn number(self) -> u8 {
        match self {
            Ending::First => 1,
            Ending::Second => 2,
        }
    }

    /// Bracket text drawn above the measure
    pub fn label(self) -> String {
        format!("{}.", self.number())
    }
}

impl TryFrom<u8> for Ending {
    type Error = ChordbookError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Ending::First),
            2 => Ok(Ending::Second),
            other => Err(ChordbookError::InvalidEnding(other)),
        }
    }
}

impl From<Ending> for u8 {
    fn from(ending: Ending) -> Self {
        ending.number()
    }
}

/// One beat slot of a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBeat {
    pub beat_position: u8,
    #[serde(default)]
    pub chord_id: Option<ChordId>,
}

impl SequenceBeat {
    pub fn empty(beat_position: u8) -> Self {
        Self {
            beat_position,
            chord_id: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chord_id.is_none()
    }
}

/// Empty beats `1..=numerator`
pub fn default_beats(numerator: u8) -> Vec<SequenceBeat> {
    (1..=numerator).map(SequenceBeat::empty).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMeasure {
    #[serde(default)]
    pub id: MeasureId,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub repeat_start: bool,
    #[serde(default)]
    pub repeat_end: bool,
    #[serde(default, rename = "ending_number")]
    pub ending: Option<Ending>,
    #[serde(default)]
    pub beats: Vec<SequenceBeat>,
}

impl SequenceMeasure {
    /// A fresh measure with `numerator` empty beats and no annotations
    pub fn empty(position: usize, numerator: u8) -> Self {
        Self {
            id: MeasureId::new(),
            position,
            repeat_start: false,
            repeat_end: false,
            ending: None,
            beats: default_beats(numerator),
        }
    }

    /// Number of beats holding a chord
    pub fn assigned_count(&self) -> usize {
        self.beats.iter().filter(|b| !b.is_empty()).count()
    }

    pub fn has_chords(&self) -> bool {
        self.assigned_count() > 0
    }

    pub fn beat(&self, beat_position: u8) -> Option<&SequenceBeat> {
        self.beats.iter().find(|b| b.beat_position == beat_position)
    }

    fn beat_mut(&mut self, beat_position: u8) -> Result<&mut SequenceBeat, ChordbookError> {
        let beats = self.beats.len() as u8;
        self.beats
            .iter_mut()
            .find(|b| b.beat_position == beat_position)
            .ok_or(ChordbookError::BeatOutOfRange {
                beat_position,
                beats,
            })
    }

    /// Resize to `numerator` beats, keeping chords on beats that survive
    fn resize_beats(&mut self, numerator: u8) {
        let old = std::mem::take(&mut self.beats);
        self.beats = (1..=numerator)
            .map(|beat_position| SequenceBeat {
                beat_position,
                chord_id: old
                    .iter()
                    .find(|b| b.beat_position == beat_position)
                    .and_then(|b| b.chord_id),
            })
            .collect();
    }
}

/// Outcome of a measure removal request
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveMeasure {
    /// The measure was removed and the remaining positions renumbered
    Removed(SequenceMeasure),
    /// The measure holds chords and the removal was not confirmed; nothing changed
    NeedsConfirmation { assigned_chords: usize },
}

fn default_numerator() -> u8 {
    DEFAULT_NUMERATOR
}

fn default_denominator() -> u8 {
    DEFAULT_DENOMINATOR
}

fn default_measures_per_line() -> u8 {
    DEFAULT_MEASURES_PER_LINE
}

/// A song's chord sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default = "default_numerator")]
    pub time_signature_numerator: u8,
    #[serde(default = "default_denominator")]
    pub time_signature_denominator: u8,
    #[serde(default = "default_measures_per_line")]
    pub measures_per_line: u8,
    #[serde(default)]
    pub measures: Vec<SequenceMeasure>,
}

impl Default for Sequence {
    /// 4/4, four measures per line, four empty measures
    fn default() -> Self {
        Self::with_empty_measures(
            DEFAULT_NUMERATOR,
            DEFAULT_DENOMINATOR,
            DEFAULT_MEASURES_PER_LINE,
            DEFAULT_MEASURE_COUNT,
        )
    }
}

impl Sequence {
    /// A sequence with no measures
    pub fn new(numerator: u8, denominator: u8, measures_per_line: u8) -> Self {
        Self {
            time_signature_numerator: numerator,
            time_signature_denominator: denominator,
            measures_per_line,
            measures: Vec::new(),
        }
    }

    pub fn with_empty_measures(
        numerator: u8,
        denominator: u8,
        measures_per_line: u8,
        count: usize,
    ) -> Self {
        let mut sequence = Self::new(numerator, denominator, measures_per_line);
        sequence.measures = (0..count)
            .map(|position| SequenceMeasure::empty(position, numerator))
            .collect();
        sequence
    }

    pub fn time_signature(&self) -> TimeSignature {
        TimeSignature {
            numerator: self.time_signature_numerator,
            denominator: self.time_signature_denominator,
        }
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn measure(&self, id: MeasureId) -> Option<&SequenceMeasure> {
        self.measures.iter().find(|m| m.id == id)
    }

    pub fn measure_index(&self, id: MeasureId) -> Option<usize> {
        self.measures.iter().position(|m| m.id == id)
    }

    fn measure_mut(&mut self, id: MeasureId) -> Result<&mut SequenceMeasure, ChordbookError> {
        self.measures
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ChordbookError::MeasureNotFound(id))
    }

    /// Reassign `position` to match list order
    pub fn renumber(&mut self) {
        for (index, measure) in self.measures.iter_mut().enumerate() {
            measure.position = index;
        }
    }

    /// Sort measures by position, bring every measure to `numerator` beats
    /// numbered `1..=numerator`, then renumber.
    ///
    /// Used on data coming from outside (backend responses, files), where
    /// order and beat counts are not guaranteed. Chords on beats past the
    /// numerator are dropped.
    pub fn normalize(&mut self) {
        let numerator = self.time_signature_numerator;
        self.measures.sort_by_key(|m| m.position);
        for measure in &mut self.measures {
            if numerator == 0 {
                measure.beats.sort_by_key(|b| b.beat_position);
                continue;
            }
            if measure.beats.len() != numerator as usize {
                debug!(measure = %measure.id, beats = measure.beats.len(), numerator, "resizing measure beats");
            }
            measure.resize_beats(numerator);
        }
        self.renumber();
    }

    /// Append an empty measure and return its id
    pub fn add_measure(&mut self) -> MeasureId {
        let measure = SequenceMeasure::empty(self.measures.len(), self.time_signature_numerator);
        let id = measure.id;
        debug!(measure = %id, position = measure.position, "added measure");
        self.measures.push(measure);
        id
    }

    /// Remove a measure.
    ///
    /// A measure with assigned chords is only removed when `confirmed` is set;
    /// otherwise the sequence is left untouched and the caller is told how
    /// many chords would be lost.
    pub fn remove_measure(
        &mut self,
        id: MeasureId,
        confirmed: bool,
    ) -> Result<RemoveMeasure, ChordbookError> {
        let index = self
            .measure_index(id)
            .ok_or(ChordbookError::MeasureNotFound(id))?;

        let assigned_chords = self.measures[index].assigned_count();
        if assigned_chords > 0 && !confirmed {
            return Ok(RemoveMeasure::NeedsConfirmation { assigned_chords });
        }

        let removed = self.measures.remove(index);
        self.renumber();
        debug!(measure = %id, remaining = self.measures.len(), "removed measure");
        Ok(RemoveMeasure::Removed(removed))
    }

    /// Put a chord on a beat, replacing whatever was there.
    ///
    /// Returns the chord previously on the beat.
    pub fn assign_chord(
        &mut self,
        measure_id: MeasureId,
        beat_position: u8,
        chord_id: ChordId,
    ) -> Result<Option<ChordId>, ChordbookError> {
        let beat = self.measure_mut(measure_id)?.beat_mut(beat_position)?;
        let previous = beat.chord_id.replace(chord_id);
        debug!(measure = %measure_id, beat_position, chord = %chord_id, "assigned chord");
        Ok(previous)
    }

    /// Empty a beat; the beat itself and its position stay
    pub fn clear_beat(
        &mut self,
        measure_id: MeasureId,
        beat_position: u8,
    ) -> Result<Option<ChordId>, ChordbookError> {
        let beat = self.measure_mut(measure_id)?.beat_mut(beat_position)?;
        Ok(beat.chord_id.take())
    }

    /// Empty every beat that references `chord_id`; returns how many were cleared
    pub fn clear_chord_references(&mut self, chord_id: ChordId) -> usize {
        let mut cleared = 0;
        for beat in self.measures.iter_mut().flat_map(|m| m.beats.iter_mut()) {
            if beat.chord_id == Some(chord_id) {
                beat.chord_id = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Every chord id referenced by a beat, in staff order (duplicates kept)
    pub fn referenced_chords(&self) -> impl Iterator<Item = ChordId> + '_ {
        self.measures
            .iter()
            .flat_map(|m| m.beats.iter())
            .filter_map(|b| b.chord_id)
    }

    pub fn toggle_repeat_start(&mut self, id: MeasureId) -> Result<bool, ChordbookError> {
        let measure = self.measure_mut(id)?;
        measure.repeat_start = !measure.repeat_start;
        Ok(measure.repeat_start)
    }

    pub fn toggle_repeat_end(&mut self, id: MeasureId) -> Result<bool, ChordbookError> {
        let measure = self.measure_mut(id)?;
        measure.repeat_end = !measure.repeat_end;
        Ok(measure.repeat_end)
    }

    /// Set or clear the ending bracket; only 1 and 2 are accepted
    pub fn set_ending(&mut self, id: MeasureId, number: Option<u8>) -> Result<(), ChordbookError> {
        let ending = number.map(Ending::try_from).transpose()?;
        self.measure_mut(id)?.ending = ending;
        Ok(())
    }

    /// Change the beats per measure, resizing every measure.
    ///
    /// Chords on beats beyond the new numerator are dropped.
    pub fn set_numerator(&mut self, numerator: u8) -> Result<(), ChordbookError> {
        if numerator == 0 {
            return Err(ChordbookError::InvalidSequence(
                "time signature numerator must be at least 1".to_string(),
            ));
        }
        self.time_signature_numerator = numerator;
        for measure in &mut self.measures {
            measure.resize_beats(numerator);
        }
        Ok(())
    }

    pub fn set_denominator(&mut self, denominator: u8) -> Result<(), ChordbookError> {
        if !denominator.is_power_of_two() {
            return Err(ChordbookError::InvalidSequence(format!(
                "time signature denominator must be a power of two, got {}",
                denominator
            )));
        }
        self.time_signature_denominator = denominator;
        Ok(())
    }

    pub fn set_measures_per_line(&mut self, measures_per_line: u8) -> Result<(), ChordbookError> {
        if measures_per_line == 0 {
            return Err(ChordbookError::InvalidSequence(
                "measures per line must be at least 1".to_string(),
            ));
        }
        self.measures_per_line = measures_per_line;
        Ok(())
    }
}
