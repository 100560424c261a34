//! Sequence edits as data.
//!
//! Front ends that cannot call [`Sequence`] methods directly (the wasm
//! bindings, scripted tests) describe an edit as a tagged value and apply it
//! with [`apply_edit`].
//!
//! ```json
//! { "kind": "assign_chord", "measure_id": "…", "beat_position": 2, "chord_id": "…" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ChordbookError;
use crate::ids::{ChordId, MeasureId};
use crate::sequence::{RemoveMeasure, Sequence};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceEdit {
    AddMeasure,
    RemoveMeasure {
        measure_id: MeasureId,
        #[serde(default)]
        confirmed: bool,
    },
    AssignChord {
        measure_id: MeasureId,
        beat_position: u8,
        chord_id: ChordId,
    },
    ClearBeat {
        measure_id: MeasureId,
        beat_position: u8,
    },
    ToggleRepeatStart {
        measure_id: MeasureId,
    },
    ToggleRepeatEnd {
        measure_id: MeasureId,
    },
    SetEnding {
        measure_id: MeasureId,
        ending_number: Option<u8>,
    },
    SetTimeSignature {
        numerator: u8,
        denominator: u8,
    },
    SetMeasuresPerLine {
        measures_per_line: u8,
    },
}

/// What applying an edit did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Applied,
    AddedMeasure { measure_id: MeasureId },
    /// Removal of a measure with chords was requested without confirmation
    NeedsConfirmation { assigned_chords: usize },
}

/// Apply one edit to `sequence`.
///
/// On error the sequence is unchanged.
pub fn apply_edit(sequence: &mut Sequence, edit: &SequenceEdit) -> Result<EditOutcome, ChordbookError> {
    match *edit {
        SequenceEdit::AddMeasure => Ok(EditOutcome::AddedMeasure {
            measure_id: sequence.add_measure(),
        }),
        SequenceEdit::RemoveMeasure {
            measure_id,
            confirmed,
        } => match sequence.remove_measure(measure_id, confirmed)? {
            RemoveMeasure::Removed(_) => Ok(EditOutcome::Applied),
            RemoveMeasure::NeedsConfirmation { assigned_chords } => {
                Ok(EditOutcome::NeedsConfirmation { assigned_chords })
            }
        },
        SequenceEdit::AssignChord {
            measure_id,
            beat_position,
            chord_id,
        } => {
            sequence.assign_chord(measure_id, beat_position, chord_id)?;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::ClearBeat {
            measure_id,
            beat_position,
        } => {
            sequence.clear_beat(measure_id, beat_position)?;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::ToggleRepeatStart { measure_id } => {
            sequence.toggle_repeat_start(measure_id)?;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::ToggleRepeatEnd { measure_id } => {
            sequence.toggle_repeat_end(measure_id)?;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::SetEnding {
            measure_id,
            ending_number,
        } => {
            sequence.set_ending(measure_id, ending_number)?;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::SetTimeSignature {
            numerator,
            denominator,
        } => {
            // Check the denominator first so a bad value leaves the beats untouched
            let mut next = sequence.clone();
            next.set_denominator(denominator)?;
            next.set_numerator(numerator)?;
            *sequence = next;
            Ok(EditOutcome::Applied)
        }
        SequenceEdit::SetMeasuresPerLine { measures_per_line } => {
            sequence.set_measures_per_line(measures_per_line)?;
            Ok(EditOutcome::Applied)
        }
    }
}
