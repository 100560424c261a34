//! # Sequence Validation
//!
//! Structural checks for sequences that arrive from outside the editor
//! (files, backend responses, wasm callers).
//!
//! ## Validation Rules
//!
//! ### Time Signature & Layout
//! - Numerator is at least 1
//! - Denominator is a power of two
//! - At least one measure per line
//!
//! ### Measures
//! - `position` equals the measure's index (contiguous, zero-based)
//! - Exactly `numerator` beats, numbered `1..=numerator` in order
//! - Measure ids are unique
//!
//! ## Lint
//!
//! Repeat and ending annotations only affect how barlines are drawn, so an
//! unmatched repeat is not an error. [`lint`] reports them as warnings for
//! editors that want to point them out.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::ChordbookError;
use crate::sequence::{Ending, Sequence, SequenceMeasure};

/// Validate a sequence's structure.
///
/// Measure numbers in errors are 1-indexed.
pub fn validate(sequence: &Sequence) -> Result<(), ChordbookError> {
    validate_settings(sequence)?;

    let mut seen = HashSet::new();
    for (index, measure) in sequence.measures.iter().enumerate() {
        let measure_number = index + 1;
        if !seen.insert(measure.id) {
            return Err(ChordbookError::Validation {
                measure: measure_number,
                message: format!("duplicate measure id {}", measure.id),
            });
        }
        if measure.position != index {
            return Err(ChordbookError::Validation {
                measure: measure_number,
                message: format!("position {} does not match index {}", measure.position, index),
            });
        }
        validate_beats(measure, sequence.time_signature_numerator, measure_number)?;
    }

    Ok(())
}

fn validate_settings(sequence: &Sequence) -> Result<(), ChordbookError> {
    if sequence.time_signature_numerator == 0 {
        return Err(ChordbookError::InvalidSequence(
            "time signature numerator must be at least 1".to_string(),
        ));
    }
    if !sequence.time_signature_denominator.is_power_of_two() {
        return Err(ChordbookError::InvalidSequence(format!(
            "time signature denominator must be a power of two, got {}",
            sequence.time_signature_denominator
        )));
    }
    if sequence.measures_per_line == 0 {
        return Err(ChordbookError::InvalidSequence(
            "measures per line must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_beats(
    measure: &SequenceMeasure,
    numerator: u8,
    measure_number: usize,
) -> Result<(), ChordbookError> {
    if measure.beats.len() != numerator as usize {
        return Err(ChordbookError::Validation {
            measure: measure_number,
            message: format!(
                "expected {} beats, found {}",
                numerator,
                measure.beats.len()
            ),
        });
    }

    for (index, beat) in measure.beats.iter().enumerate() {
        if beat.beat_position as usize != index + 1 {
            return Err(ChordbookError::Validation {
                measure: measure_number,
                message: format!(
                    "beat {} has beat position {}, expected {}",
                    index + 1,
                    beat.beat_position,
                    index + 1
                ),
            });
        }
    }

    Ok(())
}

/// A non-fatal finding about repeat or ending annotations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    /// 1-indexed measure number
    pub measure: usize,
    pub message: String,
}

/// Report unmatched repeats and misplaced endings
pub fn lint(sequence: &Sequence) -> Vec<Warning> {
    let mut warnings = Vec::new();
    lint_repeats(sequence, &mut warnings);
    lint_endings(sequence, &mut warnings);
    warnings.sort_by_key(|w| w.measure);
    warnings
}

fn lint_repeats(sequence: &Sequence, warnings: &mut Vec<Warning>) {
    let mut open_repeat: Option<usize> = None;

    for (i, measure) in sequence.measures.iter().enumerate() {
        let measure_number = i + 1;

        if measure.repeat_start {
            if let Some(start) = open_repeat {
                warnings.push(Warning {
                    measure: measure_number,
                    message: format!(
                        "Repeat start found while the repeat from measure {} is still open",
                        start
                    ),
                });
            }
            open_repeat = Some(measure_number);
        }

        if measure.repeat_end {
            if open_repeat.is_none() && measure_number != 1 {
                // An end repeat with no start repeats from the beginning, which is legal
                // notation; only flag it when an earlier section already closed a repeat.
                let earlier_close = sequence.measures[..i].iter().any(|m| m.repeat_end);
                if earlier_close {
                    warnings.push(Warning {
                        measure: measure_number,
                        message: "Repeat end has no matching repeat start".to_string(),
                    });
                }
            }
            open_repeat = None;
        }
    }

    if let Some(start) = open_repeat {
        warnings.push(Warning {
            measure: start,
            message: "Repeat start has no matching repeat end".to_string(),
        });
    }
}

fn lint_endings(sequence: &Sequence, warnings: &mut Vec<Warning>) {
    for (i, measure) in sequence.measures.iter().enumerate() {
        let measure_number = i + 1;
        match measure.ending {
            Some(Ending::First) if !measure.repeat_end => warnings.push(Warning {
                measure: measure_number,
                message: "First ending should close with a repeat end".to_string(),
            }),
            Some(Ending::Second) => {
                let follows_first = i > 0 && sequence.measures[i - 1].ending == Some(Ending::First);
                if !follows_first {
                    warnings.push(Warning {
                        measure: measure_number,
                        message: "Second ending should immediately follow a first ending"
                            .to_string(),
                    });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::MeasureId;
    use crate::sequence::SequenceBeat;

    #[test]
    fn test_default_sequence_is_valid() {
        assert!(validate(&Sequence::default()).is_ok());
        assert!(validate(&Sequence::new(7, 8, 3)).is_ok());
    }

    #[test]
    fn test_position_gap_is_invalid() {
        let mut sequence = Sequence::default();
        sequence.measures[2].position = 5;
        let err = validate(&sequence).unwrap_err();
        assert_eq!(
            err,
            ChordbookError::Validation {
                measure: 3,
                message: "position 5 does not match index 2".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_beat_count_is_invalid() {
        let mut sequence = Sequence::default();
        sequence.measures[1].beats.pop();
        match validate(&sequence) {
            Err(ChordbookError::Validation { measure, message }) => {
                assert_eq!(measure, 2);
                assert!(message.contains("expected 4 beats, found 3"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_beats_are_invalid() {
        let mut sequence = Sequence::default();
        sequence.measures[0].beats[0] = SequenceBeat::empty(2);
        sequence.measures[0].beats[1] = SequenceBeat::empty(1);
        assert!(validate(&sequence).is_err());
    }

    #[test]
    fn test_duplicate_measure_ids_are_invalid() {
        let mut sequence = Sequence::default();
        let id = MeasureId::new();
        sequence.measures[0].id = id;
        sequence.measures[3].id = id;
        match validate(&sequence) {
            Err(ChordbookError::Validation { measure, .. }) => assert_eq!(measure, 4),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_are_checked() {
        assert!(validate(&Sequence::new(0, 4, 4)).is_err());
        assert!(validate(&Sequence::new(4, 3, 4)).is_err());
        assert!(validate(&Sequence::new(4, 4, 0)).is_err());
    }

    #[test]
    fn test_lint_matched_repeat_with_endings() {
        let mut sequence = Sequence::with_empty_measures(4, 4, 4, 3);
        sequence.measures[0].repeat_start = true;
        sequence.measures[1].repeat_end = true;
        sequence.measures[1].ending = Some(Ending::First);
        sequence.measures[2].ending = Some(Ending::Second);
        assert!(lint(&sequence).is_empty());
    }

    #[test]
    fn test_lint_unclosed_repeat() {
        let mut sequence = Sequence::with_empty_measures(4, 4, 4, 2);
        sequence.measures[1].repeat_start = true;
        let warnings = lint(&sequence);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].measure, 2);
        assert!(warnings[0].message.contains("no matching repeat end"));
    }

    #[test]
    fn test_lint_misplaced_endings() {
        let mut sequence = Sequence::with_empty_measures(4, 4, 4, 2);
        sequence.measures[0].ending = Some(Ending::First);
        sequence.measures[1].ending = Some(Ending::Second);
        let warnings = lint(&sequence);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("repeat end"));

        sequence.measures[0].ending = None;
        let warnings = lint(&sequence);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("immediately follow a first ending")));
    }

    #[test]
    fn test_lint_end_repeat_from_beginning_is_fine() {
        let mut sequence = Sequence::with_empty_measures(4, 4, 4, 3);
        sequence.measures[2].repeat_end = true;
        assert!(lint(&sequence).is_empty());
    }
}
