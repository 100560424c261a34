//! # Public API
//!
//! Entry points that take a sequence document and produce a staff.
//!
//! ## Functions
//!
//! - [`parse_sequence()`] - Read a sequence from YAML or JSON
//! - [`render_staff()`] - Parse, validate and render to SVG (recommended)
//! - [`render_staff_unchecked()`] - Skip validation (useful while a sequence is being edited)
//! - [`render_chord()`] - Render a chord's fretboard with the auto-placed fret window
//!
//! ## Typical Usage
//!
//! ```rust
//! use chordbook_core::{render_staff, ChordMap};
//!
//! let source = r#"
//! time_signature_numerator: 3
//! time_signature_denominator: 4
//! measures_per_line: 2
//! measures:
//!   - repeat_start: true
//!   - repeat_end: true
//!     ending_number: 1
//! "#;
//!
//! let svg = render_staff(source, &ChordMap::default())?;
//! assert!(svg.starts_with("<svg"));
//! # Ok::<(), chordbook_core::ChordbookError>(())
//! ```
//!
//! Measures may omit `id`, `position` and `beats`; ids are generated,
//! positions follow document order and missing beats are filled in empty.

use crate::{
    auto_starting_fret, default_beats, fretboard_to_svg, layout, staff_to_svg, validate, Chord,
    ChordMap, ChordbookError, Fretboard, Sequence,
};

/// Parse a sequence document (YAML, or JSON since it is a subset).
///
/// Measures are sorted by `position` when given and renumbered.
///
/// # Errors
/// Returns [`ChordbookError::Parse`] for malformed documents or ending
/// numbers other than 1 and 2.
pub fn parse_sequence(source: &str) -> Result<Sequence, ChordbookError> {
    let mut sequence: Sequence =
        serde_yaml::from_str(source).map_err(|e| ChordbookError::Parse(e.to_string()))?;

    let numerator = sequence.time_signature_numerator;
    for measure in &mut sequence.measures {
        if measure.beats.is_empty() {
            measure.beats = default_beats(numerator);
        }
    }
    sequence.normalize();
    Ok(sequence)
}

/// Parse, validate and render a sequence to SVG.
///
/// # Pipeline
/// 1. Parse the document
/// 2. Validate structure (time signature, positions, beats)
/// 3. Lay out lines and barlines
/// 4. Draw the staff
///
/// # Errors
/// Returns [`ChordbookError`] if parsing or validation fails.
pub fn render_staff(source: &str, chords: &ChordMap) -> Result<String, ChordbookError> {
    let sequence = parse_sequence(source)?;
    validate(&sequence)?;
    Ok(staff_to_svg(&layout(&sequence, chords)))
}

/// Render without validation (useful for partial sequences)
pub fn render_staff_unchecked(source: &str, chords: &ChordMap) -> Result<String, ChordbookError> {
    let sequence = parse_sequence(source)?;
    Ok(staff_to_svg(&layout(&sequence, chords)))
}

/// Render a chord's fretboard with the window the editor would open at
pub fn render_chord(chord: &Chord) -> String {
    let starting_fret = auto_starting_fret(&chord.markers, chord.starting_fret);
    let board = Fretboard::for_chord(chord);
    let fret_count = board.fret_count;
    fretboard_to_svg(&board.with_window(starting_fret, fret_count))
}
