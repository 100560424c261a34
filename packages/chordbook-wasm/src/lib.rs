use chordbook_core::{
    Chord, ChordId, ChordMap, ChordbookError, DropAction, DropTarget, EditOutcome, Fretboard, Marker,
    Sequence, SequenceEdit, StaffLayout,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
struct BindingError {
    message: String,
    measure: Option<usize>,
}

impl From<ChordbookError> for BindingError {
    fn from(e: ChordbookError) -> Self {
        match e {
            ChordbookError::Validation { measure, message } => BindingError {
                message: format!("Measure {}: {}", measure, message),
                measure: Some(measure),
            },
            other => BindingError {
                message: other.to_string(),
                measure: None,
            },
        }
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(e: serde_json::Error) -> Self {
        BindingError {
            message: format!("Invalid JSON: {}", e),
            measure: None,
        }
    }
}

fn to_js_error(e: BindingError) -> JsValue {
    let json = serde_json::to_string(&e).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", e.message));
    JsValue::from_str(&json)
}

#[derive(Serialize)]
struct Diagnostic {
    message: String,
    measure: usize,
    severity: String,
}

#[derive(Serialize)]
struct EditResult {
    sequence: Sequence,
    outcome: EditOutcome,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FretboardInput {
    markers: Vec<Marker>,
    #[serde(default)]
    string_count: Option<u8>,
    #[serde(default)]
    tuning: Option<String>,
    #[serde(default)]
    starting_fret: u8,
}

impl FretboardInput {
    fn into_fretboard(self) -> Fretboard {
        let mut board = Fretboard::new(self.markers);
        if let Some(string_count) = self.string_count {
            board.string_count = string_count;
        }
        if let Some(tuning) = self.tuning {
            board.tuning = tuning;
        }
        board.starting_fret = self.starting_fret;
        board
    }
}

fn parse_chords(chords_json: &str) -> Result<Vec<Chord>, BindingError> {
    if chords_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(chords_json)?)
}

fn staff_layout(sequence_json: &str, chords_json: &str) -> Result<StaffLayout, BindingError> {
    let sequence = chordbook_core::parse_sequence(sequence_json)?;
    let chords = parse_chords(chords_json)?;
    Ok(chordbook_core::layout(&sequence, &ChordMap::from_chords(&chords)))
}

fn staff_svg(sequence_json: &str, chords_json: &str) -> Result<String, BindingError> {
    let sequence = chordbook_core::parse_sequence(sequence_json)?;
    chordbook_core::validate(&sequence)?;
    let chords = parse_chords(chords_json)?;
    let layout = chordbook_core::layout(&sequence, &ChordMap::from_chords(&chords));
    Ok(chordbook_core::staff_to_svg(&layout))
}

fn fretboard_svg(input_json: &str) -> Result<String, BindingError> {
    let input: FretboardInput = serde_json::from_str(input_json)?;
    Ok(chordbook_core::fretboard_to_svg(&input.into_fretboard()))
}

fn starting_fret(markers_json: &str, saved_start: u8) -> Result<u8, BindingError> {
    let markers: Vec<Marker> = serde_json::from_str(markers_json)?;
    Ok(chordbook_core::auto_starting_fret(&markers, saved_start))
}

fn toggled(markers_json: &str, string: u8, fret: u8) -> Result<String, BindingError> {
    let markers: Vec<Marker> = serde_json::from_str(markers_json)?;
    let markers = chordbook_core::toggle_marker(&markers, Marker::new(string, fret));
    Ok(serde_json::to_string(&markers)?)
}

fn drop_action(dragged: &str, target_json: Option<&str>, chords_json: &str) -> Result<Option<DropAction>, BindingError> {
    let dragged = dragged.parse::<ChordId>().map_err(|e| BindingError {
        message: format!("Invalid chord id: {}", e),
        measure: None,
    })?;
    let target: Option<DropTarget> = match target_json {
        Some(json) => Some(serde_json::from_str(json)?),
        None => None,
    };
    let chords = parse_chords(chords_json)?;
    Ok(chordbook_core::resolve_drop(dragged, target.as_ref(), &chords))
}

fn edited(sequence_json: &str, edit_json: &str) -> Result<String, BindingError> {
    let mut sequence = chordbook_core::parse_sequence(sequence_json)?;
    let edit: SequenceEdit = serde_json::from_str(edit_json)?;
    let outcome = chordbook_core::apply_edit(&mut sequence, &edit)?;
    Ok(serde_json::to_string(&EditResult { sequence, outcome })?)
}

fn reordered(chords_json: &str, from: usize, to: usize) -> Result<String, BindingError> {
    let chords = parse_chords(chords_json)?;
    let chords = chordbook_core::reorder(&chords, from, to).unwrap_or(chords);
    Ok(serde_json::to_string(&chords)?)
}

fn template_search(query: &str) -> Result<String, BindingError> {
    let catalog = chordbook_templates::catalog()?;
    Ok(serde_json::to_string(&catalog.search(query))?)
}

fn diagnostics(sequence_json: &str) -> Vec<Diagnostic> {
    let sequence = match chordbook_core::parse_sequence(sequence_json) {
        Ok(sequence) => sequence,
        Err(e) => {
            return vec![Diagnostic {
                message: e.to_string(),
                measure: 0,
                severity: "error".to_string(),
            }]
        }
    };

    let mut diagnostics = Vec::new();
    if let Err(e) = chordbook_core::validate(&sequence) {
        let measure = match &e {
            ChordbookError::Validation { measure, .. } => *measure,
            _ => 0,
        };
        diagnostics.push(Diagnostic {
            message: e.to_string(),
            measure,
            severity: "error".to_string(),
        });
    }
    diagnostics.extend(chordbook_core::lint(&sequence).into_iter().map(|w| Diagnostic {
        message: w.message,
        measure: w.measure,
        severity: "warning".to_string(),
    }));
    diagnostics
}

/// Lay out a sequence (JSON) as staff lines, measures and beat slots
#[wasm_bindgen]
pub fn layout_staff(sequence_json: &str, chords_json: &str) -> Result<JsValue, JsValue> {
    let layout = staff_layout(sequence_json, chords_json).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&layout).map_err(JsValue::from)
}

/// Render a validated sequence to SVG
#[wasm_bindgen]
pub fn render_staff_svg(sequence_json: &str, chords_json: &str) -> Result<String, JsValue> {
    staff_svg(sequence_json, chords_json).map_err(to_js_error)
}

/// Render a fretboard from `{markers, stringCount?, tuning?, startingFret}`
#[wasm_bindgen]
pub fn render_fretboard_svg(input_json: &str) -> Result<String, JsValue> {
    fretboard_svg(input_json).map_err(to_js_error)
}

/// Tappable cells of a fretboard, for hit areas drawn by the front end
#[wasm_bindgen]
pub fn fretboard_cells(input_json: &str) -> Result<JsValue, JsValue> {
    let input: FretboardInput = serde_json::from_str(input_json)
        .map_err(|e| to_js_error(e.into()))?;
    serde_wasm_bindgen::to_value(&input.into_fretboard().cells()).map_err(JsValue::from)
}

/// Starting fret for the chord editor when opening a saved chord
#[wasm_bindgen]
pub fn auto_starting_fret(markers_json: &str, saved_start: u8) -> Result<u8, JsValue> {
    starting_fret(markers_json, saved_start).map_err(to_js_error)
}

/// Add or remove the marker at (string, fret), returning the new marker list
#[wasm_bindgen]
pub fn toggle_marker(markers_json: &str, string: u8, fret: u8) -> Result<String, JsValue> {
    toggled(markers_json, string, fret).map_err(to_js_error)
}

/// Resolve a drag end into `null`, an `assign_beat` or a `reorder` action
#[wasm_bindgen]
pub fn resolve_drop(dragged_chord_id: &str, target_json: Option<String>, chords_json: &str) -> Result<String, JsValue> {
    drop_action(dragged_chord_id, target_json.as_deref(), chords_json)
        .and_then(|action| Ok(serde_json::to_string(&action)?))
        .map_err(to_js_error)
}

/// Apply a tagged sequence edit, returning `{sequence, outcome}`
#[wasm_bindgen]
pub fn apply_edit(sequence_json: &str, edit_json: &str) -> Result<String, JsValue> {
    edited(sequence_json, edit_json).map_err(to_js_error)
}

/// Move a chord card and renumber positions
#[wasm_bindgen]
pub fn reorder_chords(chords_json: &str, from: usize, to: usize) -> Result<String, JsValue> {
    reordered(chords_json, from, to).map_err(to_js_error)
}

/// Chord templates whose name contains `query`
#[wasm_bindgen]
pub fn templates(query: &str) -> Result<String, JsValue> {
    template_search(query).map_err(to_js_error)
}

/// Validate and lint a sequence, returning diagnostics as a JSON array
#[wasm_bindgen]
pub fn lint(sequence_json: &str) -> String {
    serde_json::to_string(&diagnostics(sequence_json)).unwrap_or_else(|_| "[]".to_string())
}
