//! Application layer for chordbook: session, REST client, song controller.
//!
//! The drawing and sequence model lives in `chordbook_core`; the bundled
//! chord shapes in `chordbook_templates`. This crate wires them to a backend.
//!
//! No HTTP stack is bundled. Implement [`HttpTransport`] for your client of
//! choice, or use [`ScriptedTransport`], the in-memory demo transport that
//! replays canned responses, to run the controller offline.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;

pub use api::{ApiClient, ApiError, HttpTransport, ScriptedTransport};
pub use config::ClientConfig;
pub use controller::{ChordEditor, SongDetail, Toast, ToastKind};
pub use error::AppError;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};

use std::path::Path;

use chordbook_core::{render_staff, render_staff_unchecked, Chord, ChordMap, ChordbookError};

/// Parse a chord list document (YAML or JSON)
pub fn parse_chords(source: &str) -> Result<Vec<Chord>, ChordbookError> {
    serde_yaml::from_str(source).map_err(|e| ChordbookError::Parse(e.to_string()))
}

/// Read a sequence file and render it to SVG, labelling beats from `chords`
pub fn render_sequence_file(path: &Path, chords: &[Chord], check: bool) -> Result<String, AppError> {
    let source = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let chords = ChordMap::from_chords(chords);
    let svg = if check {
        render_staff(&source, &chords)?
    } else {
        render_staff_unchecked(&source, &chords)?
    };
    Ok(svg)
}
