//! # chordbook-core
//!
//! The model behind a guitar-chord diagram editor: fretboard markers, chord
//! templates, fret-window placement, chord sequences laid out as a staff of
//! measures and beats, drag-and-drop dispatch and chord reordering.
//!
//! Everything here is pure and synchronous. Networking, sessions and the
//! song controller live in the `chordbook` application crate.

pub mod api;
pub mod chord;
pub mod dnd;
pub mod edit;
pub mod error;
pub mod fret_window;
pub mod fretboard;
pub mod ids;
pub mod marker;
pub mod reorder;
pub mod sequence;
pub mod staff;
pub mod svg;
pub mod template;
pub mod validate;

pub use api::*;
pub use chord::*;
pub use dnd::*;
pub use edit::*;
pub use error::*;
pub use fret_window::*;
pub use fretboard::*;
pub use ids::*;
pub use marker::*;
pub use reorder::*;
pub use sequence::*;
pub use staff::*;
pub use svg::{fretboard_to_svg, staff_to_svg};
pub use template::*;
pub use validate::{lint, validate, Warning};
