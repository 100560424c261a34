//! Chords and chord-name lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::ChordId;
use crate::marker::Marker;

pub const DEFAULT_STRING_COUNT: u8 = 6;
pub const DEFAULT_TUNING: &str = "EADGBE";

/// Label shown for chords without a name
pub const UNTITLED: &str = "Untitled";

pub(crate) fn default_string_count() -> u8 {
    DEFAULT_STRING_COUNT
}

pub(crate) fn default_tuning() -> String {
    DEFAULT_TUNING.to_string()
}

/// A chord diagram belonging to a song
///
/// `position` orders chords within their song; it is unique per song and
/// contiguous from 0 after any reorder or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub id: ChordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default = "default_string_count")]
    pub string_count: u8,
    #[serde(default = "default_tuning")]
    pub tuning: String,
    #[serde(default)]
    pub starting_fret: u8,
    #[serde(default)]
    pub position: usize,
}

impl Chord {
    /// An unnamed, empty chord in standard tuning
    pub fn new(id: ChordId) -> Self {
        Self {
            id,
            name: None,
            markers: Vec::new(),
            string_count: DEFAULT_STRING_COUNT,
            tuning: DEFAULT_TUNING.to_string(),
            starting_fret: 0,
            position: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_starting_fret(mut self, starting_fret: u8) -> Self {
        self.starting_fret = starting_fret;
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Display name, falling back to "Untitled" for missing or blank names
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNTITLED,
        }
    }
}

/// Chord id -> display label, used by the staff to label beat slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordMap {
    labels: HashMap<ChordId, String>,
}

impl ChordMap {
    pub fn from_chords(chords: &[Chord]) -> Self {
        Self {
            labels: chords
                .iter()
                .map(|c| (c.id, c.label().to_string()))
                .collect(),
        }
    }

    pub fn insert(&mut self, id: ChordId, label: impl Into<String>) {
        self.labels.insert(id, label.into());
    }

    pub fn label(&self, id: &ChordId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &ChordId) -> bool {
        self.labels.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
