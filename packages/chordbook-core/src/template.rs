//! # Chord Templates
//!
//! Templates pre-fill the chord editor with a known voicing. Each template is
//! a small YAML document:
//!
//! ```yaml
//! name: Am
//! string_count: 6
//! tuning: EADGBE
//! starting_fret: 0
//! markers:
//!   - { string: 3, fret: 2 }
//!   - { string: 2, fret: 2 }
//!   - { string: 1, fret: 1 }
//! ```
//!
//! `string_count`, `tuning` and `starting_fret` are optional and default to a
//! six-string guitar in standard tuning with the window at the nut.

use serde::{Deserialize, Serialize};

use crate::chord::{default_string_count, default_tuning};
use crate::error::ChordbookError;
use crate::marker::{dedup_markers, Marker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTemplate {
    pub name: String,
    pub markers: Vec<Marker>,
    #[serde(default = "default_string_count")]
    pub string_count: u8,
    #[serde(default = "default_tuning")]
    pub tuning: String,
    #[serde(default)]
    pub starting_fret: u8,
}

impl ChordTemplate {
    /// Parse a single template document.
    ///
    /// `source_name` is only used in error messages (usually the file name).
    pub fn from_yaml(source_name: &str, content: &str) -> Result<Self, ChordbookError> {
        let mut template: ChordTemplate =
            serde_yaml::from_str(content).map_err(|e| ChordbookError::Template {
                name: source_name.to_string(),
                message: e.to_string(),
            })?;

        if template.name.trim().is_empty() {
            return Err(ChordbookError::Template {
                name: source_name.to_string(),
                message: "name cannot be empty".to_string(),
            });
        }

        if let Some(marker) = template
            .markers
            .iter()
            .find(|m| m.string >= template.string_count)
        {
            return Err(ChordbookError::Template {
                name: source_name.to_string(),
                message: format!(
                    "marker on string {} but the template only has {} strings",
                    marker.string, template.string_count
                ),
            });
        }

        template.markers = dedup_markers(&template.markers);
        Ok(template)
    }

    /// Case-insensitive substring match on the template name
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.trim().to_lowercase())
    }
}

/// The set of templates offered by the editor's template browser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordTemplateCatalog {
    templates: Vec<ChordTemplate>,
}

impl ChordTemplateCatalog {
    /// Build a catalog; templates are kept sorted by name
    pub fn new(mut templates: Vec<ChordTemplate>) -> Self {
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Self { templates }
    }

    /// Parse a catalog from `(source name, YAML content)` pairs
    pub fn from_documents<'a, I>(documents: I) -> Result<Self, ChordbookError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let templates = documents
            .into_iter()
            .map(|(name, content)| ChordTemplate::from_yaml(name, content))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(templates))
    }

    /// Templates whose name contains `query`; an empty query returns everything
    pub fn search(&self, query: &str) -> Vec<&ChordTemplate> {
        self.templates.iter().filter(|t| t.matches(query)).collect()
    }

    /// Exact (case-sensitive) lookup, so "A" and "a" stay distinct chords
    pub fn get(&self, name: &str) -> Option<&ChordTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChordTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
