//! Chord templates embedded at build time from `templates/*.yaml`.

use chordbook_core::{ChordTemplate, ChordTemplateCatalog, ChordbookError};

include!(concat!(env!("OUT_DIR"), "/templates.rs"));

/// Get a template by chord name (e.g. "Am")
pub fn get_template(name: &str) -> Result<Option<ChordTemplate>, ChordbookError> {
    TEMPLATES
        .iter()
        .find(|(file, _)| file.strip_suffix(".yaml") == Some(name))
        .map(|(file, content)| ChordTemplate::from_yaml(file, content))
        .transpose()
}

/// Parse every embedded template into a searchable catalog
pub fn catalog() -> Result<ChordTemplateCatalog, ChordbookError> {
    ChordTemplateCatalog::from_documents(TEMPLATES.iter().copied())
}
