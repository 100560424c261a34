//! Song detail state and its synchronization with the backend.
//!
//! `SongDetail` owns everything the song page shows: the song and its
//! project, the chord list (in position order), the working copy of the
//! chord sequence, the chord editor, an error banner and a transient toast.
//! Every method that talks to the backend takes the [`ApiClient`] by
//! `&mut`, so edits and requests are serialized by ownership.
//!
//! ```text
//! load ──► GET song ──► GET project (optional) ──► GET chords ──► GET sequence
//!                                                                  └─ 404: keep defaults
//!
//! reorder ──► apply locally ──► PUT reorder
//!                                └─ failed: banner + GET chords
//!
//! save_sequence ──► PUT sequence
//!                    └─ 404: POST sequence ──► PUT sequence
//! ```
//!
//! Failures never discard local edits. Backend errors land in the banner
//! (see [`SongDetail::error`]) and are also returned to the caller.

use tracing::{debug, info, warn};

use chordbook_core::{
    apply_edit, auto_starting_fret_with, layout, move_down, move_up, ordered_ids, reorder, resolve_drop,
    step_down, step_up, toggle_marker, Chord, ChordId, ChordMap, ChordTemplate, ChordTemplateCatalog,
    ChordbookError, DropAction, DropTarget, EditOutcome, Fretboard, Marker, MeasureId, RemoveMeasure, Sequence,
    SequenceEdit, SongId, StaffLayout,
};

use crate::api::{
    ApiClient, ApiError, ChordCreate, ChordUpdate, HttpTransport, Project, SequenceCreate, SequenceUpdate,
    Song,
};
use crate::config::ClientConfig;

pub const LOAD_FAILED: &str = "Failed to load song";
pub const UPDATE_CHORD_FAILED: &str = "Failed to update chord";
pub const CREATE_CHORD_FAILED: &str = "Failed to create chord";
pub const DELETE_CHORD_FAILED: &str = "Failed to delete chord";
pub const REORDER_FAILED: &str = "Failed to reorder chords";
pub const SEQUENCE_SAVED: &str = "Sequence saved";
pub const SEQUENCE_SAVE_FAILED: &str = "Failed to save sequence";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Short-lived notification; the front end hides it after a few seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }
}

/// Working state of the chord editor dialog
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEditor {
    chord_id: Option<ChordId>,
    name: String,
    markers: Vec<Marker>,
    starting_fret: u8,
    string_count: u8,
    tuning: String,
    fret_count: u8,
    template_query: String,
}

impl ChordEditor {
    /// Empty editor for a chord that does not exist yet
    pub fn new_chord(fret_count: u8) -> Self {
        let blank = Chord::new(ChordId::new());
        Self {
            chord_id: None,
            name: String::new(),
            markers: Vec::new(),
            starting_fret: 0,
            string_count: blank.string_count,
            tuning: blank.tuning,
            fret_count,
            template_query: String::new(),
        }
    }

    /// Editor for an existing chord, with the window placed so every marker shows
    pub fn for_chord(chord: &Chord, fret_count: u8) -> Self {
        Self {
            chord_id: Some(chord.id),
            name: chord.name.clone().unwrap_or_default(),
            markers: chord.markers.clone(),
            starting_fret: auto_starting_fret_with(&chord.markers, chord.starting_fret, fret_count),
            string_count: chord.string_count,
            tuning: chord.tuning.clone(),
            fret_count,
            template_query: String::new(),
        }
    }

    pub fn chord_id(&self) -> Option<ChordId> {
        self.chord_id
    }

    pub fn is_new(&self) -> bool {
        self.chord_id.is_none()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn starting_fret(&self) -> u8 {
        self.starting_fret
    }

    pub fn toggle_marker(&mut self, marker: Marker) {
        self.markers = toggle_marker(&self.markers, marker);
    }

    /// Toggle the marker under a tap; taps outside the visible grid do nothing
    pub fn tap(&mut self, string: u8, absolute_fret: u8) -> bool {
        let board = self.fretboard();
        let mut tapped = None;
        let hit = board.tap(string, absolute_fret, |marker| tapped = Some(marker));
        if let Some(marker) = tapped {
            self.toggle_marker(marker);
        }
        hit
    }

    /// Replace markers, name and window with a template's
    pub fn apply_template(&mut self, template: &ChordTemplate) {
        self.markers = template.markers.clone();
        self.name = template.name.clone();
        self.starting_fret = template.starting_fret;
        self.string_count = template.string_count;
        self.tuning = template.tuning.clone();
        self.template_query.clear();
    }

    pub fn step_up(&mut self, max_starting_fret: u8) {
        self.starting_fret = step_up(self.starting_fret, max_starting_fret);
    }

    pub fn step_down(&mut self) {
        self.starting_fret = step_down(self.starting_fret);
    }

    pub fn template_query(&self) -> &str {
        &self.template_query
    }

    pub fn set_template_query(&mut self, query: impl Into<String>) {
        self.template_query = query.into();
    }

    /// Templates matching the current search box
    pub fn matching_templates<'a>(&self, catalog: &'a ChordTemplateCatalog) -> Vec<&'a ChordTemplate> {
        catalog.search(&self.template_query)
    }

    /// The board as the dialog draws it
    pub fn fretboard(&self) -> Fretboard {
        let mut board = Fretboard::new(self.markers.clone()).with_window(self.starting_fret, self.fret_count);
        board.string_count = self.string_count;
        board.tuning = self.tuning.clone();
        board
    }

    fn saved_name(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Everything shown on one song's page
#[derive(Debug, Clone)]
pub struct SongDetail {
    song_id: SongId,
    song: Option<Song>,
    project: Option<Project>,
    chords: Vec<Chord>,
    sequence: Sequence,
    sequence_exists: bool,
    editor: Option<ChordEditor>,
    error: Option<String>,
    toast: Option<Toast>,
    fret_count: u8,
    max_starting_fret: u8,
}

impl SongDetail {
    pub fn new(song_id: SongId, config: &ClientConfig) -> Self {
        Self {
            song_id,
            song: None,
            project: None,
            chords: Vec::new(),
            sequence: config.default_sequence(),
            sequence_exists: false,
            editor: None,
            error: None,
            toast: None,
            fret_count: config.fret_count,
            max_starting_fret: config.max_starting_fret,
        }
    }

    pub fn song_id(&self) -> SongId {
        self.song_id
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Chords in display order
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Whether the backend already stores a sequence for this song
    pub fn sequence_exists(&self) -> bool {
        self.sequence_exists
    }

    /// Viewers see the page read-only; unknown roles are treated as editors
    pub fn can_edit(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.my_role)
            .map_or(true, |role| role.can_edit())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// The pending toast, if any; it is shown once
    pub fn take_toast(&mut self) -> Option<Toast> {
        self.toast.take()
    }

    pub fn chord_map(&self) -> ChordMap {
        ChordMap::from_chords(&self.chords)
    }

    pub fn staff(&self) -> StaffLayout {
        layout(&self.sequence, &self.chord_map())
    }

    fn fail(&mut self, message: &str, error: ApiError) -> ApiError {
        warn!(song = %self.song_id, error = %error, "{}", message);
        self.error = Some(message.to_string());
        error
    }

    // Loading

    pub fn load<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        let result = self.try_load(client);
        result.map_err(|e| self.fail(LOAD_FAILED, e))
    }

    fn try_load<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        let song = client.get_song(self.song_id)?;
        match client.get_project(song.project_id) {
            Ok(project) => self.project = Some(project),
            Err(e) => debug!(project = %song.project_id, error = %e, "project unavailable"),
        }
        self.song = Some(song);
        self.fetch_chords(client)?;

        if let Some(sequence) = client.get_sequence(self.song_id)? {
            self.sequence = sequence;
            self.sequence_exists = true;
        }
        info!(song = %self.song_id, chords = self.chords.len(), measures = self.sequence.len(), "song loaded");
        Ok(())
    }

    fn fetch_chords<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        self.chords = client.list_chords(self.song_id)?;
        Ok(())
    }

    // Chord editor

    pub fn editor(&self) -> Option<&ChordEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut ChordEditor> {
        self.editor.as_mut()
    }

    pub fn open_new_chord(&mut self) -> &mut ChordEditor {
        self.editor.insert(ChordEditor::new_chord(self.fret_count))
    }

    /// Open an existing chord; `None` if it is not on this song
    pub fn open_chord(&mut self, id: ChordId) -> Option<&mut ChordEditor> {
        let chord = self.chords.iter().find(|c| c.id == id)?;
        let editor = ChordEditor::for_chord(chord, self.fret_count);
        Some(self.editor.insert(editor))
    }

    pub fn step_starting_fret_up(&mut self) {
        let max = self.max_starting_fret;
        if let Some(editor) = self.editor.as_mut() {
            editor.step_up(max);
        }
    }

    pub fn step_starting_fret_down(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.step_down();
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    /// Create or update the chord being edited, then refetch and close.
    ///
    /// On failure the editor stays open with its contents.
    pub fn save_chord<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        let Some(editor) = self.editor.clone() else {
            return Ok(());
        };

        let result = match editor.chord_id() {
            Some(id) => {
                let update = ChordUpdate {
                    name: editor.saved_name(),
                    markers: Some(editor.markers.clone()),
                    starting_fret: Some(editor.starting_fret),
                    ..ChordUpdate::default()
                };
                client.update_chord(id, &update).map(|_| ())
            }
            None => {
                let create = ChordCreate {
                    name: editor.saved_name(),
                    markers: editor.markers.clone(),
                    string_count: editor.string_count,
                    tuning: editor.tuning.clone(),
                    starting_fret: editor.starting_fret,
                };
                client.create_chord(self.song_id, &create).map(|_| ())
            }
        };
        let result = result.and_then(|()| self.fetch_chords(client));

        match result {
            Ok(()) => {
                debug!(song = %self.song_id, new = editor.is_new(), "chord saved");
                self.editor = None;
                Ok(())
            }
            Err(e) if editor.is_new() => Err(self.fail(CREATE_CHORD_FAILED, e)),
            Err(e) => Err(self.fail(UPDATE_CHORD_FAILED, e)),
        }
    }

    /// Delete a chord and empty every beat that used it
    pub fn delete_chord<T: HttpTransport>(&mut self, client: &mut ApiClient<T>, id: ChordId) -> Result<(), ApiError> {
        let result = client.delete_chord(id).and_then(|()| self.fetch_chords(client));
        if let Err(e) = result {
            return Err(self.fail(DELETE_CHORD_FAILED, e));
        }
        let cleared = self.sequence.clear_chord_references(id);
        debug!(chord = %id, cleared, "chord deleted");
        Ok(())
    }

    // Reordering

    pub fn move_chord_up<T: HttpTransport>(&mut self, client: &mut ApiClient<T>, index: usize) -> Result<(), ApiError> {
        match move_up(&self.chords, index) {
            Some(reordered) => self.commit_order(client, reordered),
            None => Ok(()),
        }
    }

    pub fn move_chord_down<T: HttpTransport>(&mut self, client: &mut ApiClient<T>, index: usize) -> Result<(), ApiError> {
        match move_down(&self.chords, index) {
            Some(reordered) => self.commit_order(client, reordered),
            None => Ok(()),
        }
    }

    /// Finish a drag of chord `dragged` over `target`
    pub fn handle_drop<T: HttpTransport>(
        &mut self,
        client: &mut ApiClient<T>,
        dragged: ChordId,
        target: Option<&DropTarget>,
    ) -> Result<Option<DropAction>, ApiError> {
        let action = resolve_drop(dragged, target, &self.chords);
        match action {
            Some(DropAction::AssignBeat {
                measure_id,
                beat_position,
                chord_id,
            }) => {
                if let Err(e) = self.sequence.assign_chord(measure_id, beat_position, chord_id) {
                    debug!(error = %e, "drop on a beat that no longer exists");
                }
            }
            Some(DropAction::Reorder { from, to }) => {
                if let Some(reordered) = reorder(&self.chords, from, to) {
                    self.commit_order(client, reordered)?;
                }
            }
            None => {}
        }
        Ok(action)
    }

    fn commit_order<T: HttpTransport>(&mut self, client: &mut ApiClient<T>, reordered: Vec<Chord>) -> Result<(), ApiError> {
        self.chords = reordered;
        let ids = ordered_ids(&self.chords);
        if let Err(e) = client.reorder_chords(self.song_id, &ids) {
            let e = self.fail(REORDER_FAILED, e);
            if let Err(refetch) = self.fetch_chords(client) {
                warn!(error = %refetch, "could not refetch chords after failed reorder");
            }
            return Err(e);
        }
        Ok(())
    }

    // Sequence editing

    pub fn add_measure(&mut self) -> MeasureId {
        self.sequence.add_measure()
    }

    /// Remove a measure; one holding chords needs `confirmed`
    pub fn remove_measure(&mut self, id: MeasureId, confirmed: bool) -> Result<RemoveMeasure, ChordbookError> {
        self.sequence.remove_measure(id, confirmed)
    }

    pub fn clear_beat(&mut self, measure_id: MeasureId, beat_position: u8) -> Result<Option<ChordId>, ChordbookError> {
        self.sequence.clear_beat(measure_id, beat_position)
    }

    pub fn assign_chord(
        &mut self,
        measure_id: MeasureId,
        beat_position: u8,
        chord_id: ChordId,
    ) -> Result<Option<ChordId>, ChordbookError> {
        self.sequence.assign_chord(measure_id, beat_position, chord_id)
    }

    /// Any other edit: annotations, time signature, measures per line
    pub fn edit_sequence(&mut self, edit: &SequenceEdit) -> Result<EditOutcome, ChordbookError> {
        apply_edit(&mut self.sequence, edit)
    }

    /// Replace the stored sequence with the working copy.
    ///
    /// The outcome is reported through a toast.
    pub fn save_sequence<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        match self.try_save_sequence(client) {
            Ok(()) => {
                self.sequence_exists = true;
                self.toast = Some(Toast::success(SEQUENCE_SAVED));
                info!(song = %self.song_id, measures = self.sequence.len(), "sequence saved");
                Ok(())
            }
            Err(e) => {
                warn!(song = %self.song_id, error = %e, "sequence save failed");
                self.toast = Some(Toast::error(SEQUENCE_SAVE_FAILED));
                Err(e)
            }
        }
    }

    fn try_save_sequence<T: HttpTransport>(&mut self, client: &mut ApiClient<T>) -> Result<(), ApiError> {
        self.sequence.renumber();
        let update = SequenceUpdate::from(&self.sequence);
        match client.replace_sequence(self.song_id, &update) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(song = %self.song_id, "no stored sequence, creating one");
                client.create_sequence(self.song_id, &SequenceCreate::from(&self.sequence))?;
                self.sequence_exists = true;
                client.replace_sequence(self.song_id, &update)?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordbook_core::auto_starting_fret;
    use pretty_assertions::assert_eq;

    fn chord_at(frets: &[(u8, u8)], starting_fret: u8) -> Chord {
        Chord::new(ChordId::new())
            .with_name("X")
            .with_markers(frets.iter().map(|&(s, f)| Marker::new(s, f)).collect())
            .with_starting_fret(starting_fret)
    }

    #[test]
    fn test_editor_opens_with_auto_window() {
        let chord = chord_at(&[(0, 8), (1, 10)], 0);
        let editor = ChordEditor::for_chord(&chord, 5);
        assert_eq!(editor.starting_fret(), auto_starting_fret(&chord.markers, 0));
        assert_eq!(editor.starting_fret(), 7);
        assert_eq!(editor.name(), "X");
        assert!(!editor.is_new());
    }

    #[test]
    fn test_editor_steps_are_clamped() {
        let mut editor = ChordEditor::new_chord(5);
        editor.step_down();
        assert_eq!(editor.starting_fret(), 0);
        for _ in 0..30 {
            editor.step_up(19);
        }
        assert_eq!(editor.starting_fret(), 19);
    }

    #[test]
    fn test_editor_tap_toggles() {
        let mut editor = ChordEditor::new_chord(5);
        assert!(editor.tap(2, 3));
        assert_eq!(editor.markers(), &[Marker::new(2, 3)]);
        assert!(editor.tap(2, 3));
        assert!(editor.markers().is_empty());
        // Fret 9 is outside the 0..=5 window
        assert!(!editor.tap(2, 9));
        assert!(editor.markers().is_empty());
    }

    #[test]
    fn test_apply_template() {
        let template = ChordTemplate {
            name: "Am".to_string(),
            markers: vec![Marker::new(1, 1), Marker::new(2, 2), Marker::new(3, 2)],
            string_count: 6,
            tuning: "EADGBE".to_string(),
            starting_fret: 0,
        };
        let mut editor = ChordEditor::new_chord(5);
        editor.set_template_query("am");
        editor.step_up(19);
        editor.apply_template(&template);
        assert_eq!(editor.name(), "Am");
        assert_eq!(editor.markers().len(), 3);
        assert_eq!(editor.starting_fret(), 0);
        assert_eq!(editor.template_query(), "");
    }

    #[test]
    fn test_blank_name_is_not_saved() {
        let mut editor = ChordEditor::new_chord(5);
        editor.set_name("   ");
        assert_eq!(editor.saved_name(), None);
        editor.set_name(" G7 ");
        assert_eq!(editor.saved_name(), Some("G7".to_string()));
    }

    #[test]
    fn test_fresh_page_uses_config_defaults() {
        let config = ClientConfig::default();
        let page = SongDetail::new(SongId::new(), &config);
        assert_eq!(page.sequence().len(), config.default_measure_count);
        assert!(!page.sequence_exists());
        assert!(page.can_edit());
        assert_eq!(page.error(), None);
    }
}
