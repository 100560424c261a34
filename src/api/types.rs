//! Wire types for the REST backend.
//!
//! Field names follow the backend's JSON (snake_case). Responses convert
//! into the `chordbook_core` model with `From`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use chordbook_core::{
    Chord, ChordId, CollaboratorId, Ending, Marker, MeasureId, ProjectId, Sequence,
    SequenceBeat, SequenceId, SequenceMeasure, SongId, UserId, DEFAULT_STRING_COUNT,
    DEFAULT_TUNING,
};

/// Backend timestamps; naive values are taken as UTC
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(value) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(value.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

// Auth

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Reply to a refresh; some deployments rotate the refresh token too
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

// Projects, songs, collaborators

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl ProjectRole {
    /// Owners, admins and editors may change chords and sequences
    pub fn can_edit(self) -> bool {
        !matches!(self, ProjectRole::Viewer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub user_id: UserId,
    #[serde(default)]
    pub my_role: Option<ProjectRole>,
    #[serde(default)]
    pub shared_by: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub project_id: ProjectId,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRequest {
    /// Email address of the invitee
    pub identifier: String,
    pub role: CollaboratorRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: CollaboratorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub project_id: ProjectId,
    pub inviter_id: UserId,
    pub invitee_id: UserId,
    pub role: CollaboratorRole,
    pub status: CollaboratorStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInvitation {
    pub id: CollaboratorId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub inviter_email: String,
    pub role: CollaboratorRole,
    pub status: CollaboratorStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

// Chords

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordResponse {
    pub id: ChordId,
    pub name: Option<String>,
    pub markers: Vec<Marker>,
    pub position: usize,
    pub string_count: u8,
    pub tuning: String,
    pub starting_fret: u8,
    pub song_id: SongId,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl From<ChordResponse> for Chord {
    fn from(response: ChordResponse) -> Self {
        Chord {
            id: response.id,
            name: response.name,
            markers: response.markers,
            string_count: response.string_count,
            tuning: response.tuning,
            starting_fret: response.starting_fret,
            position: response.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordCreate {
    pub name: Option<String>,
    pub markers: Vec<Marker>,
    pub string_count: u8,
    pub tuning: String,
    pub starting_fret: u8,
}

impl Default for ChordCreate {
    fn default() -> Self {
        Self {
            name: None,
            markers: Vec::new(),
            string_count: DEFAULT_STRING_COUNT,
            tuning: DEFAULT_TUNING.to_string(),
            starting_fret: 0,
        }
    }
}

/// Partial update; absent fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Marker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_fret: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub chord_ids: Vec<ChordId>,
}

// Sequence

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceBeatResponse {
    pub id: uuid::Uuid,
    pub measure_id: MeasureId,
    pub beat_position: u8,
    pub chord_id: Option<ChordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMeasureResponse {
    pub id: MeasureId,
    pub sequence_id: SequenceId,
    pub position: usize,
    pub repeat_start: bool,
    pub repeat_end: bool,
    /// Stored as a plain integer; only 1 and 2 are drawn
    pub ending_number: Option<u8>,
    pub beats: Vec<SequenceBeatResponse>,
}

impl SequenceMeasureResponse {
    /// The ending bracket, ignoring numbers the editor cannot draw
    pub fn ending(&self) -> Option<Ending> {
        let number = self.ending_number?;
        match Ending::try_from(number) {
            Ok(ending) => Some(ending),
            Err(e) => {
                warn!(measure = %self.id, error = %e, "ignoring unsupported ending number");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResponse {
    pub id: SequenceId,
    pub song_id: SongId,
    pub time_signature_numerator: u8,
    pub time_signature_denominator: u8,
    pub measures_per_line: u8,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub measures: Vec<SequenceMeasureResponse>,
}

impl From<SequenceResponse> for Sequence {
    fn from(response: SequenceResponse) -> Self {
        let mut sequence = Sequence::new(
            response.time_signature_numerator,
            response.time_signature_denominator,
            response.measures_per_line,
        );
        sequence.measures = response
            .measures
            .into_iter()
            .map(|measure| SequenceMeasure {
                ending: measure.ending(),
                id: measure.id,
                position: measure.position,
                repeat_start: measure.repeat_start,
                repeat_end: measure.repeat_end,
                beats: measure
                    .beats
                    .into_iter()
                    .map(|beat| SequenceBeat {
                        beat_position: beat.beat_position,
                        chord_id: beat.chord_id,
                    })
                    .collect(),
            })
            .collect();
        sequence.normalize();
        sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceCreate {
    pub time_signature_numerator: u8,
    pub time_signature_denominator: u8,
    pub measures_per_line: u8,
}

impl From<&Sequence> for SequenceCreate {
    fn from(sequence: &Sequence) -> Self {
        Self {
            time_signature_numerator: sequence.time_signature_numerator,
            time_signature_denominator: sequence.time_signature_denominator,
            measures_per_line: sequence.measures_per_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceBeatIn {
    pub beat_position: u8,
    pub chord_id: Option<ChordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMeasureIn {
    pub position: usize,
    pub repeat_start: bool,
    pub repeat_end: bool,
    pub ending_number: Option<Ending>,
    pub beats: Vec<SequenceBeatIn>,
}

/// Full replacement payload for `PUT /songs/{id}/sequence`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceUpdate {
    pub time_signature_numerator: u8,
    pub time_signature_denominator: u8,
    pub measures_per_line: u8,
    pub measures: Vec<SequenceMeasureIn>,
}

impl From<&Sequence> for SequenceUpdate {
    /// Positions are taken from list order
    fn from(sequence: &Sequence) -> Self {
        Self {
            time_signature_numerator: sequence.time_signature_numerator,
            time_signature_denominator: sequence.time_signature_denominator,
            measures_per_line: sequence.measures_per_line,
            measures: sequence
                .measures
                .iter()
                .enumerate()
                .map(|(position, measure)| SequenceMeasureIn {
                    position,
                    repeat_start: measure.repeat_start,
                    repeat_end: measure.repeat_end,
                    ending_number: measure.ending,
                    beats: measure
                        .beats
                        .iter()
                        .map(|beat| SequenceBeatIn {
                            beat_position: beat.beat_position,
                            chord_id: beat.chord_id,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_chord_response_into_chord() {
        let id = ChordId::new();
        let response: ChordResponse = serde_json::from_value(json!({
            "id": id,
            "name": null,
            "markers": [{"string": 1, "fret": 1}],
            "position": 2,
            "string_count": 6,
            "tuning": "EADGBE",
            "starting_fret": 0,
            "song_id": SongId::new(),
            "created_at": "2024-03-01T10:00:00.123456",
            "updated_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let chord = Chord::from(response);
        assert_eq!(chord.id, id);
        assert_eq!(chord.label(), "Untitled");
        assert_eq!(chord.position, 2);
    }

    #[test]
    fn test_sequence_response_is_sorted() {
        let sequence_id = SequenceId::new();
        let first = MeasureId::new();
        let second = MeasureId::new();
        let chord = ChordId::new();
        let beat = |measure: MeasureId, position: u8, chord_id: Option<ChordId>| {
            json!({"id": uuid::Uuid::new_v4(), "measure_id": measure, "beat_position": position, "chord_id": chord_id})
        };
        let response: SequenceResponse = serde_json::from_value(json!({
            "id": sequence_id,
            "song_id": SongId::new(),
            "time_signature_numerator": 2,
            "time_signature_denominator": 4,
            "measures_per_line": 4,
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": "2024-03-01T10:00:00+00:00",
            "measures": [
                {"id": second, "sequence_id": sequence_id, "position": 1, "repeat_start": false,
                 "repeat_end": true, "ending_number": 1,
                 "beats": [beat(second, 2, None), beat(second, 1, Some(chord))]},
                {"id": first, "sequence_id": sequence_id, "position": 0, "repeat_start": true,
                 "repeat_end": false, "ending_number": null,
                 "beats": [beat(first, 1, None), beat(first, 2, None)]}
            ]
        }))
        .unwrap();

        let sequence = Sequence::from(response);
        assert_eq!(sequence.measures[0].id, first);
        assert_eq!(sequence.measures[1].id, second);
        assert_eq!(sequence.measures[1].ending, Some(Ending::First));
        assert_eq!(sequence.measures[1].beats[0].chord_id, Some(chord));
        assert!(chordbook_core::validate(&sequence).is_ok());
    }

    fn measure_json(sequence_id: SequenceId, position: usize, ending: Option<u8>, beats: u8) -> serde_json::Value {
        let id = MeasureId::new();
        let beats: Vec<serde_json::Value> = (1..=beats)
            .map(|b| json!({"id": uuid::Uuid::new_v4(), "measure_id": id, "beat_position": b, "chord_id": null}))
            .collect();
        json!({"id": id, "sequence_id": sequence_id, "position": position, "repeat_start": false,
               "repeat_end": false, "ending_number": ending, "beats": beats})
    }

    fn response_json(numerator: u8, measures: Vec<serde_json::Value>, sequence_id: SequenceId) -> serde_json::Value {
        json!({
            "id": sequence_id,
            "song_id": SongId::new(),
            "time_signature_numerator": numerator,
            "time_signature_denominator": 8,
            "measures_per_line": 4,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z",
            "measures": measures
        })
    }

    #[test]
    fn test_sequence_response_beats_follow_numerator() {
        let sequence_id = SequenceId::new();
        let body = response_json(
            6,
            vec![measure_json(sequence_id, 0, None, 4), measure_json(sequence_id, 1, None, 7)],
            sequence_id,
        );
        let response: SequenceResponse = serde_json::from_value(body).unwrap();
        let mut sequence = Sequence::from(response);

        for measure in &sequence.measures {
            let positions: Vec<u8> = measure.beats.iter().map(|b| b.beat_position).collect();
            assert_eq!(positions, vec![1, 2, 3, 4, 5, 6]);
        }
        let first = sequence.measures[0].id;
        assert!(sequence.assign_chord(first, 6, ChordId::new()).is_ok());
        assert!(chordbook_core::validate(&sequence).is_ok());
    }

    #[test]
    fn test_unsupported_ending_is_ignored() {
        let sequence_id = SequenceId::new();
        let body = response_json(
            3,
            vec![
                measure_json(sequence_id, 0, Some(3), 3),
                measure_json(sequence_id, 1, Some(2), 3),
                measure_json(sequence_id, 2, Some(0), 3),
            ],
            sequence_id,
        );
        let response: SequenceResponse = serde_json::from_value(body).unwrap();
        let sequence = Sequence::from(response);

        let endings: Vec<Option<Ending>> = sequence.measures.iter().map(|m| m.ending).collect();
        assert_eq!(endings, vec![None, Some(Ending::Second), None]);
    }

    #[test]
    fn test_sequence_update_payload() {
        let mut sequence = Sequence::default();
        sequence.measures[2].ending = Some(Ending::Second);
        let payload = serde_json::to_value(SequenceUpdate::from(&sequence)).unwrap();
        assert_eq!(payload["measures"][2]["position"], 2);
        assert_eq!(payload["measures"][2]["ending_number"], 2);
        assert_eq!(payload["measures"][0]["beats"][3]["beat_position"], 4);
        assert!(payload["measures"][0]["beats"][0]["chord_id"].is_null());
        assert!(payload["measures"][0].get("id").is_none());
    }

    #[test]
    fn test_chord_update_skips_absent_fields() {
        let update = ChordUpdate {
            starting_fret: Some(3),
            ..ChordUpdate::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"starting_fret": 3}));
        assert_eq!(
            serde_json::to_value(CollaboratorStatus::Accepted).unwrap(),
            json!("accepted")
        );
    }
}
