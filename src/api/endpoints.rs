//! Typed wrappers for every backend endpoint.
//!
//! | Area          | Endpoints                                                        |
//! |---------------|------------------------------------------------------------------|
//! | auth          | register, login, refresh, me                                     |
//! | projects      | list, get, create, rename, delete                                |
//! | collaborators | list, invite, update status, remove, pending invitations         |
//! | songs         | list, get, create, rename, delete                                |
//! | chords        | list, create, update, delete, reorder                            |
//! | sequence      | get (absent on 404), create, replace, delete                     |

use serde_json::Value;
use tracing::{debug, info, warn};

use chordbook_core::{sort_by_position, Chord, ChordId, CollaboratorId, ProjectId, Sequence, SongId};

use super::client::ApiClient;
use crate::session::Session;
use super::error::ApiError;
use super::transport::{HttpTransport, Method};
use super::types::{
    ChordCreate, ChordResponse, ChordUpdate, Collaborator, CollaboratorRole, CollaboratorStatus,
    Credentials, InviteRequest, NameRequest, PendingInvitation, Project, RefreshRequest,
    RefreshResponse, ReorderRequest, SequenceCreate, SequenceResponse, SequenceUpdate, Song,
    StatusUpdate, TokenPair, User,
};

pub const INVITE_USER_NOT_FOUND: &str = "No user found with that email.";
pub const INVITE_ALREADY_INVITED: &str = "That user already has a pending or accepted invitation.";

/// Banner text for a failed invitation
pub fn invite_error_message(error: &ApiError) -> String {
    match error {
        ApiError::NotFound { .. } => INVITE_USER_NOT_FOUND.to_string(),
        ApiError::Conflict { .. } => INVITE_ALREADY_INVITED.to_string(),
        other => other.user_message(),
    }
}

fn into_chords(responses: Vec<ChordResponse>) -> Vec<Chord> {
    let mut chords: Vec<Chord> = responses.into_iter().map(Chord::from).collect();
    sort_by_position(&mut chords);
    chords
}

impl<T: HttpTransport> ApiClient<T> {
    // Auth

    pub fn register(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::to_value(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.send_anonymous(Method::Post, "/auth/register", Some(body))?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        Ok(response.parse()?)
    }

    /// Log in, persist the refresh token and load the current user
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::to_value(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.send_anonymous(Method::Post, "/auth/login", Some(body))?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        let tokens: TokenPair = response.parse()?;
        self.remember_refresh_token(&tokens.refresh_token);
        self.session = Session::from_tokens(tokens);

        let user = self.me()?;
        self.session.set_user(Some(user.clone()));
        info!(email = %user.email, "signed in");
        Ok(user)
    }

    /// Register, then log in with the same credentials
    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<User, ApiError> {
        self.register(email, password)?;
        self.login(email, password)
    }

    /// Restore a session from the stored refresh token.
    ///
    /// `Ok(None)` when there is nothing to restore or the token was rejected.
    pub fn restore(&mut self) -> Result<Option<User>, ApiError> {
        let stored = self.store.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read stored refresh token");
            None
        });
        let Some(refresh_token) = stored else {
            return Ok(None);
        };

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: refresh_token.clone(),
        })?;
        let response = self.send_anonymous(Method::Post, "/auth/refresh", Some(body))?;
        if !response.is_success() {
            warn!(status = response.status, "stored refresh token rejected");
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "could not clear stored refresh token");
            }
            return Ok(None);
        }

        let refreshed: RefreshResponse = response.parse()?;
        let refresh_token = match refreshed.refresh_token {
            Some(rotated) => {
                self.remember_refresh_token(&rotated);
                rotated
            }
            None => refresh_token,
        };
        self.session.set_access_token(refreshed.access_token);
        self.session.set_refresh_token(Some(refresh_token));

        match self.me() {
            Ok(user) => {
                info!(email = %user.email, "session restored");
                self.session.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "restored token could not load the current user");
                Ok(None)
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear stored refresh token");
        }
        info!("signed out");
    }

    pub fn me(&mut self) -> Result<User, ApiError> {
        if !self.session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        self.get("/auth/me")
    }

    // Projects

    pub fn list_projects(&mut self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects")
    }

    pub fn get_project(&mut self, id: ProjectId) -> Result<Project, ApiError> {
        self.get(&format!("/projects/{}", id))
    }

    pub fn create_project(&mut self, name: &str) -> Result<Project, ApiError> {
        let body = NameRequest { name: name.to_string() };
        self.request(Method::Post, "/projects", Some(&body))
    }

    pub fn rename_project(&mut self, id: ProjectId, name: &str) -> Result<Project, ApiError> {
        let body = NameRequest { name: name.to_string() };
        self.request(Method::Put, &format!("/projects/{}", id), Some(&body))
    }

    pub fn delete_project(&mut self, id: ProjectId) -> Result<(), ApiError> {
        self.delete(&format!("/projects/{}", id))
    }

    // Collaborators

    pub fn list_collaborators(&mut self, project: ProjectId) -> Result<Vec<Collaborator>, ApiError> {
        self.get(&format!("/projects/{}/collaborators", project))
    }

    /// Invite by email; see [`invite_error_message`] for failure text
    pub fn invite_collaborator(
        &mut self,
        project: ProjectId,
        email: &str,
        role: CollaboratorRole,
    ) -> Result<Collaborator, ApiError> {
        let body = InviteRequest {
            identifier: email.trim().to_string(),
            role,
        };
        self.request(Method::Post, &format!("/projects/{}/collaborators", project), Some(&body))
    }

    /// Accept or decline an invitation
    pub fn update_collaborator_status(
        &mut self,
        id: CollaboratorId,
        status: CollaboratorStatus,
    ) -> Result<Collaborator, ApiError> {
        let body = StatusUpdate { status };
        self.request(Method::Patch, &format!("/collaborators/{}", id), Some(&body))
    }

    pub fn remove_collaborator(&mut self, project: ProjectId, id: CollaboratorId) -> Result<(), ApiError> {
        self.delete(&format!("/projects/{}/collaborators/{}", project, id))
    }

    pub fn pending_invitations(&mut self) -> Result<Vec<PendingInvitation>, ApiError> {
        self.get("/collaborators/pending")
    }

    // Songs

    pub fn list_songs(&mut self, project: ProjectId) -> Result<Vec<Song>, ApiError> {
        self.get(&format!("/projects/{}/songs", project))
    }

    pub fn get_song(&mut self, id: SongId) -> Result<Song, ApiError> {
        self.get(&format!("/songs/{}", id))
    }

    pub fn create_song(&mut self, project: ProjectId, name: &str) -> Result<Song, ApiError> {
        let body = NameRequest { name: name.to_string() };
        self.request(Method::Post, &format!("/projects/{}/songs", project), Some(&body))
    }

    pub fn rename_song(&mut self, id: SongId, name: &str) -> Result<Song, ApiError> {
        let body = NameRequest { name: name.to_string() };
        self.request(Method::Put, &format!("/songs/{}", id), Some(&body))
    }

    pub fn delete_song(&mut self, id: SongId) -> Result<(), ApiError> {
        self.delete(&format!("/songs/{}", id))
    }

    // Chords

    /// Chords of a song in display order
    pub fn list_chords(&mut self, song: SongId) -> Result<Vec<Chord>, ApiError> {
        let responses: Vec<ChordResponse> = self.get(&format!("/songs/{}/chords", song))?;
        Ok(into_chords(responses))
    }

    pub fn create_chord(&mut self, song: SongId, chord: &ChordCreate) -> Result<Chord, ApiError> {
        let response: ChordResponse =
            self.request(Method::Post, &format!("/songs/{}/chords", song), Some(chord))?;
        Ok(response.into())
    }

    pub fn update_chord(&mut self, id: ChordId, update: &ChordUpdate) -> Result<Chord, ApiError> {
        let response: ChordResponse = self.request(Method::Put, &format!("/chords/{}", id), Some(update))?;
        Ok(response.into())
    }

    pub fn delete_chord(&mut self, id: ChordId) -> Result<(), ApiError> {
        self.delete(&format!("/chords/{}", id))
    }

    /// Persist a full ordering; the backend answers with the reordered list
    pub fn reorder_chords(&mut self, song: SongId, chord_ids: &[ChordId]) -> Result<Vec<Chord>, ApiError> {
        let body = ReorderRequest {
            chord_ids: chord_ids.to_vec(),
        };
        let responses: Vec<ChordResponse> =
            self.request(Method::Put, &format!("/songs/{}/chords/reorder", song), Some(&body))?;
        Ok(into_chords(responses))
    }

    // Sequence

    /// The song's sequence, or `None` if it has never been saved
    pub fn get_sequence(&mut self, song: SongId) -> Result<Option<Sequence>, ApiError> {
        match self.get::<SequenceResponse>(&format!("/songs/{}/sequence", song)) {
            Ok(response) => Ok(Some(response.into())),
            Err(e) if e.is_not_found() => {
                debug!(song = %song, "song has no sequence yet");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn create_sequence(&mut self, song: SongId, create: &SequenceCreate) -> Result<Sequence, ApiError> {
        let response: SequenceResponse =
            self.request(Method::Post, &format!("/songs/{}/sequence", song), Some(create))?;
        Ok(response.into())
    }

    /// Replace the whole sequence (no partial updates)
    pub fn replace_sequence(&mut self, song: SongId, update: &SequenceUpdate) -> Result<Sequence, ApiError> {
        let response: SequenceResponse =
            self.request(Method::Put, &format!("/songs/{}/sequence", song), Some(update))?;
        Ok(response.into())
    }

    pub fn delete_sequence(&mut self, song: SongId) -> Result<(), ApiError> {
        self.delete(&format!("/songs/{}/sequence", song))
    }

    /// Raw authenticated GET, for endpoints without a typed wrapper
    pub fn get_json(&mut self, path: &str) -> Result<Value, ApiError> {
        self.get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::ScriptedTransport;
    use crate::api::transport::Response;
    use crate::session::MemoryTokenStore;
    use crate::config::ClientConfig;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "id": chordbook_core::UserId::new(),
            "email": "player@example.com",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_login_then_me() {
        let mut transport = ScriptedTransport::new();
        transport
            .expect(
                Method::Post,
                "/api/auth/login",
                Response::json(200, &json!({"access_token": "a", "refresh_token": "r", "token_type": "bearer"})),
            )
            .expect(Method::Get, "/api/auth/me", Response::json(200, &user_json()));
        let mut client = ApiClient::with_transport(transport);

        let user = client.login("player@example.com", "hunter22").unwrap();
        assert_eq!(user.email, "player@example.com");
        assert!(client.session().is_authenticated());
        assert_eq!(client.session().user().map(|u| u.email.as_str()), Some("player@example.com"));
        assert_eq!(client.transport().requests()[1].bearer_token(), Some("a"));
    }

    #[test]
    fn test_login_failure_keeps_detail() {
        let mut transport = ScriptedTransport::new();
        transport.expect(
            Method::Post,
            "/api/auth/login",
            Response::new(401, r#"{"detail": "Invalid email or password"}"#),
        );
        let mut client = ApiClient::with_transport(transport);
        let err = client.login("a@b.c", "wrong").unwrap_err();
        assert_eq!(err.user_message(), "Invalid email or password");
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_restore_and_logout() {
        let mut transport = ScriptedTransport::new();
        transport
            .expect(Method::Post, "/api/auth/refresh", Response::json(200, &json!({"access_token": "a"})))
            .expect(Method::Get, "/api/auth/me", Response::json(200, &user_json()));
        let mut client = ApiClient::new(
            transport,
            &ClientConfig::default(),
            Box::new(MemoryTokenStore::with_token("saved")),
        );

        let user = client.restore().unwrap();
        assert!(user.is_some());
        assert_eq!(client.session().refresh_token(), Some("saved"));

        client.logout();
        assert!(!client.session().is_authenticated());
        assert!(client.restore().unwrap().is_none());
    }

    #[test]
    fn test_restore_with_rejected_token() {
        let mut transport = ScriptedTransport::new();
        transport.expect(Method::Post, "/api/auth/refresh", Response::new(401, ""));
        let mut client = ApiClient::new(
            transport,
            &ClientConfig::default(),
            Box::new(MemoryTokenStore::with_token("stale")),
        );
        assert_eq!(client.restore().unwrap(), None);
        // The stale token is gone, so a second restore sends nothing
        assert_eq!(client.restore().unwrap(), None);
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_missing_sequence_is_none() {
        let song = SongId::new();
        let mut transport = ScriptedTransport::new();
        transport.expect(
            Method::Get,
            format!("/api/songs/{}/sequence", song),
            Response::new(404, r#"{"detail": "Sequence not found"}"#),
        );
        let mut client = ApiClient::with_transport(transport);
        assert_eq!(client.get_sequence(song).unwrap(), None);
    }

    #[test]
    fn test_invite_messages() {
        let project = ProjectId::new();
        let mut transport = ScriptedTransport::new();
        transport
            .expect(
                Method::Post,
                format!("/api/projects/{}/collaborators", project),
                Response::new(404, r#"{"detail": "User not found"}"#),
            )
            .expect(
                Method::Post,
                format!("/api/projects/{}/collaborators", project),
                Response::new(409, r#"{"detail": "duplicate"}"#),
            );
        let mut client = ApiClient::with_transport(transport);

        let err = client
            .invite_collaborator(project, " friend@example.com ", CollaboratorRole::Editor)
            .unwrap_err();
        assert_eq!(invite_error_message(&err), INVITE_USER_NOT_FOUND);
        assert_eq!(
            client.transport().requests()[0].body,
            Some(json!({"identifier": "friend@example.com", "role": "editor"}))
        );

        let err = client
            .invite_collaborator(project, "friend@example.com", CollaboratorRole::Viewer)
            .unwrap_err();
        assert_eq!(invite_error_message(&err), INVITE_ALREADY_INVITED);
    }

    #[test]
    fn test_update_invitation_status() {
        let id = CollaboratorId::new();
        let mut transport = ScriptedTransport::new();
        transport.expect(
            Method::Patch,
            format!("/api/collaborators/{}", id),
            Response::json(
                200,
                &json!({
                    "id": id,
                    "project_id": ProjectId::new(),
                    "inviter_id": chordbook_core::UserId::new(),
                    "invitee_id": chordbook_core::UserId::new(),
                    "role": "viewer",
                    "status": "accepted",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-02T00:00:00Z"
                }),
            ),
        );
        let mut client = ApiClient::with_transport(transport);
        let collaborator = client
            .update_collaborator_status(id, CollaboratorStatus::Accepted)
            .unwrap();
        assert_eq!(collaborator.status, CollaboratorStatus::Accepted);
        assert_eq!(
            client.transport().last_request().and_then(|r| r.body.clone()),
            Some(json!({"status": "accepted"}))
        );
    }
}
