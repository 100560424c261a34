//! Request execution with bearer authentication.
//!
//! ## Refresh policy
//!
//! ```text
//! send(request + Bearer access)
//!   └─ 401 and a token was attached?
//!        └─ POST /auth/refresh { refresh_token }
//!             ├─ ok:     store new access token, resend once, return that response
//!             └─ failed: forget the refresh token, return the original 401
//! ```
//!
//! There is at most one refresh and one retry per request.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;
use super::transport::{HttpTransport, Method, Request, Response};
use super::types::{RefreshRequest, RefreshResponse};
use crate::config::ClientConfig;
use crate::session::{MemoryTokenStore, Session, TokenStore};

pub struct ApiClient<T> {
    transport: T,
    base: String,
    pub(super) session: Session,
    pub(super) store: Box<dyn TokenStore>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, config: &ClientConfig, store: Box<dyn TokenStore>) -> Self {
        Self {
            transport,
            base: config.api_base.trim_end_matches('/').to_string(),
            session: Session::new(),
            store,
        }
    }

    /// Client with the default `/api` base and an in-memory token store
    pub fn with_transport(transport: T) -> Self {
        Self::new(transport, &ClientConfig::default(), Box::new(MemoryTokenStore::new()))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn build(&self, method: Method, path: &str, body: Option<Value>) -> Request {
        let request = Request::new(method, self.url(path));
        match body {
            Some(body) => request.with_body(body),
            None => request,
        }
    }

    /// Send without credentials or retry (login, register, refresh)
    pub(super) fn send_anonymous(&mut self, method: Method, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
        let request = self.build(method, path, body);
        debug!(method = %request.method, path = %request.path, "sending request");
        Ok(self.transport.send(&request)?)
    }

    /// Send with the session's bearer token, refreshing once on 401
    pub fn execute(&mut self, method: Method, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
        let mut request = self.build(method, path, body);
        let token = self.session.access_token().map(str::to_string);
        if let Some(token) = &token {
            request.set_header("Authorization", format!("Bearer {}", token));
        }

        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.send(&request)?;

        if response.status != 401 || token.is_none() {
            return Ok(response);
        }

        warn!(path = %request.path, "access token rejected, refreshing");
        match self.refresh_access_token()? {
            Some(new_token) => {
                request.set_header("Authorization", format!("Bearer {}", new_token));
                debug!(method = %request.method, path = %request.path, "retrying request");
                Ok(self.transport.send(&request)?)
            }
            None => Ok(response),
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns `None` when there is no refresh token or the backend rejects
    /// it; in the latter case the stored token is forgotten.
    pub fn refresh_access_token(&mut self) -> Result<Option<String>, ApiError> {
        let refresh_token = match self.session.refresh_token() {
            Some(token) => Some(token.to_string()),
            None => self.store.load().unwrap_or_else(|e| {
                warn!(error = %e, "could not read stored refresh token");
                None
            }),
        };
        let Some(refresh_token) = refresh_token else {
            return Ok(None);
        };

        let body = serde_json::to_value(RefreshRequest { refresh_token })?;
        let response = self.send_anonymous(Method::Post, "/auth/refresh", Some(body))?;

        if !response.is_success() {
            warn!(status = response.status, "refresh rejected, clearing refresh token");
            self.session.set_refresh_token(None);
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "could not clear stored refresh token");
            }
            return Ok(None);
        }

        let refreshed: RefreshResponse = response.parse()?;
        self.session.set_access_token(refreshed.access_token.clone());
        if let Some(rotated) = refreshed.refresh_token {
            self.remember_refresh_token(&rotated);
            self.session.set_refresh_token(Some(rotated));
        }
        Ok(Some(refreshed.access_token))
    }

    pub(super) fn remember_refresh_token(&mut self, token: &str) {
        if let Err(e) = self.store.save(token) {
            warn!(error = %e, "could not persist refresh token");
        }
    }

    fn body_of<B: Serialize>(body: Option<&B>) -> Result<Option<Value>, ApiError> {
        body.map(serde_json::to_value).transpose().map_err(ApiError::from)
    }

    /// Authenticated call that decodes a JSON reply
    pub fn request<B, R>(&mut self, method: Method, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self.execute(method, path, Self::body_of(body)?)?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        Ok(response.parse()?)
    }

    /// Authenticated call whose reply body is ignored (204 deletes)
    pub fn request_empty<B: Serialize>(&mut self, method: Method, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let response = self.execute(method, path, Self::body_of(body)?)?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        Ok(())
    }

    pub fn get<R: DeserializeOwned>(&mut self, path: &str) -> Result<R, ApiError> {
        self.request::<(), R>(Method::Get, path, None)
    }

    pub fn delete(&mut self, path: &str) -> Result<(), ApiError> {
        self.request_empty::<()>(Method::Delete, path, None)
    }
}
