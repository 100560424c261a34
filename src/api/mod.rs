//! Client for the chordbook REST backend.
//!
//! ```text
//! ApiClient ──► execute (bearer, refresh-once) ──► HttpTransport::send
//!     │                                                 │
//!     └─ endpoints.rs: typed wrappers                   ├─ your HTTP stack
//!                                                       └─ ScriptedTransport (tests, demos)
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use endpoints::{invite_error_message, INVITE_ALREADY_INVITED, INVITE_USER_NOT_FOUND};
pub use error::ApiError;
pub use scripted::ScriptedTransport;
pub use transport::{HttpTransport, Method, Request, Response, TransportError};
pub use types::*;
