//! # Spotify Integration Module
//!
//! Typed access to the two Spotify services the web application talks to:
//!
//! ```text
//! Route handlers (api)
//!          ↓
//!     ├── auth     - accounts service: authorize URL, code exchange, refresh
//!     └── library  - Web API: the current user's saved tracks
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! Both share one `reqwest::Client` owned by the application state. Calls are
//! made inline in the request path with no retry; failures surface as
//! [`Error`] and are turned into an error page by the route handler.
//!
//! The OAuth token obtained by [`auth::SpotifyOAuth`] is cached in the
//! browser's session, never in process-wide state.

pub mod auth;
pub mod library;

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token request rejected with {status}: {error}")]
    Rejected {
        status: StatusCode,
        error: String,
        description: Option<String>,
    },
    #[error("Spotify API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("token response carried no refresh token")]
    MissingRefreshToken,
    #[error(transparent)]
    Session(#[from] SessionError),
}
