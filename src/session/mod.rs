//! # Session Module
//!
//! Per-browser sessions for the web application. A signed cookie carries an
//! opaque session id; the data itself lives in a [`SessionStore`] backend on
//! the server. Handlers receive a [`Session`] handle through the request
//! extensions and never touch cookies directly.
//!
//! The cookie key is generated per process, so restarting the server
//! invalidates every session that was handed out before.

mod handle;
mod layer;
mod store;

use thiserror::Error;

pub use handle::Session;
pub use layer::{SESSION_COOKIE, session_layer};
pub use store::{DEFAULT_IDLE_TIMEOUT, MemoryStore, SessionStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("session backend failure: {0}")]
    Backend(String),
}
