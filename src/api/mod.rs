//! # API Module
//!
//! HTTP route handlers of the web application.
//!
//! ## Endpoints
//!
//! - [`home`] - `GET /`: sends the browser to Spotify's consent page, or to
//!   the saved songs when the session already holds a usable token.
//! - [`callback`] - `GET /callback?code=..`: completes the authorization-code
//!   flow and caches the token in the session.
//! - [`get_saved_songs`] - `GET /get_saved_songs`: renders the user's saved
//!   tracks as HTML, one `<name> by <artists>` line per track.
//! - [`logout`] - `GET /logout`: clears the session.
//! - [`health`] - `GET /health`: status and version for monitoring.
//!
//! Every handler except `health` receives the browser's
//! [`Session`](crate::session::Session) from the session middleware. The
//! handlers only branch on whether the cached token is valid; token storage,
//! refresh and API calls are delegated to [`crate::spotify`].

mod callback;
mod error;
mod health;
mod home;
mod logout;
mod saved_songs;

pub use callback::{CallbackParams, callback};
pub use error::AppError;
pub use health::health;
pub use home::home;
pub use logout::logout;
pub use saved_songs::{SavedSongsParams, get_saved_songs, render_saved_songs};
