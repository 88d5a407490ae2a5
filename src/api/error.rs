use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::{session::SessionError, spotify, warning};

/// Failures a route handler answers with an error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("callback request carried no authorization code")]
    MissingCode,
    #[error("authorization was denied: {0}")]
    AuthorizationDenied(String),
    #[error("callback state does not match the authorization request")]
    StateMismatch,
    #[error(transparent)]
    Spotify(#[from] spotify::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warning!("Request failed: {}", self);

        let (status, body) = match &self {
            AppError::MissingCode => (
                StatusCode::BAD_REQUEST,
                "<h4>Missing authorization code.</h4>".to_string(),
            ),
            AppError::AuthorizationDenied(reason) => (
                StatusCode::FORBIDDEN,
                format!("<h4>Login failed.</h4><p>{}</p>", html_escape::encode_text(reason)),
            ),
            AppError::StateMismatch => (
                StatusCode::FORBIDDEN,
                "<h4>Login failed.</h4><p>Authorization request expired, please try again.</p>"
                    .to_string(),
            ),
            AppError::Session(_) | AppError::Spotify(spotify::Error::Session(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "<h4>Session error.</h4>".to_string(),
            ),
            AppError::Spotify(spotify::Error::Rejected { .. })
            | AppError::Spotify(spotify::Error::MissingRefreshToken) => (
                StatusCode::BAD_GATEWAY,
                "<h4>Login failed.</h4>".to_string(),
            ),
            AppError::Spotify(_) => (
                StatusCode::BAD_GATEWAY,
                "<h4>Spotify request failed.</h4>".to_string(),
            ),
        };

        (status, Html(body)).into_response()
    }
}
