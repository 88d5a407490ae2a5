use axum::{
    Extension,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use super::AppError;
use crate::{
    info,
    server::{AppState, routes},
    session::Session,
};

/// Query parameters Spotify appends when redirecting back to us.
///
/// On approval `code` is set; when the user declines, `error` carries the
/// reason (e.g. `access_denied`). `state` echoes the value we sent with the
/// authorization request.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub state: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    if let Some(reason) = params.error {
        return Err(AppError::AuthorizationDenied(reason));
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingCode)?;

    if !state
        .oauth
        .verify_state(&session, params.state.as_deref())
        .await?
    {
        return Err(AppError::StateMismatch);
    }

    let token = state.oauth.get_access_token(&session, &code).await?;
    info!("Authorization completed, token valid for {}s", token.expires_in);

    Ok(Redirect::to(routes::SAVED_SONGS))
}
