use axum::{Extension, extract::State, response::Redirect};

use super::AppError;
use crate::{
    server::{AppState, routes},
    session::Session,
};

pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    match state.oauth.validate_token(&session).await? {
        Some(_) => Ok(Redirect::to(routes::SAVED_SONGS)),
        None => {
            let url = state.oauth.authorize_url(&session).await?;
            Ok(Redirect::to(url.as_str()))
        }
    }
}
