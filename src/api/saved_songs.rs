use axum::{
    Extension,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::AppError;
use crate::{
    server::AppState,
    session::Session,
    spotify::library::{DEFAULT_PAGE_LIMIT, LibraryClient},
    types::SavedSong,
};

#[derive(Debug, Default, Deserialize)]
pub struct SavedSongsParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn get_saved_songs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<SavedSongsParams>,
) -> Result<Response, AppError> {
    let Some(token) = state.oauth.validate_token(&session).await? else {
        let url = state.oauth.authorize_url(&session).await?;
        return Ok(Redirect::to(url.as_str()).into_response());
    };

    let client = LibraryClient::new(state.http.clone(), &state.config.api_url, token.access_token);
    let page = client
        .current_user_saved_tracks(
            params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            params.offset.unwrap_or(0),
        )
        .await?;

    let songs = SavedSong::from_page(page);
    Ok(Html(render_saved_songs(&songs)).into_response())
}

/// Renders songs as `<name> by <artist1, artist2>` lines joined by `<br>`.
pub fn render_saved_songs(songs: &[SavedSong]) -> String {
    songs
        .iter()
        .map(|song| html_escape::encode_text(&song.to_string()).into_owned())
        .collect::<Vec<_>>()
        .join("<br>")
}
