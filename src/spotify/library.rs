use reqwest::{Client, Response};
use url::Url;

use super::Error;
use crate::types::{ApiErrorResponse, SavedTracksPage};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Web API client bound to one user's access token.
///
/// Cheap to build; the route handler creates one per request from the
/// validated session token and drops it afterwards.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl LibraryClient {
    pub fn new(http: Client, api_url: &Url, access_token: impl Into<String>) -> Self {
        LibraryClient {
            http,
            api_url: api_url.as_str().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Fetches one page of the current user's saved tracks.
    ///
    /// `limit` is clamped to `1..=50`, the range the endpoint accepts.
    ///
    /// # API Documentation
    ///
    /// `GET /me/tracks?limit={limit}&offset={offset}`, requires the
    /// `user-library-read` scope.
    pub async fn current_user_saved_tracks(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<SavedTracksPage, Error> {
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let response = self
            .http
            .get(format!("{}/me/tracks", self.api_url))
            .query(&[("limit", limit), ("offset", offset)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = check_api_response(response).await?;
        Ok(response.json::<SavedTracksPage>().await?)
    }
}

async fn check_api_response(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_error) => api_error.error.message,
        Err(_) => body,
    };
    Err(Error::Api { status, message })
}
