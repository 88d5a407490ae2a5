use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds before the real expiry at which a token already counts as expired.
pub const TOKEN_EXPIRY_MARGIN: i64 = 60;

/// Cached OAuth token info, stored in the session under [`TOKEN_INFO_KEY`].
///
/// [`TOKEN_INFO_KEY`]: crate::spotify::auth::TOKEN_INFO_KEY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: i64,
    pub refresh_token: String,
    pub scope: String,
}

impl Token {
    /// Builds a token from a token endpoint response obtained at `now`.
    ///
    /// The endpoint may omit `scope` when it equals the requested one and a
    /// refresh response may omit `refresh_token`; `requested_scope` and
    /// `previous_refresh_token` fill those gaps. Returns `None` when no
    /// refresh token is available at all.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh_token: Option<&str>,
        requested_scope: &str,
        now: i64,
    ) -> Option<Self> {
        let refresh_token = response
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string))?;

        Some(Token {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            expires_at: now.saturating_add(response.expires_in),
            refresh_token,
            scope: response
                .scope
                .unwrap_or_else(|| requested_scope.to_string()),
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.saturating_sub(now) < TOKEN_EXPIRY_MARGIN
    }

    /// Whether every scope in the space separated `requested` list was granted.
    pub fn covers_scope(&self, requested: &str) -> bool {
        let granted: Vec<&str> = self.scope.split_whitespace().collect();
        requested
            .split_whitespace()
            .all(|scope| granted.contains(&scope))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error body returned by the accounts service token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

/// Error body returned by the Web API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksPage {
    pub items: Vec<SavedTrackItem>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    #[serde(default)]
    pub added_at: Option<String>,
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// One line of the saved songs page: a track name and its artists in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSong {
    pub name: String,
    pub artists: Vec<String>,
}

impl From<Track> for SavedSong {
    fn from(track: Track) -> Self {
        SavedSong {
            name: track.name,
            artists: track.artists.into_iter().map(|artist| artist.name).collect(),
        }
    }
}

impl SavedSong {
    /// Extracts the songs of a page, skipping items whose track is gone.
    pub fn from_page(page: SavedTracksPage) -> Vec<SavedSong> {
        page.items
            .into_iter()
            .filter_map(|item| item.track)
            .map(SavedSong::from)
            .collect()
    }
}

impl fmt::Display for SavedSong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.name, self.artists.join(", "))
    }
}
