use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, Response, header::AUTHORIZATION};
use url::Url;

use super::Error;
use crate::{
    config::Config,
    session::Session,
    types::{OAuthErrorResponse, Token, TokenResponse},
    warning,
};

/// Session key under which the cached [`Token`] is stored.
pub const TOKEN_INFO_KEY: &str = "token_info";

/// Session key holding the `state` sent with the last authorization request.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

const STATE_LEN: usize = 32;

/// OAuth 2.0 authorization-code helper for the Spotify accounts service.
///
/// Builds the authorization URL, exchanges codes and refresh tokens at the
/// token endpoint, and reads/writes the resulting [`Token`] in the caller's
/// [`Session`]. The helper itself is stateless and shared by all requests.
#[derive(Debug, Clone)]
pub struct SpotifyOAuth {
    config: Arc<Config>,
    http: Client,
}

impl SpotifyOAuth {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        SpotifyOAuth { config, http }
    }

    /// Returns the URL the browser is sent to for granting access.
    ///
    /// Carries the client id, the redirect URI, the requested scope and a
    /// fresh random `state` that is remembered in the session and checked by
    /// [`verify_state`](Self::verify_state) on the way back. When
    /// `show_dialog` is configured the consent dialog is forced even for a
    /// user that approved the app before.
    pub async fn authorize_url(&self, session: &Session) -> Result<Url, Error> {
        let state = generate_state();
        session.insert(OAUTH_STATE_KEY, &state).await?;

        let mut url = self.config.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("scope", &self.config.scope)
                .append_pair("state", &state);
            if self.config.show_dialog {
                query.append_pair("show_dialog", "true");
            }
        }
        Ok(url)
    }

    /// Checks the `state` echoed by the authorization server against the one
    /// remembered for this session. The remembered value is consumed, so a
    /// callback URL cannot be replayed.
    pub async fn verify_state(&self, session: &Session, state: Option<&str>) -> Result<bool, Error> {
        let expected = session.get::<String>(OAUTH_STATE_KEY).await?;
        session.remove(OAUTH_STATE_KEY).await?;

        Ok(matches!((expected, state), (Some(expected), Some(state)) if expected == state))
    }

    /// Exchanges an authorization code and caches the token in the session.
    pub async fn get_access_token(&self, session: &Session, code: &str) -> Result<Token, Error> {
        let token = self.exchange_code(code).await?;
        session.insert(TOKEN_INFO_KEY, &token).await?;
        Ok(token)
    }

    /// Exchanges an authorization code for a token without caching it.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, Error> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.request_token(&form, None, &self.config.scope).await
    }

    /// Trades the refresh token of `token` for a fresh access token.
    ///
    /// Spotify may or may not rotate the refresh token; when the response
    /// does not include one, the previous one is kept. The same goes for the
    /// granted scope.
    pub async fn refresh_access_token(&self, token: &Token) -> Result<Token, Error> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
        ];
        self.request_token(&form, Some(&token.refresh_token), &token.scope)
            .await
    }

    /// Reads the token cached in the session without validating it.
    pub async fn get_cached_token(&self, session: &Session) -> Result<Option<Token>, Error> {
        Ok(session.get::<Token>(TOKEN_INFO_KEY).await?)
    }

    /// Returns the session's token if it can be used for API calls.
    ///
    /// # Validation Rules
    ///
    /// - No cached token: `None`
    /// - Token granted a narrower scope than configured: `None`
    /// - Token expired: refreshed and written back to the session. If the
    ///   refresh fails the cached token is dropped and `None` is returned.
    ///
    /// Only session store failures are reported as errors.
    pub async fn validate_token(&self, session: &Session) -> Result<Option<Token>, Error> {
        let Some(token) = self.get_cached_token(session).await? else {
            return Ok(None);
        };

        if !token.covers_scope(&self.config.scope) {
            return Ok(None);
        }

        if !token.is_expired() {
            return Ok(Some(token));
        }

        match self.refresh_access_token(&token).await {
            Ok(fresh) => {
                session.insert(TOKEN_INFO_KEY, &fresh).await?;
                Ok(Some(fresh))
            }
            Err(e) => {
                warning!("Token refresh failed: {}", e);
                session.remove(TOKEN_INFO_KEY).await?;
                Ok(None)
            }
        }
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh_token: Option<&str>,
        requested_scope: &str,
    ) -> Result<Token, Error> {
        let response = self
            .http
            .post(self.config.token_url.clone())
            .header(AUTHORIZATION, self.basic_authorization())
            .form(form)
            .send()
            .await?;

        let response = check_token_response(response).await?;
        let payload: TokenResponse = response.json().await?;

        Token::from_response(
            payload,
            previous_refresh_token,
            requested_scope,
            Utc::now().timestamp(),
        )
        .ok_or(Error::MissingRefreshToken)
    }

    fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

async fn check_token_response(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<OAuthErrorResponse>(&body) {
        Ok(rejection) => Error::Rejected {
            status,
            error: rejection.error,
            description: rejection.error_description,
        },
        Err(_) => Error::Rejected {
            status,
            error: body,
            description: None,
        },
    })
}
