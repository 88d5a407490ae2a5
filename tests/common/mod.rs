#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use likedsongs::{
    config::Config,
    server::{self, AppState},
};
use serde_json::json;
use tokio::net::TcpListener;
use url::Url;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const SCOPE: &str = "user-library-read";

/// Codes the fake accounts service accepts.
pub const GOOD_CODE: &str = "good-code";
pub const STALE_CODE: &str = "stale-code";
pub const NARROW_CODE: &str = "narrow-code";
pub const REVOKED_CODE: &str = "revoked-code";
/// Granted without a `scope` field in the token response.
pub const SCOPELESS_CODE: &str = "scopeless-code";
/// Already expired, and its refresh response omits `scope` as well.
pub const SCOPELESS_STALE_CODE: &str = "scopeless-stale-code";

const REFRESH_TOKEN: &str = "refresh-1";
const SCOPELESS_REFRESH_TOKEN: &str = "scopeless-refresh";
const REVOKED_REFRESH_TOKEN: &str = "revoked-refresh";
const VALID_ACCESS_TOKENS: [&str; 2] = ["access-1", "access-2"];

/// In-process stand-in for the Spotify accounts service and Web API.
#[derive(Clone, Default)]
pub struct FakeSpotify {
    pub exchanges: Arc<AtomicUsize>,
    pub refreshes: Arc<AtomicUsize>,
    pub last_page: Arc<Mutex<Option<(String, String)>>>,
}

impl FakeSpotify {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn last_page(&self) -> Option<(String, String)> {
        self.last_page.lock().unwrap().clone()
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/token", post(token))
            .route("/v1/me/tracks", get(saved_tracks))
            .with_state(self)
    }
}

fn oauth_error(error: &str, description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "error_description": description })),
    )
        .into_response()
}

fn token_body(
    access_token: &str,
    expires_in: i64,
    refresh_token: Option<&str>,
    scope: Option<&str>,
) -> Response {
    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    });
    if let Some(scope) = scope {
        body["scope"] = json!(scope);
    }
    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = json!(refresh_token);
    }
    Json(body).into_response()
}

async fn token(
    State(fake): State<FakeSpotify>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")));
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if authorization != Some(expected.as_str()) {
        return oauth_error("invalid_client", "Invalid client");
    }

    let field = |name: &str| form.get(name).map(String::as_str);

    match field("grant_type") {
        Some("authorization_code") => {
            if field("redirect_uri").is_none() {
                return oauth_error("invalid_request", "redirect_uri missing");
            }
            fake.exchanges.fetch_add(1, Ordering::SeqCst);
            match field("code") {
                Some(GOOD_CODE) => token_body("access-1", 3600, Some(REFRESH_TOKEN), Some(SCOPE)),
                Some(STALE_CODE) => {
                    token_body("stale-access", 0, Some(REFRESH_TOKEN), Some(SCOPE))
                }
                Some(NARROW_CODE) => {
                    token_body("access-1", 3600, Some(REFRESH_TOKEN), Some("user-read-email"))
                }
                Some(REVOKED_CODE) => {
                    token_body("stale-access", 0, Some(REVOKED_REFRESH_TOKEN), Some(SCOPE))
                }
                Some(SCOPELESS_CODE) => token_body("access-1", 3600, Some(REFRESH_TOKEN), None),
                Some(SCOPELESS_STALE_CODE) => {
                    token_body("stale-access", 0, Some(SCOPELESS_REFRESH_TOKEN), None)
                }
                _ => oauth_error("invalid_grant", "Invalid authorization code"),
            }
        }
        Some("refresh_token") => {
            fake.refreshes.fetch_add(1, Ordering::SeqCst);
            match field("refresh_token") {
                Some(REFRESH_TOKEN) => token_body("access-2", 3600, None, Some(SCOPE)),
                Some(SCOPELESS_REFRESH_TOKEN) => token_body("access-2", 3600, None, None),
                _ => oauth_error("invalid_grant", "Refresh token revoked"),
            }
        }
        _ => oauth_error("unsupported_grant_type", "grant_type must be set"),
    }
}

async fn saved_tracks(
    State(fake): State<FakeSpotify>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if !bearer.is_some_and(|token| VALID_ACCESS_TOKENS.contains(&token)) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
        )
            .into_response();
    }

    let limit = query.get("limit").cloned().unwrap_or_default();
    let offset = query.get("offset").cloned().unwrap_or_default();
    *fake.last_page.lock().unwrap() = Some((limit, offset));

    Json(json!({
        "items": [
            { "added_at": "2024-01-01T00:00:00Z", "track": { "name": "A", "artists": [{ "name": "X" }] } },
            { "added_at": "2024-01-02T00:00:00Z", "track": { "name": "B", "artists": [{ "name": "Y" }, { "name": "Z" }] } }
        ],
        "total": 2,
        "next": null
    }))
    .into_response()
}

pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Starts a fake Spotify and returns it with its base URL.
pub async fn spawn_fake() -> (FakeSpotify, String) {
    let fake = FakeSpotify::default();
    let addr = spawn_router(fake.clone().router()).await;
    (fake, format!("http://{addr}"))
}

/// Builds a configuration pointing every Spotify endpoint at `fake_base`.
pub fn test_config(fake_base: &str, app_base: &str, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID".into(), CLIENT_ID.into()),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET".into(), CLIENT_SECRET.into()),
        ("SPOTIFY_API_REDIRECT_URI".into(), format!("{app_base}/callback")),
        ("SPOTIFY_API_AUTH_URL".into(), format!("{fake_base}/authorize")),
        ("SPOTIFY_API_TOKEN_URL".into(), format!("{fake_base}/api/token")),
        ("SPOTIFY_API_URL".into(), format!("{fake_base}/v1")),
    ]);
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub struct TestApp {
    pub base: String,
    pub fake_base: String,
    pub fake: FakeSpotify,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    pub async fn spawn_with(overrides: &[(&str, &str)]) -> Self {
        let (fake, fake_base) = spawn_fake().await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let config = test_config(&fake_base, &base, overrides);
        tokio::spawn(async move {
            server::serve(listener, AppState::new(config)).await.unwrap();
        });

        TestApp {
            base,
            fake_base,
            fake,
        }
    }

    pub fn authorize_prefix(&self) -> String {
        format!("{}/authorize?", self.fake_base)
    }

    /// A fresh browser without cookies.
    pub fn browser(&self) -> Browser {
        Browser {
            base: self.base.clone(),
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            cookie: Mutex::new(None),
        }
    }
}

/// HTTP client that keeps the session cookie like a browser would.
pub struct Browser {
    base: String,
    client: reqwest::Client,
    cookie: Mutex<Option<String>>,
}

impl Browser {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{}", self.base, path));
        let cookie = self.cookie.lock().unwrap().clone();
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.unwrap();
        if let Some(value) = response.headers().get(SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }
        response
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    pub fn set_cookie(&self, cookie: &str) {
        *self.cookie.lock().unwrap() = Some(cookie.to_string());
    }

    /// Visits `/` and returns the `state` of the authorization redirect, if
    /// the app sent the browser to Spotify.
    pub async fn start_login(&self) -> Option<String> {
        let response = self.get("/").await;
        let target = Url::parse(&location(&response)).ok()?;
        target
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
    }

    /// Starts a login and runs the authorization callback with the given
    /// code and the state Spotify would echo back.
    pub async fn login(&self, code: &str) -> reqwest::Response {
        let state = self.start_login().await.unwrap_or_default();
        self.get(&format!("/callback?code={code}&state={state}")).await
    }
}

pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}
