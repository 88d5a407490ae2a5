use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};
use rand::{Rng, distr::Alphanumeric};

use super::Session;
use crate::server::AppState;

pub const SESSION_COOKIE: &str = "likedsongs_session";

const SESSION_ID_LEN: usize = 64;

/// Attaches a [`Session`] to every request.
///
/// Reuses the id from a valid signed session cookie. A missing cookie, or
/// one whose signature does not verify against this process' key, starts a
/// new session and sets the cookie on the way out.
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let jar = SignedCookieJar::from_headers(req.headers(), state.cookie_key.clone());

    let (id, new_jar) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), None),
        None => {
            let id = generate_session_id();
            let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (id, Some(jar.add(cookie)))
        }
    };

    req.extensions_mut()
        .insert(Session::new(id, state.sessions.clone()));

    let response = next.run(req).await;

    match new_jar {
        Some(jar) => (jar, response).into_response(),
        None => response,
    }
}

fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
