use std::{sync::Arc, time::Duration};

use axum::{Router, middleware, routing::get};
use axum_extra::extract::cookie::Key;
use reqwest::Client;
use tokio::net::TcpListener;

use crate::{
    Res, api,
    config::Config,
    session::{MemoryStore, SessionStore, session_layer},
    spotify::auth::SpotifyOAuth,
    warning,
};

/// How often idle sessions are swept from the store.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub mod routes {
    pub const HOME: &str = "/";
    pub const CALLBACK: &str = "/callback";
    pub const SAVED_SONGS: &str = "/get_saved_songs";
    pub const LOGOUT: &str = "/logout";
    pub const HEALTH: &str = "/health";
}

/// Process-wide state shared by every request handler.
///
/// Built once at startup. Everything in here is either immutable or
/// internally synchronized; per-user data lives in the session store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: Client,
    pub oauth: SpotifyOAuth,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_key: Key,
}

impl AppState {
    /// Creates the state with an in-memory session store that forgets
    /// sessions idle for longer than `config.session_idle_timeout`.
    pub fn new(config: Config) -> Self {
        let store = MemoryStore::with_idle_timeout(config.session_idle_timeout);
        Self::with_store(config, Arc::new(store))
    }

    /// Creates the state with the given session backend and a freshly
    /// generated cookie signing key.
    pub fn with_store(config: Config, sessions: Arc<dyn SessionStore>) -> Self {
        let config = Arc::new(config);
        let http = Client::new();
        let oauth = SpotifyOAuth::new(Arc::clone(&config), http.clone());

        AppState {
            config,
            http,
            oauth,
            sessions,
            cookie_key: Key::generate(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(routes::HOME, get(api::home))
        .route(routes::CALLBACK, get(api::callback))
        .route(routes::SAVED_SONGS, get(api::get_saved_songs))
        .route(routes::LOGOUT, get(api::logout))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .route(routes::HEALTH, get(api::health))
        .with_state(state)
}

/// Serves the application on an already bound listener until it fails.
///
/// Also runs a background task that sweeps idle sessions every
/// [`SESSION_SWEEP_INTERVAL`]; it stops together with the server.
pub async fn serve(listener: TcpListener, state: AppState) -> Res<()> {
    let sweeper = tokio::spawn(sweep_sessions(Arc::clone(&state.sessions)));
    let result = axum::serve(listener, router(state)).await;
    sweeper.abort();
    result?;
    Ok(())
}

async fn sweep_sessions(sessions: Arc<dyn SessionStore>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = sessions.purge_idle().await {
            warning!("Failed to sweep idle sessions: {}", e);
        }
    }
}
