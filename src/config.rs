//! Configuration management for the saved songs web application.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and turns them into one immutable [`Config`] value that is
//! built once at startup and shared with every request handler.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory, then `.env` in the working directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/callback";
pub const DEFAULT_SCOPE: &str = "user-library-read";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

pub const ENV_CLIENT_ID: &str = "SPOTIFY_API_AUTH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_API_AUTH_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "SPOTIFY_API_REDIRECT_URI";
pub const ENV_SCOPE: &str = "SPOTIFY_API_AUTH_SCOPE";
pub const ENV_AUTH_URL: &str = "SPOTIFY_API_AUTH_URL";
pub const ENV_TOKEN_URL: &str = "SPOTIFY_API_TOKEN_URL";
pub const ENV_API_URL: &str = "SPOTIFY_API_URL";
pub const ENV_SERVER_ADDRESS: &str = "SERVER_ADDRESS";
pub const ENV_SHOW_DIALOG: &str = "SPOTIFY_SHOW_DIALOG";
pub const ENV_SESSION_IDLE_TIMEOUT: &str = "SESSION_IDLE_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddress { name: &'static str, value: String },
    #[error("{name} must be `true` or `false`, got `{value}`")]
    InvalidFlag { name: &'static str, value: String },
    #[error("{name} must be a positive number of seconds, got `{value}`")]
    InvalidDuration { name: &'static str, value: String },
}

/// Immutable application configuration.
///
/// Holds the Spotify client credentials, the OAuth endpoints and the address
/// the HTTP server binds to. Constructed once and passed around behind an
/// `Arc`; nothing mutates it after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub scope: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub api_url: Url,
    pub server_address: SocketAddr,
    pub show_dialog: bool,
    /// How long a session may go unused before its data is discarded.
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call [`load_env`] first if values should also come from `.env` files.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required credential is missing or one
    /// of the URLs, the address, the dialog flag or the idle timeout cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let url = |name: &'static str, default: &str| {
            let raw = get(name).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name, source })
        };

        let address = get(ENV_SERVER_ADDRESS).unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        let server_address = address
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress {
                name: ENV_SERVER_ADDRESS,
                value: address.clone(),
            })?;

        let show_dialog = match get(ENV_SHOW_DIALOG) {
            None => true,
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                name: ENV_SHOW_DIALOG,
                value,
            })?,
        };

        let session_idle_timeout = match get(ENV_SESSION_IDLE_TIMEOUT) {
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidDuration {
                    name: ENV_SESSION_IDLE_TIMEOUT,
                    value,
                })?,
        };

        Ok(Config {
            client_id: required(ENV_CLIENT_ID)?,
            client_secret: required(ENV_CLIENT_SECRET)?,
            redirect_uri: url(ENV_REDIRECT_URI, DEFAULT_REDIRECT_URI)?,
            scope: get(ENV_SCOPE).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            auth_url: url(ENV_AUTH_URL, DEFAULT_AUTH_URL)?,
            token_url: url(ENV_TOKEN_URL, DEFAULT_TOKEN_URL)?,
            api_url: url(ENV_API_URL, DEFAULT_API_URL)?,
            server_address,
            show_dialog,
            session_idle_timeout,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Loads environment variables from `.env` files.
///
/// Looks in the platform-specific local data directory under
/// `likedsongs/.env` first, then in the current working directory. Variables
/// that are already set in the environment are never overwritten.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/likedsongs/.env`
/// - macOS: `~/Library/Application Support/likedsongs/.env`
/// - Windows: `%LOCALAPPDATA%/likedsongs/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or if no
/// `.env` file could be loaded from either location.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let from_data_dir = dotenv::from_path(&path);
    let from_cwd = dotenv::dotenv();

    match (from_data_dir, from_cwd) {
        (Err(_), Err(e)) => Err(format!(
            "no .env file found in {} or the working directory ({})",
            path.display(),
            e
        )),
        _ => Ok(()),
    }
}

fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("likedsongs/.env");
    path
}
