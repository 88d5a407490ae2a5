//! Spotify Saved Songs Web Application Library
//!
//! This library provides a small web application that signs a user in with
//! Spotify using the OAuth 2.0 authorization-code flow and lists the tracks
//! saved in their library. It includes modules for the HTTP routes, session
//! handling, configuration and the Spotify Web API integration.
//!
//! # Modules
//!
//! - `api` - HTTP route handlers and the error response type
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `server` - Shared application state and router assembly
//! - `session` - Cookie-backed sessions and their storage backends
//! - `spotify` - OAuth helper and Web API client
//! - `types` - Data structures and type definitions
//!
//! # Example
//!
//! ```
//! use likedsongs::{config, server};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> likedsongs::Res<()> {
//!     let config = config::Config::from_env()?;
//!     let listener = TcpListener::bind(config.server_address).await?;
//!     server::serve(listener, server::AppState::new(config)).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for the outer layers of the
/// application (startup, CLI) using a boxed dynamic error trait object.
/// Inner layers return their own typed errors which convert into it with `?`.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used during startup, where a failure means the server cannot run at
/// all. Request handlers log with [`warning!`] and answer with an error page
/// instead.
///
/// # Example
///
/// ```
/// error!("Invalid configuration: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a failed token refresh or a rejected
/// authorization callback.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
