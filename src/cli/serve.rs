use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::{
    config::Config,
    error, info,
    server::{self, AppState},
    success, warning,
};

/// Starts the web application.
///
/// # Arguments
///
/// * `address` - Overrides `SERVER_ADDRESS` from the configuration
/// * `open` - Opens the home page in the default browser once listening
///
/// # Error Handling
///
/// Invalid configuration, a failed bind or a fatal server error terminate
/// the program with an error message. A browser that fails to open only
/// produces a warning.
pub async fn serve(address: Option<SocketAddr>, open: bool) {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    if let Some(address) = address {
        config.server_address = address;
    }

    let addr = config.server_address;
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    let home_url = home_url(addr);
    info!("Spotify redirects back to {}", config.redirect_uri);
    success!("Listening on {}", home_url);

    if open && webbrowser::open(&home_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            home_url
        );
    }

    if let Err(e) = server::serve(listener, AppState::new(config)).await {
        error!("Server stopped: {}", e);
    }
}

fn home_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}/", addr.port())
    } else {
        format!("http://{}/", addr)
    }
}
