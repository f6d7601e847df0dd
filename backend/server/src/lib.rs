//! Documentation of a token-gated location relay.
//!
//! A visitor opens a share link, the page asks the browser for its position,
//! keeps the best fix it can get within a short window, and posts it back.
//! The server checks the link token, writes an audit line, and emails the
//! operator a report with a map link.
//!
//!
//!
//! # General Infrastructure
//! - One process, one port, no storage
//! - Share links look like `/loc/{token}`, tokens come from `ACCESS_TOKENS`
//! - Reports go out through SendGrid, one attempt per submission
//! - Logs are the only record a submission ever arrived
//!
//!
//!
//! # Endpoints
//!
//! | Route | Result |
//! |---|---|
//! | `GET /` | `OK`, liveness |
//! | `GET /loc/{token}` | share page, `404` for an unknown token |
//! | `POST /api/location` | `{ ok: true }`, or `403 invalid_token`, `400 bad_coords`, `500 email_failed` |
//!
//!
//!
//! # Submission Lifecycle
//!
//! **Goal**: every accepted submission is either emailed or at least logged.
//!
//! - Token and coordinate checks run first, a failure stops everything
//! - The `location_received` audit event is written next
//! - Then exactly one delivery attempt
//! - Delivery failure answers `500 email_failed`, the provider's detail only
//!   reaches the server log
//! - No retries. The visitor presses the button again
//!
//!
//!
//! # Notes
//!
//! ## Timeouts
//! Nothing bounds the provider call except the HTTP client itself. A provider
//! that never answers keeps the visitor's request open.
//!
//! ## Sender identity
//! `FROM_EMAIL` falls back to `ACCOUNT_EMAIL`, the provider account's verified
//! sender. Startup fails if neither is set.
//!
//!
//!
//! # Setup
//!
//! Required environment.
//! ```sh
//! export SENDGRID_API_KEY=SG.xxxx   # or /run/secrets/SENDGRID_API_KEY
//! export FROM_EMAIL=relay@example.com
//! export TO_EMAIL=operator@example.com
//! ```
//!
//! Run.
//! ```sh
//! RUST_LOG=info cargo run -p locshare
//! ```
//!
//! Send a test submission.
//! ```sh
//! cargo run -p tester -- --token ABC123 fixed 10.0 20.0 --accuracy 5
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use tokio::{net::TcpListener, signal::ctrl_c};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod audit;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notifier;
pub mod page;
pub mod report;
pub mod routes;
pub mod sendgrid;
pub mod state;
pub mod tokens;
pub mod utils;

use config::Config;
use routes::{health_handler, location_handler, page_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(health_handler))
        .route("/loc/{token}", get(page_handler))
        .route("/api/location", post(location_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    info!("Loading config...");
    let config = Config::load().context("Environment misconfigured!")?;

    info!("Initializing state...");
    let state = AppState::new(config).context("Failed to build notifier")?;
    info!("Loaded {} access token(s)", state.tokens.len());

    info!("Starting server...");
    let router = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
