//! Multi-room Texas Hold'em server.
//!
//! Rooms are independent actors managed by a process-wide registry; this
//! binary wires them to an HTTP lobby and per-player WebSockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use pico_args::Arguments;

use holdem_core::room::registry::RoomRegistry;
use holdem_server::{api, config::ServerConfig, logging};

const HELP: &str = "\
Run a multi-room Texas Hold'em server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  TURN_TIMEOUT_SECS        Per-turn action timeout     [default: 30]
  DEFAULT_CHIPS            Stack per seated player     [default: 1000]
  DEFAULT_SMALL_BLIND      Small blind for new rooms   [default: 10]
  DEFAULT_BIG_BLIND        Big blind for new rooms     [default: 20]
  MAX_ROOMS                Open-room limit             [default: 100]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // dotenvy does not override variables that are already set.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }
    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override)?;
    config.validate()?;
    tracing::info!("configuration loaded; binding {}", config.bind);

    let registry = Arc::new(RoomRegistry::new(Duration::from_secs(
        config.turn_timeout_secs,
    )));

    let state = api::AppState {
        registry,
        config: config.clone(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        "server running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
