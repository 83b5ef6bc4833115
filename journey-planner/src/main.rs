use std::net::SocketAddr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use journey_planner::network::{Network, NetworkError};
use journey_planner::planner::SearchConfig;
use journey_planner::web::{AppState, create_router};

/// Default listen address.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
enum StartupError {
    #[error("NETWORK_PATH is not set")]
    MissingNetwork,

    #[error("failed to load network: {0}")]
    Network(#[from] NetworkError),

    #[error("failed to read planner config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid planner config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid PLANNER_ADDR {0:?}")]
    Address(String),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

fn load_config() -> Result<SearchConfig, StartupError> {
    let Ok(path) = std::env::var("PLANNER_CONFIG") else {
        return Ok(SearchConfig::default());
    };
    let text = std::fs::read_to_string(&path).map_err(|source| StartupError::ConfigIo {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StartupError::Config { path, source })
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let network_path = std::env::var("NETWORK_PATH").map_err(|_| StartupError::MissingNetwork)?;
    let network = Network::load(&network_path)?;
    let config = load_config()?;

    let addr_text = std::env::var("PLANNER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = addr_text
        .parse()
        .map_err(|_| StartupError::Address(addr_text.clone()))?;

    let state = AppState::new(network, config);
    let app = create_router(state);

    info!(%addr, "journey planner listening");
    info!("  GET  /health        - Health check");
    info!("  GET  /stops         - List stops");
    info!("  POST /journey/plan  - Plan journeys");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
