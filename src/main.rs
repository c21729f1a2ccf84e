//! HTTP load balancer.
//!
//! A round-robin L7 load balancer built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::router ──▶ load_balancer::pool
//!                     (buffer body,    (retry same,         (round robin over
//!                      request id)      then fail over)      alive backends)
//!                                                                  │
//!     Client Response                                              ▼
//!     ◀────────────── http::server ◀── http::upstream ◀──── Backend server
//!
//!     Background: health::active probes every backend on an interval
//!     Admin API:  PUT /config, GET /backends, GET /status
//! ```

use std::path::PathBuf;
use clap::Parser;

use http_balancer::config::{load_config, ObservabilityConfig};
use http_balancer::lifecycle::startup;
use http_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "http-balancer")]
#[command(about = "Round-robin HTTP load balancer", long_about = None)]
struct Cli {
    /// Path to the JSON (or .toml) config file
    #[arg(short, long, default_value = "./config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    match &loaded {
        Ok(config) => logging::init(&config.observability),
        Err(_) => logging::init(&ObservabilityConfig::default()),
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = ?cli.config, error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        path = ?cli.config,
        port = %config.port,
        backends = config.urls.len(),
        "Configuration loaded"
    );

    startup::run(config, Some(cli.config)).await?;
    Ok(())
}
