//! market-relay: binary entrypoint.
//! Loads configuration, installs tracing and metrics, and serves the relay
//! plus the dashboard on localhost until Ctrl+C.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_relay::metrics::Metrics;
use market_relay::RelayConfig;

#[derive(Debug, Parser)]
#[command(name = "market-relay", version)]
struct Cli {
    /// Relay config file (TOML). Defaults to config/relay.toml.
    #[arg(long, env = "RELAY_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Do not open the dashboard in a browser.
    #[arg(long)]
    no_open: bool,
}

/// Compact logs by default; JSON lines with RELAY_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_relay=info,warn"));

    let json = std::env::var("RELAY_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn open_browser(url: &str) -> std::io::Result<std::process::Child> {
    if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(url).spawn()
    } else {
        std::process::Command::new("xdg-open").arg(url).spawn()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => RelayConfig::load_from(path)?,
        None => RelayConfig::load_default()?,
    };
    cfg.apply_env_overrides()?;
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if cli.no_open {
        cfg.server.open_browser = false;
    }

    let metrics = Metrics::init(cfg.intl_metals.fresh_window_ms)?;
    let app = market_relay::build_app(&cfg).merge(metrics.router());

    let addr = cfg.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    let url = cfg.server.dashboard_url();
    info!(
        %url,
        static_dir = %cfg.server.static_dir.display(),
        intl_fresh_ms = cfg.intl_metals.fresh_window_ms,
        "market relay listening"
    );

    if cfg.server.open_browser {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            if let Err(e) = open_browser(&url) {
                warn!(error = %e, %url, "could not open a browser; open the dashboard manually");
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    info!("server stopped");
    Ok(())
}
