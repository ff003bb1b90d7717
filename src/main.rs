//! pws-bridge - Personal Weather Station → Home Assistant bridge
//!
//! Listens for PWS Upload Protocol GET requests and republishes decoded
//! measurements as Home Assistant sensor states.
//!
//! # Usage
//!
//! ```bash
//! # Bridge mode (token from the LLT environment variable)
//! LLT=<long-lived-token> pws-bridge --ha-host ha.local \
//!     --station-id KCASANFR5 --station-password hunter2
//!
//! # Probe mode: decode and log uploads without forwarding
//! pws-bridge --probe --listen 0.0.0.0
//! ```
//!
//! # Environment Variables
//!
//! - `LLT`: Home Assistant long-lived access token
//! - `PWS_BRIDGE_CONFIG`: path to a TOML config file
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pws_bridge::config::{AuthPolicy, BridgeConfig};
use pws_bridge::forward::{HaClient, PayloadSink};
use pws_bridge::protocol::ParameterCatalog;
use pws_bridge::server::{self, AppState};
use pws_bridge::station::{StationCredentials, StationRegistry};

#[derive(Parser, Debug)]
#[command(name = "pws-bridge")]
#[command(about = "Personal Weather Station upload protocol bridge for Home Assistant")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides the default search order)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address for PWS uploads (default: "127.0.0.1")
    #[arg(long)]
    listen: Option<String>,

    /// Listen port for PWS uploads (default: 8080)
    #[arg(long)]
    port: Option<u16>,

    /// Home Assistant host
    #[arg(long)]
    ha_host: Option<String>,

    /// Home Assistant port (default: 8123)
    #[arg(long)]
    ha_port: Option<u16>,

    /// Use HTTPS towards Home Assistant
    #[arg(long)]
    ha_use_https: bool,

    /// Home Assistant long-lived access token
    #[arg(long, env = "LLT", hide_env_values = true)]
    token: Option<String>,

    /// Provision a single station id (with --station-password)
    #[arg(long)]
    station_id: Option<String>,

    /// Shared secret for --station-id
    #[arg(long)]
    station_password: Option<String>,

    /// Accept uploads from unknown stations as a no-op instead of 403
    #[arg(long)]
    lenient_auth: bool,

    /// Probe mode: decode and log uploads, forward nothing
    #[arg(long)]
    probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::load()?,
    };

    // CLI overrides on top of file values
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.ha_host {
        config.home_assistant.host = host;
    }
    if let Some(port) = args.ha_port {
        config.home_assistant.port = port;
    }
    if args.ha_use_https {
        config.home_assistant.use_https = true;
    }
    if args.lenient_auth {
        config.auth_policy = AuthPolicy::Lenient;
    }
    match (args.station_id, args.station_password) {
        (Some(id), Some(secret)) => config.stations.push(StationCredentials { id, secret }),
        (None, None) => {}
        _ => bail!("--station-id and --station-password must be given together"),
    }

    let catalog = Arc::new(ParameterCatalog::standard());
    let addr = format!("{}:{}", config.server.listen, config.server.port);

    let app = if args.probe {
        info!("Probe mode: decoding and logging uploads only");
        server::probe_router(catalog)
    } else {
        let token = args
            .token
            .or_else(|| config.home_assistant.token.clone())
            .context("no Home Assistant token: set LLT or home_assistant.token")?;

        if config.stations.is_empty() && config.auth_policy == AuthPolicy::Strict {
            warn!("No stations provisioned — every upload will be rejected");
        }

        let ha = &config.home_assistant;
        let sink: Arc<dyn PayloadSink> =
            Arc::new(HaClient::new(&ha.host, ha.port, ha.use_https, &token)?);
        let registry = Arc::new(StationRegistry::from_credentials(&config.stations));
        info!(
            stations = registry.len(),
            home_assistant = %ha.host,
            "Bridge configured"
        );

        server::router(AppState {
            registry,
            catalog,
            sink,
            auth_policy: config.auth_policy,
        })
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Listening for PWS uploads");
    axum::serve(listener, app).await?;

    Ok(())
}
