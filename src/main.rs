//! LDBWS REST proxy
//!
//! A REST/JSON front for the National Rail Live Departure Boards web
//! service, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!     GET /departure-  │  ┌─────────┐    ┌──────────┐    ┌──────────┐ │
//!     board/LDS ───────┼─▶│  http   │───▶│ dispatch │───▶│ upstream │─┼──▶ LDBWS
//!                      │  │ server  │    │          │    │   SOAP   │ │    (SOAP)
//!                      │  └─────────┘    └────┬─────┘    └──────────┘ │
//!                      │                      │                       │
//!     JSON ◀───────────┼──────────────── projection + shapes          │
//!                      │                                              │
//!                      │  config · observability · lifecycle          │
//!                      └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use ldbws_proxy::config::load_or_default;
use ldbws_proxy::lifecycle::startup;
use ldbws_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "ldbws-proxy")]
#[command(about = "REST/JSON proxy for the Live Departure Boards web service", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ldbws-proxy starting");

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
