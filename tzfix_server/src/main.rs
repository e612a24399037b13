//! This server serves a published calendar feed with repaired timezone metadata.
//!
//! Subscribe to `http://<host>:<port>/calendar` instead of the original feed.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tzfix_core::ZoneConfig;

use crate::route::calendar::CalendarSource;

mod route;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the feed URL (`http(s)://` or `webcal://`) to repair
    #[arg(long)]
    pub source: String,
    /// the port to listen on
    #[arg(long, default_value_t = 8008)]
    pub port: u16,
    /// a TOML file describing the target zone, Europe/Amsterdam if omitted
    #[arg(long)]
    pub zone_file: Option<PathBuf>,
    /// override the zone identifier written into the calendar
    #[arg(long)]
    pub tzid: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Arguments::parse();
    if let Err(err) = run(args).await {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
}

async fn run(args: Arguments) -> Result<()> {
    let zone = ZoneConfig::resolve(args.zone_file.as_deref(), args.tzid.as_deref())?;
    let source = CalendarSource {
        url: args.source,
        zone,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(%addr, url = %source.url, "serving repaired calendar");
    axum::Server::try_bind(&addr)
        .with_context(|| format!("could not listen on {addr}"))?
        .serve(app(source).into_make_service())
        .await?;
    Ok(())
}

fn app(source: CalendarSource) -> Router {
    Router::new()
        .route("/calendar", get(route::calendar::handler))
        .with_state(Arc::new(source))
}
