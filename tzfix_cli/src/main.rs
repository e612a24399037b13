use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tzfix_core::{feed_client, transform, ZoneConfig};

/// Repair the timezone metadata of an iCalendar feed.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// the feed URL (`http(s)://` or `webcal://`) or a local iCalendar file
    pub source: String,
    /// where to write the repaired calendar
    #[arg(short, long, default_value = "fixed_calendar.ics")]
    pub output: PathBuf,
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
    if let Err(err) = run(&args).await {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
}

async fn run(args: &Arguments) -> Result<()> {
    let zone = ZoneConfig::resolve(args.zone_file.as_deref(), args.tzid.as_deref())?;
    let calendar = if feed_client::is_remote(&args.source) {
        feed_client::get(&args.source, &zone).await?
    } else {
        let raw = read_to_string(&args.source)
            .with_context(|| format!("could not read calendar file {}", args.source))?;
        transform(&raw, &zone)
    };
    write(&args.output, calendar)
        .with_context(|| format!("could not write {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), "wrote repaired calendar");
    Ok(())
}
