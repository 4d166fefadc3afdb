//! flight-link - drone side of the ground station control link
//!
//! Connects to the ground station, mixes every attitude setpoint into four
//! motor throttles and shows them on a live status line.

use clap::Parser;
use flight_link::link::{Link, WsConnector};
use flight_link::output::ConsoleSink;
use flight_link::{Config, Mixer};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Drone control link client")]
struct Opts {
    /// IP address of the ground station
    #[arg(long)]
    ip: String,

    /// TOML file overriding the built-in link and mixer settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Logs go to stderr, stdout carries the status line.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flight_link=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> flight_link::Result<()> {
    init_logging();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    let mixer = Mixer::new(config.mixer.clone())?;
    let connector = WsConnector::new(config.link.endpoint(&opts.ip))
        .with_timeout(config.link.connect_timeout());

    let mut link = Link::new(connector, mixer, ConsoleSink::stdout())
        .with_backoff(config.link.backoff());

    link.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await;

    println!("\nStopping drone client...");
    Ok(())
}
