//! Mock ground station broadcasting synthetic setpoints.

use clap::Parser;
use flight_link::config::DEFAULT_PORT;
use flight_link::station::{self, DEFAULT_RATE_HZ};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Synthetic ground station for bench testing")]
struct Opts {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Setpoints per second sent to each client
    #[arg(short, long, default_value_t = DEFAULT_RATE_HZ)]
    rate_hz: u32,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mock_station=info,flight_link=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let listener = TcpListener::bind(("0.0.0.0", opts.port)).await?;
    info!(
        "Mock ground station running on ws://localhost:{} ({} Hz)",
        opts.port, opts.rate_hz
    );

    tokio::select! {
        result = station::serve(listener, opts.rate_hz) => {
            if let Err(e) = &result {
                error!(error = %e, "Accept loop failed");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Mock ground station stopped");
            Ok(())
        }
    }
}
