//! wifi-watch CLI Entry Point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wifi_watch_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `scan --format json` keeps stdout clean.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            wifi_watch_cli::api::serve(args).await?;
        }
        Commands::Scan(args) => {
            wifi_watch_cli::scan::execute(args).await?;
        }
        Commands::Version => {
            println!("wifi-watch {}", env!("CARGO_PKG_VERSION"));
            println!("pipeline library version: {}", wifi_watch_scan::VERSION);
        }
    }

    Ok(())
}
