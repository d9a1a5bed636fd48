//! wifi-watch CLI
//!
//! Command-line interface for the live Wi-Fi network view: a one-shot or
//! continuously refreshing terminal table, and an HTTP/WebSocket server that
//! publishes the view to browsers and other clients.
//!
//! # Usage
//!
//! ```bash
//! # Scan once against the default backend and print a table
//! wifi-watch scan
//!
//! # Keep the table on screen, refreshing every 5 s, using synthetic data
//! wifi-watch scan --watch --source simulate --poll-interval-ms 5000
//!
//! # Serve the view on http://127.0.0.1:8080
//! wifi-watch serve --backend-url http://10.0.0.2:8000/scan
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use wifi_watch_scan::{
    AcquisitionPort, HttpScanBackend, PollerConfig, PollingScheduler, SimulatedBackend,
};

pub mod api;
pub mod render;
pub mod scan;

/// wifi-watch Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "wifi-watch")]
#[command(author, version, about = "Live Wi-Fi network security telemetry")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the live view over HTTP and WebSocket
    Serve(ServeArgs),

    /// Scan and print nearby networks
    Scan(ScanArgs),

    /// Display version information
    Version,
}

/// Where network snapshots come from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON scanning backend reached over HTTP
    Http,
    /// Synthetic networks with drifting signal
    Simulate,
}

/// Output format for `scan`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// The published view as JSON
    Json,
}

/// Backend and polling options shared by every command that runs the pipeline.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Data source
    #[arg(long, value_enum, default_value = "http")]
    pub source: SourceKind,

    /// Scanning backend URL (for `--source http`)
    #[arg(long, default_value = HttpScanBackend::DEFAULT_URL)]
    pub backend_url: String,

    /// JSON file with a poller configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Polling period in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Signal samples kept per network
    #[arg(long)]
    pub max_history: Option<usize>,

    /// Acquisition timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Artificial scan latency for `--source simulate`, in milliseconds
    #[arg(long, default_value = "0")]
    pub sim_latency_ms: u64,
}

impl SourceArgs {
    /// Resolve the poller configuration: defaults, then the config file,
    /// then command-line flags.
    pub fn poller_config(&self) -> Result<PollerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                PollerConfig::from_json(&json)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => PollerConfig::default(),
        };

        if let Some(ms) = self.poll_interval_ms {
            config = config.with_poll_interval_ms(ms);
        }
        if let Some(len) = self.max_history {
            config = config.with_max_history_length(len);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_acquisition_timeout_ms(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Build the acquisition backend selected by `--source`.
    pub fn backend(&self, config: &PollerConfig) -> Result<Arc<dyn AcquisitionPort>> {
        Ok(match self.source {
            SourceKind::Http => Arc::new(
                HttpScanBackend::with_timeout(&self.backend_url, config.acquisition_timeout())
                    .context("Failed to create HTTP scan backend")?,
            ),
            SourceKind::Simulate => Arc::new(
                SimulatedBackend::new().with_latency(Duration::from_millis(self.sim_latency_ms)),
            ),
        })
    }

    /// Build an idle scheduler from these options.
    pub fn scheduler(&self) -> Result<PollingScheduler> {
        let config = self.poller_config()?;
        let backend = self.backend(&config)?;
        Ok(PollingScheduler::new(backend, config)?)
    }
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// HTTP port
    #[arg(short, long, default_value = "8080")]
    pub port: u16,
}

/// Arguments for the scan command
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Keep polling and re-render on every update until Ctrl-C
    #[arg(short, long)]
    pub watch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "wifi-watch",
            "scan",
            "--source",
            "simulate",
            "--poll-interval-ms",
            "2500",
            "--max-history",
            "4",
        ]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let config = args.source.poller_config().unwrap();
        assert_eq!(config.poll_interval_ms, 2500);
        assert_eq!(config.max_history_length, 4);
        assert_eq!(
            config.acquisition_timeout_ms,
            PollerConfig::DEFAULT_ACQUISITION_TIMEOUT_MS
        );
        assert_eq!(args.source.source, SourceKind::Simulate);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn config_file_is_loaded_and_flags_win() {
        let path = std::env::temp_dir().join(format!("wifi-watch-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"pollIntervalMs": 3000, "maxHistoryLength": 20}"#).unwrap();

        let cli = Cli::parse_from([
            "wifi-watch",
            "serve",
            "--config",
            path.to_str().unwrap(),
            "--max-history",
            "5",
        ]);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.source.poller_config().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.poll_interval_ms, 3000);
        assert_eq!(config.max_history_length, 5);
        assert_eq!(args.port, 8080);
    }

    #[test]
    fn zero_values_are_rejected() {
        let cli = Cli::parse_from(["wifi-watch", "scan", "--timeout-ms", "0"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert!(args.source.poller_config().is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let cli = Cli::parse_from(["wifi-watch", "scan", "--config", "/nonexistent/wifi-watch.json"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let err = args.source.poller_config().unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
