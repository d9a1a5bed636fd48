//! # wifi-watch-scan
//!
//! Live Wi-Fi network telemetry: periodic acquisition of nearby networks,
//! per-network signal history and security risk classification.
//!
//! This crate implements the acquisition pipeline, providing:
//!
//! - **Domain types**: [`NetworkRecord`], [`NetworkIdentity`], [`SignalHistory`],
//!   [`RiskCategory`], [`ViewState`]
//! - **Port**: [`AcquisitionPort`] -- trait abstracting the scanning backend
//! - **Adapters**: [`HttpScanBackend`] for a JSON backend over HTTP and
//!   [`SimulatedBackend`] for synthetic data
//! - **Pipeline**: [`SnapshotNormalizer`] and the [`PollingScheduler`] that
//!   owns and publishes the live view

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod port;

// Re-export key types at the crate root for convenience.
pub use adapter::{parse_scan_response, HttpScanBackend, ScanMetrics, SimulatedBackend};
pub use config::PollerConfig;
pub use domain::bssid::{canonical_hw_address, BssidId};
pub use domain::history::SignalHistory;
pub use domain::record::{
    NetworkIdentity, NetworkRecord, ParseIdentityError, RawNetworkEntry, HIDDEN_SSID_PLACEHOLDER,
};
pub use domain::risk::{classify, RiskCategory};
pub use domain::view::ViewState;
pub use error::{AcquisitionError, AcquisitionErrorKind, AcquisitionResult, ConfigError, MacParseError};
pub use pipeline::{
    normalize, CycleOutcome, PollingScheduler, SchedulerPhase, SnapshotNormalizer, TriggerOutcome,
};
pub use port::AcquisitionPort;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
