//! Adapter implementations for the [`AcquisitionPort`](crate::port::AcquisitionPort) port.
//!
//! - [`HttpScanBackend`]: JSON scanning backend reached over HTTP.
//! - [`SimulatedBackend`]: synthetic networks with drifting signal.

pub mod http_backend;
pub mod simulated;

pub use http_backend::{parse_scan_response, HttpScanBackend, ScanMetrics};
pub use simulated::SimulatedBackend;
