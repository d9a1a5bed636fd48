//! Adapter that acquires networks from a JSON scanning backend over HTTP.
//!
//! The backend answers `GET <url>` with
//!
//! ```json
//! { "networks": [ { "ssid": "Net1", "bssid": "aa:bb:cc:dd:ee:ff",
//!                   "signal": -50, "security": "WPA2", "connected": false } ] }
//! ```
//!
//! Extra fields are ignored. A body that is not JSON, or that has no
//! `networks` array, is a malformed response. Individual entries that are not
//! objects degrade to an all-absent entry instead of failing the snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;

use crate::domain::record::RawNetworkEntry;
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::port::AcquisitionPort;

// ---------------------------------------------------------------------------
// Scan metrics
// ---------------------------------------------------------------------------

/// Accumulated metrics from acquisitions against one backend.
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    /// Acquisitions attempted since creation.
    pub scan_count: u64,
    /// Acquisitions that returned an error.
    pub failure_count: u64,
    /// Networks returned across all successful acquisitions.
    pub total_networks_observed: u64,
    /// Duration of the most recent acquisition.
    pub last_scan_duration: Option<Duration>,
}

// ---------------------------------------------------------------------------
// HttpScanBackend
// ---------------------------------------------------------------------------

/// Scanning backend reached over HTTP.
pub struct HttpScanBackend {
    client: Client,
    url: String,
    /// Client-side request timeout, if one was configured.
    timeout: Option<Duration>,
    scan_count: AtomicU64,
    failure_count: AtomicU64,
    total_networks: AtomicU64,
    last_scan_duration: Mutex<Option<Duration>>,
}

impl HttpScanBackend {
    /// Where the reference backend listens.
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8000/scan";

    /// Create an adapter for `url` without a client-side timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Transport`] if the HTTP client cannot be
    /// initialised.
    pub fn new(url: impl Into<String>) -> AcquisitionResult<Self> {
        Self::build(url.into(), None)
    }

    /// Create an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Transport`] if the HTTP client cannot be
    /// initialised.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> AcquisitionResult<Self> {
        Self::build(url.into(), Some(timeout))
    }

    fn build(url: String, timeout: Option<Duration>) -> AcquisitionResult<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "wifi-watch/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AcquisitionError::transport(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            url,
            timeout,
            scan_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            total_networks: AtomicU64::new(0),
            last_scan_duration: Mutex::new(None),
        })
    }

    /// The backend URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Return accumulated scan metrics.
    pub fn metrics(&self) -> ScanMetrics {
        ScanMetrics {
            scan_count: self.scan_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            total_networks_observed: self.total_networks.load(Ordering::Relaxed),
            last_scan_duration: *self.last_scan_duration.lock(),
        }
    }

    async fn fetch(&self) -> AcquisitionResult<Vec<RawNetworkEntry>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::transport(format!(
                "backend returned HTTP {status}"
            )));
        }

        let body = response.text().await.map_err(|e| self.map_error(&e))?;
        parse_scan_response(&body)
    }

    fn map_error(&self, err: &reqwest::Error) -> AcquisitionError {
        if err.is_timeout() {
            let timeout_ms = self
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
            AcquisitionError::timeout(timeout_ms)
        } else if err.is_decode() {
            AcquisitionError::malformed(err.to_string())
        } else {
            AcquisitionError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl AcquisitionPort for HttpScanBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn acquire(&self) -> AcquisitionResult<Vec<RawNetworkEntry>> {
        let start = Instant::now();
        let result = self.fetch().await;
        let elapsed = start.elapsed();

        *self.last_scan_duration.lock() = Some(elapsed);
        self.scan_count.fetch_add(1, Ordering::Relaxed);

        match &result {
            Ok(networks) => {
                self.total_networks
                    .fetch_add(networks.len() as u64, Ordering::Relaxed);
                tracing::debug!(
                    url = %self.url,
                    network_count = networks.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "HTTP acquisition complete"
                );
            }
            Err(e) => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    url = %self.url,
                    error = %e,
                    elapsed_ms = elapsed.as_millis(),
                    "HTTP acquisition failed"
                );
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a backend response body into raw entries.
///
/// # Errors
///
/// Returns [`AcquisitionError::MalformedResponse`] if the body is not JSON or
/// lacks a `networks` array.
pub fn parse_scan_response(body: &str) -> AcquisitionResult<Vec<RawNetworkEntry>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AcquisitionError::malformed(format!("body is not JSON ({e})")))?;

    let networks = value
        .get("networks")
        .and_then(Value::as_array)
        .ok_or_else(|| AcquisitionError::malformed("missing `networks` array"))?;

    Ok(networks
        .iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item.clone()).unwrap_or_default(),
            _ => RawNetworkEntry::default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskCategory;
    use crate::domain::view::ViewState;

    #[test]
    fn parses_reference_backend_body() {
        let body = r#"{"networks": [
            {"ssid": "Net1", "bssid": "aa:bb:cc:dd:ee:ff:", "signal": -50,
             "security": "Secured", "risk": "Safe", "connected": true,
             "signal_history": [-52, -50]},
            {"ssid": "Hidden SSID", "bssid": "11:22:33:44:55:66", "signal": -80,
             "security": "Open", "connected": false}
        ]}"#;

        let entries = parse_scan_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ssid.as_deref(), Some("Net1"));
        assert!(entries[0].connected);
        assert_eq!(entries[1].present_ssid(), None);
        assert_eq!(entries[1].signal_dbm(), Some(-80));

        // The backend's own `risk` field is ignored; the descriptor decides.
        let records = crate::pipeline::normalize(&ViewState::initial(), &entries, 10);
        assert_eq!(records[0].risk_category, RiskCategory::Safe);
        assert!(records[0].is_connected_network);
        assert_eq!(records[1].risk_category, RiskCategory::High);
        assert_eq!(records[1].display_name, None);
    }

    #[test]
    fn empty_collection_is_valid() {
        assert!(parse_scan_response(r#"{"networks": []}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_collection_is_malformed() {
        for body in [r#"{"error": "no adapter"}"#, r#"{"networks": 3}"#, "[]", "<html>"] {
            let err = parse_scan_response(body).unwrap_err();
            assert!(
                matches!(err, AcquisitionError::MalformedResponse { .. }),
                "{body}: {err:?}"
            );
        }
    }

    #[test]
    fn non_object_entries_degrade_to_unknown() {
        let entries = parse_scan_response(r#"{"networks": [null, "x", {"ssid": "a"}]}"#).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], RawNetworkEntry::default());
        assert_eq!(entries[1], RawNetworkEntry::default());
        assert_eq!(entries[2].ssid.as_deref(), Some("a"));
    }

    #[test]
    fn new_backend_has_zero_metrics() {
        let backend = HttpScanBackend::new(HttpScanBackend::DEFAULT_URL).unwrap();
        let m = backend.metrics();
        assert_eq!(m.scan_count, 0);
        assert_eq!(m.failure_count, 0);
        assert!(m.last_scan_duration.is_none());
        assert_eq!(backend.url(), "http://127.0.0.1:8000/scan");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is essentially never listening.
        let backend =
            HttpScanBackend::with_timeout("http://127.0.0.1:9/scan", Duration::from_secs(2))
                .unwrap();
        let err = backend.acquire().await.unwrap_err();
        assert!(
            matches!(
                err,
                AcquisitionError::Transport { .. } | AcquisitionError::Timeout { .. }
            ),
            "{err:?}"
        );
        assert_eq!(backend.metrics().failure_count, 1);
    }

    #[test]
    fn implements_port_and_send_sync() {
        fn assert_port<T: AcquisitionPort>() {}
        fn assert_send_sync<T: Send + Sync>() {}
        assert_port::<HttpScanBackend>();
        assert_send_sync::<HttpScanBackend>();
    }
}
