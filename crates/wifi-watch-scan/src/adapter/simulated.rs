//! Synthetic scanning backend.
//!
//! Produces a fixed roster of access points covering every risk tier, with
//! signal strength drifting smoothly from one acquisition to the next. Used
//! by `--source simulate` and by demos that have no real backend at hand.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::record::RawNetworkEntry;
use crate::error::AcquisitionResult;
use crate::port::AcquisitionPort;

/// One simulated access point.
struct SimulatedAp {
    ssid: Option<&'static str>,
    bssid: &'static str,
    security: &'static str,
    base_dbm: f64,
    connected: bool,
}

const ROSTER: &[SimulatedAp] = &[
    SimulatedAp {
        ssid: Some("HomeNet"),
        bssid: "3c:84:6a:10:22:01",
        security: "WPA2-PSK",
        base_dbm: -42.0,
        connected: true,
    },
    SimulatedAp {
        ssid: Some("HomeNet-6E"),
        bssid: "3c:84:6a:10:22:02",
        security: "WPA3-SAE",
        base_dbm: -55.0,
        connected: false,
    },
    SimulatedAp {
        ssid: Some("CoffeeShop Guest"),
        bssid: "f0:9f:c2:7a:00:11",
        security: "Open",
        base_dbm: -68.0,
        connected: false,
    },
    SimulatedAp {
        ssid: Some("PrinterSetup"),
        bssid: "00:1b:a9:5e:33:90",
        security: "WEP",
        base_dbm: -74.0,
        connected: false,
    },
    SimulatedAp {
        ssid: Some("Neighbour"),
        bssid: "a4:2b:b0:c1:d2:e3",
        security: "WPA-PSK",
        base_dbm: -79.0,
        connected: false,
    },
    SimulatedAp {
        ssid: None,
        bssid: "de:ad:be:ef:00:01",
        security: "WPA2-Enterprise",
        base_dbm: -83.0,
        connected: false,
    },
];

/// Backend that synthesizes a plausible neighbourhood of networks.
pub struct SimulatedBackend {
    tick: AtomicU64,
    latency: Duration,
}

impl SimulatedBackend {
    /// Create a simulator that answers immediately.
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Delay every acquisition by `latency`, imitating a radio scan.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of access points in the roster.
    pub fn roster_len(&self) -> usize {
        ROSTER.len()
    }

    fn snapshot(tick: u64) -> Vec<RawNetworkEntry> {
        let t = tick as f64;
        ROSTER
            .iter()
            .enumerate()
            .map(|(i, ap)| {
                let phase = i as f64 * PI / 3.0;
                let drift = 4.0 * (t * 0.35 + phase).sin() + 1.5 * (t * 1.1 + phase).cos();
                RawNetworkEntry {
                    ssid: ap.ssid.map(str::to_owned),
                    bssid: Some(ap.bssid.to_owned()),
                    signal: Some((ap.base_dbm + drift).round()),
                    security: Some(ap.security.to_owned()),
                    connected: ap.connected,
                }
            })
            .collect()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AcquisitionPort for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn acquire(&self) -> AcquisitionResult<Vec<RawNetworkEntry>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        Ok(Self::snapshot(tick))
    }
}
