//! Raw backend entries and the normalized per-network record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::bssid::canonical_hw_address;
use super::history::SignalHistory;
use super::risk::RiskCategory;

/// Placeholder some backends substitute for a hidden network's name.
pub const HIDDEN_SSID_PLACEHOLDER: &str = "Hidden SSID";

// ---------------------------------------------------------------------------
// RawNetworkEntry
// ---------------------------------------------------------------------------

/// One network as reported by a scanning backend, before normalization.
///
/// Every field is optional. Deserialization is lenient: a field of the wrong
/// JSON type reads as absent instead of failing the whole snapshot, and
/// unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNetworkEntry {
    /// Network name.
    #[serde(default, alias = "name", deserialize_with = "lenient_string")]
    pub ssid: Option<String>,
    /// Hardware address of the access point.
    #[serde(default, alias = "mac", deserialize_with = "lenient_string")]
    pub bssid: Option<String>,
    /// Signal strength in dBm.
    #[serde(default, deserialize_with = "lenient_number")]
    pub signal: Option<f64>,
    /// Free-form security descriptor (`"WPA2-PSK"`, `"Open"`, ...).
    #[serde(default, deserialize_with = "lenient_string")]
    pub security: Option<String>,
    /// Whether this host is associated with the network.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub connected: bool,
}

impl RawNetworkEntry {
    /// An entry with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network name.
    #[must_use]
    pub fn with_ssid(mut self, ssid: impl Into<String>) -> Self {
        self.ssid = Some(ssid.into());
        self
    }

    /// Set the hardware address.
    #[must_use]
    pub fn with_bssid(mut self, bssid: impl Into<String>) -> Self {
        self.bssid = Some(bssid.into());
        self
    }

    /// Set the signal strength.
    #[must_use]
    pub fn with_signal(mut self, dbm: f64) -> Self {
        self.signal = Some(dbm);
        self
    }

    /// Set the security descriptor.
    #[must_use]
    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    /// Mark the entry as the associated network.
    #[must_use]
    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// The reported name, or `None` when blank or the hidden placeholder.
    pub fn present_ssid(&self) -> Option<&str> {
        self.ssid
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != HIDDEN_SSID_PLACEHOLDER)
    }

    /// The reported security descriptor, or `None` when blank.
    pub fn present_security(&self) -> Option<&str> {
        self.security
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The signal as whole dBm, or `None` if it is not a finite number.
    #[allow(clippy::cast_possible_truncation)] // clamped to the i32 range first
    pub fn signal_dbm(&self) -> Option<i32> {
        self.signal
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

// ---------------------------------------------------------------------------
// NetworkIdentity
// ---------------------------------------------------------------------------

/// Key used to correlate a network across cycles.
///
/// Resolution prefers the hardware address, then the name, then the entry's
/// position in the snapshot. Only the first two are stable across cycles;
/// positional identities carry no continuity guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum NetworkIdentity {
    /// Canonical hardware address.
    HwAddress(String),
    /// Network name.
    Name(String),
    /// Index within the snapshot that produced the record.
    Position(usize),
}

impl NetworkIdentity {
    /// Resolve the identity of the entry at `index` in its snapshot.
    pub fn resolve(entry: &RawNetworkEntry, index: usize) -> Self {
        if let Some(hw) = canonical_hw_address(entry.bssid.as_deref()) {
            Self::HwAddress(hw)
        } else if let Some(name) = entry.present_ssid() {
            Self::Name(name.to_owned())
        } else {
            Self::Position(index)
        }
    }

    /// Whether this identity survives across cycles.
    pub fn is_stable(&self) -> bool {
        !matches!(self, Self::Position(_))
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HwAddress(hw) => write!(f, "hw:{hw}"),
            Self::Name(name) => write!(f, "name:{name}"),
            Self::Position(idx) => write!(f, "pos:{idx}"),
        }
    }
}

/// Error returned when parsing a [`NetworkIdentity`] from its display form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid network identity '{0}': expected hw:<addr>, name:<ssid> or pos:<n>")]
pub struct ParseIdentityError(pub String);

impl FromStr for NetworkIdentity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdentityError(s.to_owned());
        let (kind, key) = s.split_once(':').ok_or_else(err)?;
        if key.is_empty() {
            return Err(err());
        }
        match kind {
            "hw" => Ok(Self::HwAddress(
                canonical_hw_address(Some(key)).ok_or_else(err)?,
            )),
            "name" => Ok(Self::Name(key.to_owned())),
            "pos" => key.parse().map(Self::Position).map_err(|_| err()),
            _ => Err(err()),
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkRecord
// ---------------------------------------------------------------------------

/// A normalized network as published in a [`ViewState`](super::view::ViewState).
///
/// Absent fields stay absent; turning them into "Hidden SSID" or "Unknown"
/// is left to whoever renders the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    /// Cross-cycle key.
    pub identity: NetworkIdentity,
    /// Network name; `None` for hidden networks.
    pub display_name: Option<String>,
    /// Canonical hardware address, when reported.
    pub hw_address: Option<String>,
    /// Latest signal strength in dBm.
    pub signal_strength: Option<i32>,
    /// Security descriptor as reported.
    pub security_descriptor: Option<String>,
    /// Whether this host is associated with the network.
    pub is_connected_network: bool,
    /// Derived from `security_descriptor` when the record was built.
    pub risk_category: RiskCategory,
    /// Recent signal samples, oldest first.
    pub history: SignalHistory,
}
