//! The externally observable state of the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{NetworkIdentity, NetworkRecord};
use crate::error::AcquisitionError;

/// One immutable snapshot of the live network view.
///
/// A new `ViewState` replaces the previous one wholesale on every
/// publication; nothing mutates a published value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Networks in the order the backend reported them.
    pub networks: Vec<NetworkRecord>,
    /// True while an acquisition is outstanding.
    pub loading: bool,
    /// Message from the most recent failed cycle.
    pub error: Option<String>,
    /// Completion time of the most recent successful cycle.
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of cycles started so far.
    pub cycle: u64,
}

impl ViewState {
    /// The state before the first cycle: no networks, loading.
    pub fn initial() -> Self {
        Self {
            networks: Vec::new(),
            loading: true,
            error: None,
            last_updated: None,
            cycle: 0,
        }
    }

    /// Look up a network by identity ("select network").
    ///
    /// If the snapshot holds several records with the same identity the
    /// later one is returned, matching how the next cycle merges history.
    pub fn network(&self, identity: &NetworkIdentity) -> Option<&NetworkRecord> {
        self.networks.iter().rev().find(|n| &n.identity == identity)
    }

    /// The record for the network this host is associated with.
    pub fn connected_network(&self) -> Option<&NetworkRecord> {
        self.networks.iter().find(|n| n.is_connected_network)
    }

    /// Whether the most recent completed cycle failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Same state with the busy flag raised.
    #[must_use]
    pub(crate) fn with_loading(&self) -> Self {
        Self {
            loading: true,
            ..self.clone()
        }
    }

    /// State published when a cycle starts: busy, error cleared.
    #[must_use]
    pub(crate) fn begin_cycle(&self) -> Self {
        Self {
            loading: true,
            error: None,
            cycle: self.cycle + 1,
            ..self.clone()
        }
    }

    /// State published when a cycle's acquisition succeeded.
    #[must_use]
    pub(crate) fn succeeded(&self, networks: Vec<NetworkRecord>, now: DateTime<Utc>) -> Self {
        let last_updated = match self.last_updated {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        Self {
            networks,
            loading: false,
            error: None,
            last_updated: Some(last_updated),
            cycle: self.cycle,
        }
    }

    /// State published when a cycle's acquisition failed. Known networks
    /// and the last success time are kept.
    #[must_use]
    pub(crate) fn failed(&self, error: &AcquisitionError) -> Self {
        Self {
            loading: false,
            error: Some(error.to_string()),
            ..self.clone()
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::SignalHistory;
    use crate::domain::risk::RiskCategory;
    use chrono::Duration;

    fn record(name: &str, connected: bool) -> NetworkRecord {
        NetworkRecord {
            identity: NetworkIdentity::Name(name.into()),
            display_name: Some(name.into()),
            hw_address: None,
            signal_strength: Some(-60),
            security_descriptor: None,
            is_connected_network: connected,
            risk_category: RiskCategory::Unknown,
            history: SignalHistory::from_samples([-60], 10),
        }
    }

    #[test]
    fn initial_state_is_loading_and_empty() {
        let v = ViewState::initial();
        assert!(v.loading);
        assert!(v.networks.is_empty());
        assert!(v.error.is_none());
        assert!(v.last_updated.is_none());
    }

    #[test]
    fn failure_keeps_networks_and_timestamp() {
        let now = Utc::now();
        let ok = ViewState::initial()
            .begin_cycle()
            .succeeded(vec![record("a", false)], now);
        let failed = ok.begin_cycle().failed(&AcquisitionError::timeout(7000));

        assert_eq!(failed.networks, ok.networks);
        assert_eq!(failed.last_updated, Some(now));
        assert!(!failed.loading);
        assert!(failed.is_error());
    }

    #[test]
    fn begin_cycle_clears_error() {
        let failed = ViewState::initial()
            .begin_cycle()
            .failed(&AcquisitionError::transport("down"));
        let next = failed.begin_cycle();
        assert!(next.error.is_none());
        assert!(next.loading);
        assert_eq!(next.cycle, 2);
    }

    #[test]
    fn last_updated_never_goes_backwards() {
        let now = Utc::now();
        let first = ViewState::initial().succeeded(Vec::new(), now);
        let second = first.succeeded(Vec::new(), now - Duration::seconds(30));
        assert_eq!(second.last_updated, Some(now));
    }

    #[test]
    fn select_network_and_connected() {
        let v = ViewState::initial().succeeded(vec![record("a", false), record("b", true)], Utc::now());
        assert_eq!(
            v.network(&NetworkIdentity::Name("b".into()))
                .and_then(|n| n.display_name.as_deref()),
            Some("b")
        );
        assert!(v.network(&NetworkIdentity::Position(0)).is_none());
        assert_eq!(
            v.connected_network().and_then(|n| n.display_name.as_deref()),
            Some("b")
        );
    }
}
