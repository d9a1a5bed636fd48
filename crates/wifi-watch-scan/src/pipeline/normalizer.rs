//! Snapshot normalization (Domain Service).
//!
//! Turns one raw acquisition into [`NetworkRecord`]s, carrying each network's
//! signal history forward from the previous view by identity. Pure: no I/O,
//! no clock, no shared state.

use std::collections::HashMap;

use crate::domain::bssid::canonical_hw_address;
use crate::domain::history::SignalHistory;
use crate::domain::record::{NetworkIdentity, NetworkRecord, RawNetworkEntry};
use crate::domain::risk::classify;
use crate::domain::view::ViewState;

/// Merges raw snapshots against the previous view.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotNormalizer {
    max_history: usize,
}

impl SnapshotNormalizer {
    /// Create a normalizer that keeps `max_history` samples per network.
    pub fn new(max_history: usize) -> Self {
        Self { max_history }
    }

    /// The per-network history bound.
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Normalize `raw` against `previous`.
    ///
    /// Output order matches `raw`. Networks absent from `raw` are dropped.
    /// When `previous` holds several records with one identity, the later
    /// one seeds the history.
    pub fn normalize(&self, previous: &ViewState, raw: &[RawNetworkEntry]) -> Vec<NetworkRecord> {
        let prior: HashMap<&NetworkIdentity, &SignalHistory> = previous
            .networks
            .iter()
            .map(|n| (&n.identity, &n.history))
            .collect();

        raw.iter()
            .enumerate()
            .map(|(index, entry)| {
                let identity = NetworkIdentity::resolve(entry, index);
                let signal_strength = entry.signal_dbm();
                let empty = SignalHistory::new();
                let base = prior.get(&identity).copied().unwrap_or(&empty);
                let security_descriptor = entry.present_security().map(str::to_owned);

                NetworkRecord {
                    display_name: entry.present_ssid().map(str::to_owned),
                    hw_address: canonical_hw_address(entry.bssid.as_deref()),
                    signal_strength,
                    risk_category: classify(security_descriptor.as_deref()),
                    security_descriptor,
                    is_connected_network: entry.connected,
                    history: base.appended(signal_strength, self.max_history),
                    identity,
                }
            })
            .collect()
    }
}

/// Free-function form of [`SnapshotNormalizer::normalize`].
pub fn normalize(
    previous: &ViewState,
    raw: &[RawNetworkEntry],
    max_history: usize,
) -> Vec<NetworkRecord> {
    SnapshotNormalizer::new(max_history).normalize(previous, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskCategory;
    use chrono::Utc;

    fn publish(networks: Vec<NetworkRecord>) -> ViewState {
        ViewState::initial().begin_cycle().succeeded(networks, Utc::now())
    }

    fn net(mac: &str, signal: f64) -> RawNetworkEntry {
        RawNetworkEntry::new()
            .with_ssid("Net1")
            .with_bssid(mac)
            .with_signal(signal)
            .with_security("WPA2")
    }

    #[test]
    fn first_snapshot_starts_history() {
        let records = normalize(&ViewState::initial(), &[net("AA:BB", -50.0)], 10);
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.identity, NetworkIdentity::HwAddress("AA:BB".into()));
        assert_eq!(r.display_name.as_deref(), Some("Net1"));
        assert_eq!(r.risk_category, RiskCategory::Safe);
        assert_eq!(r.history.as_slice(), &[-50]);
    }

    #[test]
    fn same_identity_continues_history() {
        let first = publish(normalize(&ViewState::initial(), &[net("AA:BB", -50.0)], 10));
        let second = normalize(&first, &[net("AA:BB", -55.0)], 10);
        assert_eq!(second[0].history.as_slice(), &[-50, -55]);
        assert_eq!(second[0].signal_strength, Some(-55));
    }

    #[test]
    fn mac_spelling_does_not_break_continuity() {
        let first = publish(normalize(
            &ViewState::initial(),
            &[net("AA:BB:CC:DD:EE:FF", -50.0)],
            10,
        ));
        let second = normalize(&first, &[net("aa-bb-cc-dd-ee-ff", -51.0)], 10);
        assert_eq!(second[0].history.as_slice(), &[-50, -51]);
    }

    #[test]
    fn vanished_networks_are_dropped_and_order_follows_source() {
        let first = publish(normalize(
            &ViewState::initial(),
            &[net("01", -40.0), net("02", -60.0)],
            10,
        ));
        let second = normalize(&first, &[net("03", -70.0), net("02", -61.0)], 10);

        let ids: Vec<String> = second.iter().map(|r| r.identity.to_string()).collect();
        assert_eq!(ids, vec!["hw:03", "hw:02"]);
        assert_eq!(second[0].history.as_slice(), &[-70]);
        assert_eq!(second[1].history.as_slice(), &[-60, -61]);
    }

    #[test]
    fn unknown_signal_keeps_prior_history() {
        let first = publish(normalize(&ViewState::initial(), &[net("AA", -50.0)], 10));
        let raw = RawNetworkEntry::new().with_bssid("AA").with_signal(f64::NAN);
        let second = normalize(&first, &[raw], 10);

        assert_eq!(second[0].signal_strength, None);
        assert_eq!(second[0].history.as_slice(), &[-50]);
        assert_eq!(second[0].risk_category, RiskCategory::Unknown);
    }

    #[test]
    fn absent_fields_stay_absent() {
        let records = normalize(
            &ViewState::initial(),
            &[RawNetworkEntry::new().with_ssid("Hidden SSID").with_security("  ")],
            10,
        );
        let r = &records[0];
        assert_eq!(r.identity, NetworkIdentity::Position(0));
        assert_eq!(r.display_name, None);
        assert_eq!(r.security_descriptor, None);
        assert_eq!(r.hw_address, None);
        assert!(r.history.is_empty());
    }

    #[test]
    fn duplicate_identity_both_emitted_later_wins_next_cycle() {
        let first = publish(normalize(
            &ViewState::initial(),
            &[net("AA", -50.0), net("AA", -90.0)],
            10,
        ));
        assert_eq!(first.networks.len(), 2);

        let second = normalize(&first, &[net("AA", -60.0)], 10);
        assert_eq!(second[0].history.as_slice(), &[-90, -60]);
    }

    #[test]
    fn history_bounded_by_configured_length() {
        let mut view = ViewState::initial();
        for i in 0..25 {
            view = publish(normalize(&view, &[net("AA", -40.0 - f64::from(i))], 10));
        }
        let history = view.networks[0].history.as_slice();
        assert_eq!(history.len(), 10);
        assert_eq!(history.first(), Some(&-55));
        assert_eq!(history.last(), Some(&-64));
    }
}
