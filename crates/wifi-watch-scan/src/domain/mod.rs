//! Domain types for the live network view.

pub mod bssid;
pub mod history;
pub mod record;
pub mod risk;
pub mod view;

pub use bssid::{canonical_hw_address, BssidId};
pub use history::SignalHistory;
pub use record::{
    NetworkIdentity, NetworkRecord, ParseIdentityError, RawNetworkEntry, HIDDEN_SSID_PLACEHOLDER,
};
pub use risk::{classify, RiskCategory};
pub use view::ViewState;
