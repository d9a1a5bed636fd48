//! Hardware-address value object.
//!
//! Backends report BSSIDs in whatever shape their platform API hands them
//! out (`AA:BB:CC:DD:EE:FF`, `aa-bb-cc-dd-ee-ff`, or with a trailing
//! separator). [`BssidId`] canonicalises all of those so the same access
//! point keeps one identity across cycles.

use std::fmt;

use crate::error::MacParseError;

// ---------------------------------------------------------------------------
// BssidId -- Value Object
// ---------------------------------------------------------------------------

/// A BSSID wrapping a 6-byte IEEE 802.11 MAC address.
///
/// Two `BssidId` values are equal when their MAC bytes match, regardless of
/// how the source string was spelled.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BssidId(pub [u8; 6]);

impl BssidId {
    /// Parse a `BssidId` from a hex string separated by `:` or `-`, such as
    /// `"aa:bb:cc:dd:ee:ff"`. Case is ignored and one trailing separator is
    /// tolerated.
    pub fn parse(s: &str) -> Result<Self, MacParseError> {
        let err = || MacParseError {
            input: s.to_owned(),
        };

        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_suffix(':')
            .or_else(|| trimmed.strip_suffix('-'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = trimmed.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(err());
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || part.len() > 2 {
                return Err(err());
            }
            bytes[i] = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }

    /// Return the raw 6-byte MAC address.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for BssidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BssidId({self})")
    }
}

impl fmt::Display for BssidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Canonical form of a reported hardware address.
///
/// Well-formed MACs are rendered lower-case and colon-separated; anything
/// else is kept as reported (trimmed) so it can still serve as a key.
/// Returns `None` for an absent or blank address.
pub fn canonical_hw_address(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(match BssidId::parse(raw) {
        Ok(id) => id.to_string(),
        Err(_) => raw.to_owned(),
    })
}
