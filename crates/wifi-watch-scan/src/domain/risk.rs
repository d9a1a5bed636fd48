//! Security-posture classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk level derived from a network's security descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Open or WEP: traffic is readable by anyone in range.
    High,
    /// Legacy WPA, or a descriptor we cannot place.
    Moderate,
    /// WPA2, WPA3, or a generic encrypted marker such as `Secured`.
    Safe,
    /// No descriptor reported.
    Unknown,
}

impl RiskCategory {
    /// Legend text shown next to each badge colour.
    pub fn legend(&self) -> &'static str {
        match self {
            Self::High => "High Risk (Open/WEP)",
            Self::Moderate => "Moderate (WPA/Unknown)",
            Self::Safe => "Safe (WPA2/WPA3)",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Safe => write!(f, "Safe"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classify a security descriptor.
///
/// Case-insensitive substring match, first match wins:
/// 1. absent or blank -> [`RiskCategory::Unknown`]
/// 2. contains `open` or `wep` -> [`RiskCategory::High`]
/// 3. contains `wpa2` or `wpa3` -> [`RiskCategory::Safe`]
/// 4. any other `wpa` -> [`RiskCategory::Moderate`]
/// 5. the generic `Secured` marker some backends report for any encrypted
///    network -> [`RiskCategory::Safe`]
/// 6. anything else -> [`RiskCategory::Moderate`]
pub fn classify(descriptor: Option<&str>) -> RiskCategory {
    let Some(descriptor) = descriptor.map(str::trim).filter(|d| !d.is_empty()) else {
        return RiskCategory::Unknown;
    };

    let lower = descriptor.to_ascii_lowercase();
    if lower.contains("open") || lower.contains("wep") {
        RiskCategory::High
    } else if lower.contains("wpa2") || lower.contains("wpa3") {
        RiskCategory::Safe
    } else if lower.contains("wpa") {
        RiskCategory::Moderate
    } else if lower.contains("secured") {
        RiskCategory::Safe
    } else {
        RiskCategory::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_descriptors() {
        assert_eq!(classify(Some("WEP")), RiskCategory::High);
        assert_eq!(classify(Some("Open")), RiskCategory::High);
        assert_eq!(classify(Some("WPA2-PSK")), RiskCategory::Safe);
        assert_eq!(classify(Some("WPA")), RiskCategory::Moderate);
        assert_eq!(classify(Some("xyz-unknown")), RiskCategory::Moderate);
        assert_eq!(classify(None), RiskCategory::Unknown);
    }

    #[test]
    fn blank_is_unknown() {
        assert_eq!(classify(Some("")), RiskCategory::Unknown);
        assert_eq!(classify(Some("   ")), RiskCategory::Unknown);
    }

    #[test]
    fn precedence_and_case() {
        assert_eq!(classify(Some("wpa3-sae")), RiskCategory::Safe);
        assert_eq!(classify(Some("WPA/WPA2 mixed")), RiskCategory::Safe);
        assert_eq!(classify(Some("WPA-PSK")), RiskCategory::Moderate);
        // weak tier wins over a strong token in the same descriptor
        assert_eq!(classify(Some("WEP+WPA2")), RiskCategory::High);
        assert_eq!(classify(Some("OPEN")), RiskCategory::High);
    }

    #[test]
    fn generic_secured_marker_is_safe() {
        assert_eq!(classify(Some("Secured")), RiskCategory::Safe);
        assert_eq!(classify(Some("secured (enterprise)")), RiskCategory::Safe);
        // a named legacy or weak scheme still decides the tier
        assert_eq!(classify(Some("WPA secured")), RiskCategory::Moderate);
        assert_eq!(classify(Some("Secured WEP")), RiskCategory::High);
        assert_eq!(classify(Some("xyz-unknown")), RiskCategory::Moderate);
    }

    proptest! {
        #[test]
        fn prop_classify_is_deterministic(s in ".*") {
            prop_assert_eq!(classify(Some(&s)), classify(Some(&s)));
        }

        #[test]
        fn prop_weak_tokens_always_high(prefix in "[a-z0-9 -]{0,8}", suffix in "[a-z0-9 -]{0,8}") {
            let s = format!("{prefix}WeP{suffix}");
            prop_assert_eq!(classify(Some(&s)), RiskCategory::High);
        }

        #[test]
        fn prop_non_blank_is_never_unknown(s in "[ -~]*[!-~][ -~]*") {
            prop_assert_ne!(classify(Some(&s)), RiskCategory::Unknown);
        }
    }
}
