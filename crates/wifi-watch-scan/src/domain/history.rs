//! Bounded per-network signal history.

use serde::{Deserialize, Serialize};

/// Recent signal-strength samples (dBm) for one network, oldest first.
///
/// `SignalHistory` is a value: [`appended`](Self::appended) returns a new
/// history and never touches `self`, so a published view can be read while
/// the next one is being built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalHistory {
    samples: Vec<i32>,
}

impl SignalHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from samples in arrival order, keeping the most
    /// recent `capacity` of them.
    pub fn from_samples<I>(samples: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let mut samples: Vec<i32> = samples.into_iter().collect();
        let excess = samples.len().saturating_sub(capacity);
        samples.drain(..excess);
        Self { samples }
    }

    /// Return a new history with `sample` appended.
    ///
    /// An absent sample leaves the history as it was. When the result would
    /// exceed `capacity`, the oldest samples are dropped first.
    #[must_use]
    pub fn appended(&self, sample: Option<i32>, capacity: usize) -> Self {
        let Some(sample) = sample else {
            return Self::from_samples(self.samples.iter().copied(), capacity);
        };

        let keep = capacity.saturating_sub(1).min(self.samples.len());
        let mut samples = Vec::with_capacity(keep + 1);
        samples.extend_from_slice(&self.samples[self.samples.len() - keep..]);
        if capacity > 0 {
            samples.push(sample);
        }
        Self { samples }
    }

    /// The samples, oldest first.
    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<i32> {
        self.samples.last().copied()
    }

    /// Weakest and strongest sample, for axis scaling in the render layer.
    pub fn range(&self) -> Option<(i32, i32)> {
        let min = self.samples.iter().copied().min()?;
        let max = self.samples.iter().copied().max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn appends_until_capacity_then_evicts_oldest() {
        let mut h = SignalHistory::new();
        for s in [-50, -51, -52] {
            h = h.appended(Some(s), 3);
        }
        assert_eq!(h.as_slice(), &[-50, -51, -52]);

        let h = h.appended(Some(-53), 3);
        assert_eq!(h.as_slice(), &[-51, -52, -53]);
        assert_eq!(h.latest(), Some(-53));
    }

    #[test]
    fn absent_sample_is_noop() {
        let h = SignalHistory::from_samples([-60, -61], 10);
        assert_eq!(h.appended(None, 10), h);
    }

    #[test]
    fn original_is_untouched() {
        let h = SignalHistory::from_samples([-60], 10);
        let next = h.appended(Some(-70), 10);
        assert_eq!(h.as_slice(), &[-60]);
        assert_eq!(next.as_slice(), &[-60, -70]);
    }

    #[test]
    fn shrinking_capacity_trims_from_the_front() {
        let h = SignalHistory::from_samples(1..=6, 10);
        assert_eq!(h.appended(Some(7), 3).as_slice(), &[5, 6, 7]);
        assert_eq!(h.appended(None, 2).as_slice(), &[5, 6]);
    }

    #[test]
    fn range_of_samples() {
        assert_eq!(SignalHistory::new().range(), None);
        let h = SignalHistory::from_samples([-70, -40, -55], 10);
        assert_eq!(h.range(), Some((-70, -40)));
    }

    proptest! {
        #[test]
        fn prop_history_is_last_n_present_samples(
            samples in proptest::collection::vec(proptest::option::of(-120i32..0), 0..60),
            capacity in 1usize..16,
        ) {
            let mut h = SignalHistory::new();
            for s in &samples {
                h = h.appended(*s, capacity);
                prop_assert!(h.len() <= capacity);
            }

            let present: Vec<i32> = samples.iter().flatten().copied().collect();
            let expected = &present[present.len().saturating_sub(capacity)..];
            prop_assert_eq!(h.as_slice(), expected);
        }
    }
}
