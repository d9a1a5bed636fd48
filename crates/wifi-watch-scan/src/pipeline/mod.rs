//! Acquisition pipeline.
//!
//! ## Stages
//!
//! 1. [`scheduler`] -- timer and manual triggers, single-flight acquisition
//!    under a timeout, publication of the [`ViewState`](crate::ViewState)
//! 2. [`normalizer`] -- merges each raw snapshot with the previous view,
//!    extending signal history by identity and classifying risk

pub mod normalizer;
pub mod scheduler;

pub use normalizer::{normalize, SnapshotNormalizer};
pub use scheduler::{CycleOutcome, PollingScheduler, SchedulerPhase, TriggerOutcome};
