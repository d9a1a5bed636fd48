//! Polling scheduler: the owner of the live [`ViewState`].
//!
//! `PollingScheduler` connects a backend, the normalizer and the published
//! view into a single-flight cycle runner:
//!
//! 1. A cycle is entered from the repeating timer or a manual "scan now".
//!    Only one acquisition may be outstanding; a trigger that finds one in
//!    flight is a no-op.
//! 2. On entry the view is republished with `loading = true` and the
//!    previous error cleared.
//! 3. The acquisition runs under the configured timeout.
//! 4. On success the snapshot is normalized against the view published
//!    immediately before and a new view replaces it. On failure the known
//!    networks are kept and `error` is set.
//!
//! The view lives in a `watch` channel, so readers either poll
//! [`snapshot`](PollingScheduler::snapshot) or await changes on a
//! [`subscribe`](PollingScheduler::subscribe) receiver. Every publication
//! goes through one lock, and once [`shutdown`](PollingScheduler::shutdown)
//! has closed it nothing is published again.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::normalizer::SnapshotNormalizer;
use crate::config::PollerConfig;
use crate::domain::view::ViewState;
use crate::error::{AcquisitionError, ConfigError};
use crate::port::AcquisitionPort;

/// Lifecycle phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerPhase {
    /// No acquisition outstanding.
    Idle,
    /// An acquisition is outstanding.
    Fetching,
    /// Torn down; nothing will be published again.
    ShutDown,
}

impl std::fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::ShutDown => write!(f, "shut_down"),
        }
    }
}

/// Result of a manual "scan now" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new cycle was started.
    Started,
    /// A cycle was already in flight; it will publish on its own.
    AlreadyInFlight,
    /// The scheduler has been shut down.
    ShutDown,
}

/// Result of one awaited cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The acquisition succeeded and this view was published.
    Succeeded(Arc<ViewState>),
    /// The acquisition failed; the view carrying the error was published.
    Failed(AcquisitionError),
    /// Another cycle was in flight, so this one did not run.
    AlreadyInFlight,
    /// The scheduler was shut down before the cycle could publish.
    Suppressed,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    backend: Arc<dyn AcquisitionPort>,
    config: PollerConfig,
    normalizer: SnapshotNormalizer,
    publisher: Mutex<Publisher>,
}

/// Everything a trigger has to decide on atomically: whether publication is
/// still open, which claim (if any) is in flight, and the published view.
struct Publisher {
    open: bool,
    in_flight: Option<u64>,
    next_claim: u64,
    tx: watch::Sender<Arc<ViewState>>,
}

impl Publisher {
    fn replace(&self, next: impl FnOnce(&ViewState) -> ViewState) -> Arc<ViewState> {
        let current = self.tx.borrow().clone();
        let view = Arc::new(next(&current));
        self.tx.send_replace(Arc::clone(&view));
        view
    }

    /// Raise `loading` unless it is already raised.
    fn raise_loading(&self) {
        if !self.tx.borrow().loading {
            self.replace(ViewState::with_loading);
        }
    }
}

/// Why a claim was refused.
enum Refused {
    InFlight,
    ShutDown,
}

impl Shared {
    fn current(&self) -> Arc<ViewState> {
        self.publisher.lock().tx.borrow().clone()
    }

    fn is_open(&self) -> bool {
        self.publisher.lock().open
    }

    /// Replace the view with `next(current)`, unless shut down.
    fn publish<F>(&self, next: F) -> Option<Arc<ViewState>>
    where
        F: FnOnce(&ViewState) -> ViewState,
    {
        let publisher = self.publisher.lock();
        publisher.open.then(|| publisher.replace(next))
    }

    /// Take the in-flight slot and raise `loading`, as one step.
    fn try_claim(self: &Arc<Self>) -> Result<InFlightClaim, Refused> {
        let mut publisher = self.publisher.lock();
        if !publisher.open {
            return Err(Refused::ShutDown);
        }
        if publisher.in_flight.is_some() {
            publisher.raise_loading();
            return Err(Refused::InFlight);
        }
        let id = publisher.next_claim;
        publisher.next_claim += 1;
        publisher.in_flight = Some(id);
        publisher.raise_loading();

        Ok(InFlightClaim {
            shared: Arc::clone(self),
            id,
        })
    }

    /// Publish the final view of a cycle and release its claim under the
    /// same lock, so no trigger can observe one without the other.
    fn finish<F>(&self, claim: &InFlightClaim, next: F) -> Option<Arc<ViewState>>
    where
        F: FnOnce(&ViewState) -> ViewState,
    {
        let mut publisher = self.publisher.lock();
        if publisher.in_flight == Some(claim.id) {
            publisher.in_flight = None;
        }
        publisher.open.then(|| publisher.replace(next))
    }

    fn release(&self, id: u64) {
        let mut publisher = self.publisher.lock();
        if publisher.in_flight == Some(id) {
            publisher.in_flight = None;
        }
    }
}

/// Exclusive right to run one acquisition. Released when the cycle's final
/// view is published, or on drop if the owning task ends early.
struct InFlightClaim {
    shared: Arc<Shared>,
    id: u64,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.shared.release(self.id);
    }
}

async fn execute(claim: InFlightClaim) -> CycleOutcome {
    let shared = &claim.shared;

    let Some(begun) = shared.publish(ViewState::begin_cycle) else {
        return CycleOutcome::Suppressed;
    };
    let cycle = begun.cycle;
    let start = Instant::now();
    debug!(cycle, backend = shared.backend.name(), "cycle started");

    let timeout = shared.config.acquisition_timeout();
    let result = match time::timeout(timeout, shared.backend.acquire()).await {
        Ok(result) => result,
        Err(_) => Err(AcquisitionError::timeout(shared.config.acquisition_timeout_ms)),
    };
    let elapsed_ms = start.elapsed().as_millis();

    match result {
        Ok(raw) => {
            let published = shared.finish(&claim, |previous| {
                let networks = shared.normalizer.normalize(previous, &raw);
                previous.succeeded(networks, Utc::now())
            });
            match published {
                Some(view) => {
                    info!(
                        cycle,
                        network_count = view.networks.len(),
                        elapsed_ms,
                        "cycle complete"
                    );
                    CycleOutcome::Succeeded(view)
                }
                None => {
                    debug!(cycle, "acquisition resolved after shutdown; result dropped");
                    CycleOutcome::Suppressed
                }
            }
        }
        Err(error) => match shared.finish(&claim, |previous| previous.failed(&error)) {
            Some(_) => {
                warn!(cycle, elapsed_ms, error = %error, "acquisition failed");
                CycleOutcome::Failed(error)
            }
            None => {
                debug!(cycle, "acquisition failed after shutdown; result dropped");
                CycleOutcome::Suppressed
            }
        },
    }
}

async fn tick_loop(shared: Arc<Shared>) {
    let mut interval = time::interval(shared.config.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if !shared.is_open() {
            break;
        }
        match shared.try_claim() {
            Ok(claim) => {
                tokio::spawn(execute(claim));
            }
            Err(Refused::InFlight) => debug!("timer tick skipped: acquisition already in flight"),
            Err(Refused::ShutDown) => break,
        }
    }
}

// ---------------------------------------------------------------------------
// PollingScheduler
// ---------------------------------------------------------------------------

/// Drives periodic acquisition and owns the published [`ViewState`].
///
/// Construct once at startup, call [`start`](Self::start) from inside a
/// tokio runtime, and [`shutdown`](Self::shutdown) on teardown. Dropping the
/// scheduler shuts it down as well.
///
/// ```no_run
/// use std::sync::Arc;
/// use wifi_watch_scan::{PollerConfig, PollingScheduler, SimulatedBackend};
///
/// # async fn demo() -> Result<(), wifi_watch_scan::ConfigError> {
/// let scheduler = PollingScheduler::new(Arc::new(SimulatedBackend::new()), PollerConfig::default())?;
/// scheduler.start();
/// let mut views = scheduler.subscribe();
/// while views.changed().await.is_ok() {
///     let view = views.borrow().clone();
///     println!("{} networks, loading={}", view.networks.len(), view.loading);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PollingScheduler {
    shared: Arc<Shared>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl PollingScheduler {
    /// Create an idle scheduler publishing [`ViewState::initial`].
    ///
    /// # Errors
    ///
    /// Returns any error from [`PollerConfig::validate`].
    pub fn new(
        backend: Arc<dyn AcquisitionPort>,
        config: PollerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (tx, _rx) = watch::channel(Arc::new(ViewState::initial()));

        Ok(Self {
            shared: Arc::new(Shared {
                normalizer: SnapshotNormalizer::new(config.max_history_length),
                backend,
                config,
                publisher: Mutex::new(Publisher {
                    open: true,
                    in_flight: None,
                    next_claim: 0,
                    tx,
                }),
            }),
            ticker: Mutex::new(None),
        })
    }

    /// Start the repeating timer. The first cycle begins immediately.
    ///
    /// Calling `start` again, or after shutdown, does nothing. Must be
    /// called from within a tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() || !self.shared.is_open() {
            return;
        }
        info!(
            backend = self.shared.backend.name(),
            poll_interval_ms = self.shared.config.poll_interval_ms,
            timeout_ms = self.shared.config.acquisition_timeout_ms,
            max_history = self.shared.config.max_history_length,
            "polling scheduler started"
        );
        *ticker = Some(tokio::spawn(tick_loop(Arc::clone(&self.shared))));
    }

    /// Request an immediate cycle.
    ///
    /// Raises `loading` on the published view straight away. If a cycle is
    /// already in flight no second acquisition is started and, since that
    /// cycle has already raised `loading`, nothing is republished. Must be
    /// called from within a tokio runtime.
    pub fn scan_now(&self) -> TriggerOutcome {
        match self.shared.try_claim() {
            Ok(claim) => {
                debug!("manual scan requested");
                tokio::spawn(execute(claim));
                TriggerOutcome::Started
            }
            Err(Refused::InFlight) => {
                debug!("manual scan ignored: acquisition already in flight");
                TriggerOutcome::AlreadyInFlight
            }
            Err(Refused::ShutDown) => TriggerOutcome::ShutDown,
        }
    }

    /// Run one cycle to completion on the calling task.
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.shared.try_claim() {
            Ok(claim) => execute(claim).await,
            Err(Refused::InFlight) => CycleOutcome::AlreadyInFlight,
            Err(Refused::ShutDown) => CycleOutcome::Suppressed,
        }
    }

    /// The most recently published view.
    pub fn snapshot(&self) -> Arc<ViewState> {
        self.shared.current()
    }

    /// A receiver that is notified on every publication.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewState>> {
        self.shared.publisher.lock().tx.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SchedulerPhase {
        let publisher = self.shared.publisher.lock();
        if !publisher.open {
            SchedulerPhase::ShutDown
        } else if publisher.in_flight.is_some() {
            SchedulerPhase::Fetching
        } else {
            SchedulerPhase::Idle
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &PollerConfig {
        &self.shared.config
    }

    /// Name of the backend being polled.
    pub fn backend_name(&self) -> &str {
        self.shared.backend.name()
    }

    /// Cancel the timer and stop publishing.
    ///
    /// An acquisition already in flight is left to finish, but its result is
    /// discarded. Idempotent.
    pub fn shutdown(&self) {
        let was_open = {
            let mut publisher = self.shared.publisher.lock();
            std::mem::replace(&mut publisher.open, false)
        };
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
        }
        if was_open {
            info!("polling scheduler shut down");
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("backend", &self.backend_name())
            .field("config", &self.shared.config)
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SimulatedBackend;
    use std::time::Duration;

    fn scheduler(config: PollerConfig) -> PollingScheduler {
        PollingScheduler::new(Arc::new(SimulatedBackend::new()), config).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let err = PollingScheduler::new(
            Arc::new(SimulatedBackend::new()),
            PollerConfig::default().with_poll_interval_ms(0),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Zero { .. }));
    }

    #[test]
    fn starts_idle_with_initial_view() {
        let s = scheduler(PollerConfig::default());
        assert_eq!(s.phase(), SchedulerPhase::Idle);
        assert_eq!(*s.snapshot(), ViewState::initial());
        assert_eq!(s.backend_name(), "simulated");
    }

    #[tokio::test]
    async fn run_cycle_publishes_success() {
        let s = scheduler(PollerConfig::default());
        let CycleOutcome::Succeeded(view) = s.run_cycle().await else {
            panic!("expected success");
        };
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.cycle, 1);
        assert_eq!(s.snapshot(), view);
        assert_eq!(s.phase(), SchedulerPhase::Idle);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_final() {
        let s = scheduler(PollerConfig::default());
        s.shutdown();
        s.shutdown();
        assert_eq!(s.phase(), SchedulerPhase::ShutDown);
        assert_eq!(s.scan_now(), TriggerOutcome::ShutDown);
        assert!(matches!(s.run_cycle().await, CycleOutcome::Suppressed));
        assert_eq!(*s.snapshot(), ViewState::initial());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_trigger_during_flight_is_noop() {
        let backend = SimulatedBackend::new().with_latency(Duration::from_secs(2));
        let s = PollingScheduler::new(Arc::new(backend), PollerConfig::default()).unwrap();

        assert_eq!(s.scan_now(), TriggerOutcome::Started);
        assert_eq!(s.phase(), SchedulerPhase::Fetching);
        assert_eq!(s.scan_now(), TriggerOutcome::AlreadyInFlight);
        assert!(matches!(s.run_cycle().await, CycleOutcome::AlreadyInFlight));

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(s.phase(), SchedulerPhase::Idle);
        assert_eq!(s.snapshot().cycle, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_trigger_does_not_wake_subscribers() {
        let backend = SimulatedBackend::new().with_latency(Duration::from_secs(2));
        let s = PollingScheduler::new(Arc::new(backend), PollerConfig::default()).unwrap();

        assert_eq!(s.scan_now(), TriggerOutcome::Started);
        tokio::task::yield_now().await;
        let mut views = s.subscribe();
        let before = s.snapshot();
        assert!(before.loading);

        assert_eq!(s.scan_now(), TriggerOutcome::AlreadyInFlight);
        assert!(!views.has_changed().unwrap());
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
    }
}
