//! The driving port for one network acquisition.

use async_trait::async_trait;

use crate::domain::record::RawNetworkEntry;
use crate::error::AcquisitionResult;

/// Port that abstracts the scanning backend.
///
/// Implementations include:
/// - [`crate::adapter::HttpScanBackend`] -- JSON over HTTP.
/// - [`crate::adapter::SimulatedBackend`] -- synthetic networks.
///
/// The scheduler bounds every call with its own timeout, so implementations
/// need not enforce one, though they may.
#[async_trait]
pub trait AcquisitionPort: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Perform one acquisition and return the currently visible networks in
    /// backend order.
    async fn acquire(&self) -> AcquisitionResult<Vec<RawNetworkEntry>>;
}
