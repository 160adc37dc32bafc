//! The radio driver seam.
//!
//! `RadioDriver` is the trait the interface lifecycle manager drives;
//! real implementations wrap a vendor SDK, and tests use mock
//! implementations. Every fallible call returns the vendor status code
//! verbatim on failure so callers can report it for diagnostics.

use async_trait::async_trait;

use crate::types::{DriverStatus, InterfaceKind, InterfaceSet, RawEventSink};

/// Result of a driver call: `Err` carries the vendor status code.
pub type DriverResult<T = ()> = std::result::Result<T, DriverStatus>;

/// Configuration handed to the driver at init time.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Whether the driver should persist settings (e.g. credentials) to
    /// its own non-volatile storage. Passed through unchanged; the core
    /// owns no persisted state.
    pub persistent: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { persistent: true }
    }
}

/// The shared radio/network driver behind all interface kinds of one
/// technology.
///
/// The lifecycle manager guarantees call ordering: `init` before any
/// other call, `create_netif` before `set_mode` includes that kind,
/// `deinit` only after every interface is disabled. Implementations do
/// not need to defend against out-of-order calls.
#[async_trait]
pub trait RadioDriver: Send + Sync {
    /// Initialize the shared driver. Called once, before any interface
    /// is enabled.
    async fn init(&self, config: &DriverConfig) -> DriverResult;

    /// Tear down the shared driver. Called after the last interface is
    /// disabled. May fail; the caller tolerates that by keeping its
    /// initialized flag set.
    async fn deinit(&self) -> DriverResult;

    /// Install the one raw-event callback for this driver's sources.
    ///
    /// The payload slice handed to the sink is only valid for the
    /// duration of the callback.
    fn set_event_sink(&self, sink: RawEventSink);

    /// Remove the raw-event callback.
    fn clear_event_sink(&self);

    /// Create the network-interface object for one kind.
    async fn create_netif(&self, kind: InterfaceKind) -> DriverResult;

    /// Destroy the network-interface object for one kind.
    async fn destroy_netif(&self, kind: InterfaceKind) -> DriverResult;

    /// Apply a hostname to an interface's netif. Applied before the
    /// mode change that brings the interface up.
    async fn set_hostname(&self, kind: InterfaceKind, hostname: &str) -> DriverResult;

    /// Set the combined operating mode for all enabled interfaces.
    async fn set_mode(&self, set: InterfaceSet) -> DriverResult;

    /// Enable or disable the long-range protocol option on one
    /// interface. Applied after the mode set, before radio start.
    async fn set_long_range(&self, kind: InterfaceKind, enabled: bool) -> DriverResult;

    /// Start radio operation for the current mode.
    async fn start(&self) -> DriverResult;

    /// Stop radio operation.
    async fn stop(&self) -> DriverResult;
}
