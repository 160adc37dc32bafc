//! Interface lifecycle management.
//!
//! `NetifManager` owns the per-interface mode state machines and the
//! shared driver they all depend on. It guarantees the driver is
//! initialized before any interface is enabled and torn down only after
//! the last one is disabled, sequences every transition step with
//! rollback on failure, and emits lifecycle events into the shared
//! event service.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use netifkit_core::driver::{DriverConfig, RadioDriver};
use netifkit_core::error::{LifecycleError, Result};
use netifkit_core::event_bus::{EventService, NetEvent};
use netifkit_core::status::{StatusBits, StatusFlags};
use netifkit_core::types::{InterfaceKind, InterfaceSet};

use crate::ingress::{DisconnectInfo, Ingress};

/// Per-interface transition phase.
///
/// `Enabling` and `Disabling` are only ever observable from within a
/// transition; every public operation returns with the interface in
/// `Disabled` or `Enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfacePhase {
    /// Not running.
    Disabled,
    /// Enable transition in progress.
    Enabling,
    /// Running.
    Enabled,
    /// Disable transition in progress.
    Disabling,
}

/// Manager configuration.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Passed through to the driver at init; the core owns no
    /// persisted state.
    pub persistent: bool,
    /// Hostname applied to station/ethernet netifs during enable.
    pub hostname: Option<String>,
    /// Enable the long-range protocol option on shared-radio
    /// interfaces as they come up.
    pub long_range: bool,
    /// Surface long-range revert failures to the caller instead of
    /// only logging them. Enabling long-range is always strict.
    pub strict_protocol_revert: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            hostname: None,
            long_range: false,
            strict_protocol_revert: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InterfaceState {
    phase: IfacePhase,
    started: bool,
    long_range_active: bool,
}

impl InterfaceState {
    fn new() -> Self {
        Self {
            phase: IfacePhase::Disabled,
            started: false,
            long_range_active: false,
        }
    }
}

/// Shared-driver state, per manager. No ambient statics: tests
/// construct isolated managers.
#[derive(Debug, Clone, Copy)]
struct GlobalDriverState {
    initialized: bool,
    sink_installed: bool,
    radio_started: bool,
    active_interfaces: usize,
}

struct ManagerState {
    global: GlobalDriverState,
    ifaces: [InterfaceState; 4],
}

/// The interface lifecycle manager.
///
/// All transitions serialize on one async mutex, the process-wide
/// critical section for the shared driver; concurrent enables of the
/// station and access point therefore cannot double-initialize it.
/// There is no cancellation of an in-flight transition: callers wait
/// for resolution and then issue the inverse operation.
pub struct NetifManager {
    driver: Arc<dyn RadioDriver>,
    config: Mutex<ManagerConfig>,
    /// Transition critical section. Held across driver awaits.
    transition: tokio::sync::Mutex<()>,
    state: Mutex<ManagerState>,
    ingress: Arc<Ingress>,
}

impl NetifManager {
    /// Create a manager with its own status bits and event service
    pub fn new(driver: Arc<dyn RadioDriver>) -> Self {
        Self::with_config(driver, ManagerConfig::default())
    }

    /// Create a manager with custom configuration
    pub fn with_config(driver: Arc<dyn RadioDriver>, config: ManagerConfig) -> Self {
        let status = Arc::new(StatusBits::new());
        let events = Arc::new(EventService::new());
        Self::with_parts(driver, config, status, events)
    }

    /// Create a manager over externally owned status bits and event
    /// service, for callers that share them with other components
    /// (e.g. a modem session on the same event stream).
    pub fn with_parts(
        driver: Arc<dyn RadioDriver>,
        config: ManagerConfig,
        status: Arc<StatusBits>,
        events: Arc<EventService>,
    ) -> Self {
        Self {
            driver,
            config: Mutex::new(config),
            transition: tokio::sync::Mutex::new(()),
            state: Mutex::new(ManagerState {
                global: GlobalDriverState {
                    initialized: false,
                    sink_installed: false,
                    radio_started: false,
                    active_interfaces: 0,
                },
                ifaces: [InterfaceState::new(); 4],
            }),
            ingress: Arc::new(Ingress::new(status, events)),
        }
    }

    /// The event service lifecycle events are published into
    pub fn events(&self) -> &Arc<EventService> {
        &self.ingress.events
    }

    /// The per-interface status bits
    pub fn status(&self) -> &Arc<StatusBits> {
        &self.ingress.status
    }

    /// The most recent station disconnect diagnostic, if any
    pub fn last_disconnect(&self) -> Option<DisconnectInfo> {
        self.ingress.last_disconnect()
    }

    /// Whether an interface is currently enabled
    pub fn is_enabled(&self, kind: InterfaceKind) -> bool {
        self.state.lock().ifaces[kind.index()].phase == IfacePhase::Enabled
    }

    /// The set of currently enabled interfaces
    pub fn enabled_set(&self) -> InterfaceSet {
        let state = self.state.lock();
        let mut set = InterfaceSet::NONE;
        for kind in InterfaceKind::ALL {
            if state.ifaces[kind.index()].phase == IfacePhase::Enabled {
                set.insert(kind);
            }
        }
        set
    }

    /// Number of interfaces currently enabled
    pub fn active_interfaces(&self) -> usize {
        self.state.lock().global.active_interfaces
    }

    /// Whether the shared driver is initialized.
    ///
    /// May remain true with zero active interfaces after a tolerated
    /// teardown failure; the next enable detects this and skips re-init.
    pub fn driver_initialized(&self) -> bool {
        self.state.lock().global.initialized
    }

    /// Set the hostname applied to station/ethernet netifs on their
    /// next enable
    pub fn set_hostname(&self, name: impl Into<String>) {
        self.config.lock().hostname = Some(name.into());
    }

    /// Enable or disable the long-range protocol option for future
    /// enable transitions
    pub fn set_long_range(&self, on: bool) {
        self.config.lock().long_range = on;
    }

    /// Enable an interface.
    ///
    /// Idempotent: enabling an already-enabled interface returns Ok
    /// without any driver call. On any driver failure the transition is
    /// rolled back, the interface is left `Disabled`, and the vendor
    /// status code is returned to the caller.
    pub async fn enable(&self, kind: InterfaceKind) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.enable_locked(kind).await
    }

    /// Disable an interface.
    ///
    /// Idempotent when already disabled. When the last interface goes
    /// down the shared driver is stopped and deinitialized; a teardown
    /// failure is tolerated (the interface is still disabled, and the
    /// driver's initialized flag stays set so the next enable skips
    /// re-init).
    pub async fn disable(&self, kind: InterfaceKind) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.disable_locked(kind, false).await
    }

    /// Apply a target interface set: disable the extras, then enable
    /// the missing, leaving intersecting interfaces untouched.
    ///
    /// A non-empty set throughout never tears the shared driver down.
    pub async fn set_mode(&self, target: InterfaceSet) -> Result<()> {
        let _guard = self.transition.lock().await;
        let current = self.enabled_set();
        // The shared driver must survive a swap to a disjoint set:
        // disabling the last extra before the first enable runs would
        // otherwise empty the active count and trigger teardown.
        let keep_driver = !target.is_empty();
        for kind in current.iter() {
            if !target.contains(kind) {
                self.disable_locked(kind, keep_driver).await?;
            }
        }
        for kind in target.iter() {
            if !self.is_enabled(kind) {
                self.enable_locked(kind).await?;
            }
        }
        Ok(())
    }

    /// Block until the interface reports connected, or fail with a
    /// timeout error.
    ///
    /// Must not be called from a subscriber callback on the event
    /// delivery context.
    pub fn wait_connected(&self, kind: InterfaceKind, timeout: Duration) -> Result<()> {
        let mask = if kind == InterfaceKind::AccessPoint {
            StatusFlags::AP_CONNECTED
        } else {
            StatusFlags::CONNECTED
        };
        if self.ingress.status.wait_bits(kind, mask, timeout) {
            Ok(())
        } else {
            Err(LifecycleError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
            .into())
        }
    }

    /// Deliver a raw vendor event through the ingress pipeline.
    ///
    /// Drivers installed via the event sink do this automatically; this
    /// entry point exists for event sources that bypass the shared
    /// driver.
    pub fn deliver_raw(&self, source: netifkit_core::types::RawSource, code: i32, payload: &[u8]) {
        self.ingress.deliver(source, code, payload);
    }

    fn phase(&self, kind: InterfaceKind) -> IfacePhase {
        self.state.lock().ifaces[kind.index()].phase
    }

    fn set_phase(&self, kind: InterfaceKind, phase: IfacePhase) {
        self.state.lock().ifaces[kind.index()].phase = phase;
    }

    async fn enable_locked(&self, kind: InterfaceKind) -> Result<()> {
        if self.phase(kind) == IfacePhase::Enabled {
            return Ok(());
        }
        let config = self.config.lock().clone();

        // Shared driver init, checked and set under the transition lock
        if !self.state.lock().global.initialized {
            self.driver
                .init(&DriverConfig {
                    persistent: config.persistent,
                })
                .await
                .map_err(|status| LifecycleError::Driver { status })?;
            self.state.lock().global.initialized = true;
            tracing::debug!("Shared driver initialized");
        }
        // The sink is tracked apart from initialization: a tolerated
        // teardown failure leaves the driver initialized but sinkless,
        // and the next enable must still restore raw event delivery.
        if !self.state.lock().global.sink_installed {
            self.driver.set_event_sink(self.ingress.sink());
            self.state.lock().global.sink_installed = true;
        }

        self.set_phase(kind, IfacePhase::Enabling);
        let old_set = self.enabled_set();

        if let Err(status) = self.driver.create_netif(kind).await {
            self.set_phase(kind, IfacePhase::Disabled);
            tracing::error!("Failed to create {} netif: {}", kind, status);
            return Err(LifecycleError::Driver { status }.into());
        }

        // Hostname is applied before the mode change brings the
        // interface up; a failure here is logged, not fatal.
        if matches!(kind, InterfaceKind::Station | InterfaceKind::Ethernet) {
            if let Some(name) = &config.hostname {
                if let Err(status) = self.driver.set_hostname(kind, name).await {
                    tracing::warn!("Failed to set hostname on {}: {}", kind, status);
                }
            }
        }

        let new_set = old_set | kind.into();
        if let Err(status) = self.driver.set_mode(new_set).await {
            self.rollback_enable(kind, old_set, false).await;
            tracing::error!("Failed to set mode {}: {}", new_set, status);
            return Err(LifecycleError::Driver { status }.into());
        }

        // Long-range is applied after the mode set and before radio
        // start. The enable direction is strict.
        let mut long_range_applied = false;
        if config.long_range && kind.uses_shared_radio() {
            if let Err(status) = self.driver.set_long_range(kind, true).await {
                self.rollback_enable(kind, old_set, false).await;
                tracing::error!("Failed to enable long-range on {}: {}", kind, status);
                return Err(LifecycleError::Driver { status }.into());
            }
            long_range_applied = true;
        }

        if !self.state.lock().global.radio_started {
            if let Err(status) = self.driver.start().await {
                self.rollback_enable(kind, old_set, long_range_applied).await;
                tracing::error!("Failed to start radio: {}", status);
                return Err(LifecycleError::Driver { status }.into());
            }
            self.state.lock().global.radio_started = true;
        }

        {
            let mut state = self.state.lock();
            let iface = &mut state.ifaces[kind.index()];
            iface.phase = IfacePhase::Enabled;
            iface.started = true;
            iface.long_range_active = long_range_applied;
            state.global.active_interfaces += 1;
        }
        tracing::debug!("Interface {} enabled", kind);
        self.ingress.emit(&started_event(kind));
        Ok(())
    }

    /// Undo partial enable work, best-effort, and return the interface
    /// to `Disabled`.
    async fn rollback_enable(&self, kind: InterfaceKind, old_set: InterfaceSet, long_range: bool) {
        if long_range {
            if let Err(status) = self.driver.set_long_range(kind, false).await {
                tracing::warn!("Rollback: failed to revert long-range on {}: {}", kind, status);
            }
        }
        if let Err(status) = self.driver.set_mode(old_set).await {
            tracing::warn!("Rollback: failed to restore mode {}: {}", old_set, status);
        }
        if let Err(status) = self.driver.destroy_netif(kind).await {
            tracing::warn!("Rollback: failed to destroy {} netif: {}", kind, status);
        }
        self.set_phase(kind, IfacePhase::Disabled);
    }

    async fn disable_locked(&self, kind: InterfaceKind, keep_driver: bool) -> Result<()> {
        if self.phase(kind) != IfacePhase::Enabled {
            return Ok(());
        }
        let config = self.config.lock().clone();
        self.set_phase(kind, IfacePhase::Disabling);

        // Revert the long-range protocol option, best-effort unless
        // strict revert is configured.
        let long_range_active = self.state.lock().ifaces[kind.index()].long_range_active;
        if long_range_active {
            if let Err(status) = self.driver.set_long_range(kind, false).await {
                if config.strict_protocol_revert {
                    self.set_phase(kind, IfacePhase::Enabled);
                    return Err(LifecycleError::Driver { status }.into());
                }
                tracing::warn!("Failed to revert long-range on {}: {}", kind, status);
            }
            self.state.lock().ifaces[kind.index()].long_range_active = false;
        }

        // The set of interfaces remaining after this one goes down.
        // This interface is already in Disabling, so enabled_set()
        // excludes it.
        let remaining = self.enabled_set();
        if !remaining.is_empty() {
            if let Err(status) = self.driver.set_mode(remaining).await {
                self.set_phase(kind, IfacePhase::Enabled);
                tracing::error!("Failed to set mode {}: {}", remaining, status);
                return Err(LifecycleError::Driver { status }.into());
            }
        }

        if let Err(status) = self.driver.destroy_netif(kind).await {
            tracing::warn!("Failed to destroy {} netif: {}", kind, status);
        }

        {
            let mut state = self.state.lock();
            let iface = &mut state.ifaces[kind.index()];
            iface.phase = IfacePhase::Disabled;
            iface.started = false;
            state.global.active_interfaces -= 1;
        }
        tracing::debug!("Interface {} disabled", kind);
        self.ingress.emit(&stopped_event(kind));

        if !keep_driver && self.state.lock().global.active_interfaces == 0 {
            self.teardown_shared_driver().await;
        }
        Ok(())
    }

    /// Stop and deinitialize the shared driver after the last interface
    /// went down. Failures are tolerated: the interface is already
    /// disabled, and on a failed deinit the initialized flag stays set
    /// so the next enable skips re-init.
    async fn teardown_shared_driver(&self) {
        if let Err(status) = self.driver.stop().await {
            tracing::warn!("Failed to stop radio: {}", status);
        }
        self.state.lock().global.radio_started = false;
        self.driver.clear_event_sink();
        self.state.lock().global.sink_installed = false;
        match self.driver.deinit().await {
            Ok(()) => {
                self.state.lock().global.initialized = false;
                tracing::debug!("Shared driver deinitialized");
            }
            Err(status) => {
                tracing::warn!(
                    "Shared driver teardown failed ({}); leaving initialized set",
                    status
                );
            }
        }
    }
}

impl std::fmt::Debug for NetifManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("NetifManager")
            .field("initialized", &state.global.initialized)
            .field("active_interfaces", &state.global.active_interfaces)
            .finish()
    }
}

fn started_event(kind: InterfaceKind) -> NetEvent {
    match kind {
        InterfaceKind::Station => NetEvent::StationStarted,
        InterfaceKind::AccessPoint => NetEvent::ApStarted,
        InterfaceKind::Ppp => NetEvent::PppStarted,
        InterfaceKind::Ethernet => NetEvent::EthStarted,
    }
}

fn stopped_event(kind: InterfaceKind) -> NetEvent {
    match kind {
        InterfaceKind::Station => NetEvent::StationStopped,
        InterfaceKind::AccessPoint => NetEvent::ApStopped,
        InterfaceKind::Ppp => NetEvent::PppStopped,
        InterfaceKind::Ethernet => NetEvent::EthStopped,
    }
}
