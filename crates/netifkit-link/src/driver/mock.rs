//! Mock radio driver for testing.
//!
//! Counts every call, supports per-operation failure injection, and
//! captures the installed event sink so tests can deliver raw events as
//! the vendor SDK would.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use netifkit_core::driver::{DriverConfig, DriverResult, RadioDriver};
use netifkit_core::types::{DriverStatus, InterfaceKind, InterfaceSet, RawEventSink, RawSource};

/// One fallible radio driver operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioOp {
    /// `RadioDriver::init`
    Init,
    /// `RadioDriver::deinit`
    Deinit,
    /// `RadioDriver::create_netif`
    CreateNetif,
    /// `RadioDriver::destroy_netif`
    DestroyNetif,
    /// `RadioDriver::set_hostname`
    SetHostname,
    /// `RadioDriver::set_mode`
    SetMode,
    /// `RadioDriver::set_long_range`
    SetLongRange,
    /// `RadioDriver::start`
    Start,
    /// `RadioDriver::stop`
    Stop,
}

/// Per-operation call counters.
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    counts: HashMap<RadioOp, usize>,
}

impl CallCounts {
    fn bump(&mut self, op: RadioOp) {
        *self.counts.entry(op).or_insert(0) += 1;
    }

    /// Calls recorded for one operation
    pub fn get(&self, op: RadioOp) -> usize {
        self.counts.get(&op).copied().unwrap_or(0)
    }
}

#[derive(Default)]
struct MockState {
    calls: CallCounts,
    /// Operations that fail every time until cleared
    failures: HashMap<RadioOp, DriverStatus>,
    /// Operations that fail exactly once
    one_shot_failures: HashMap<RadioOp, DriverStatus>,
    last_mode: Option<InterfaceSet>,
    hostnames: HashMap<InterfaceKind, String>,
    long_range: HashMap<InterfaceKind, bool>,
    netifs: Vec<InterfaceKind>,
    initialized: bool,
    started: bool,
    persistent: Option<bool>,
}

/// Mock radio driver with call counters and failure injection.
pub struct MockRadioDriver {
    state: Mutex<MockState>,
    sink: Mutex<Option<RawEventSink>>,
}

impl MockRadioDriver {
    /// Create a mock that succeeds on every call
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            sink: Mutex::new(None),
        }
    }

    /// Make an operation fail with `status` on every call until
    /// [`clear_failures`](Self::clear_failures)
    pub fn fail_on(&self, op: RadioOp, status: DriverStatus) {
        self.state.lock().failures.insert(op, status);
    }

    /// Make an operation fail with `status` exactly once
    pub fn fail_once(&self, op: RadioOp, status: DriverStatus) {
        self.state.lock().one_shot_failures.insert(op, status);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.one_shot_failures.clear();
    }

    /// Calls recorded for one operation
    pub fn calls(&self, op: RadioOp) -> usize {
        self.state.lock().calls.get(op)
    }

    /// The most recent mode passed to `set_mode`
    pub fn last_mode(&self) -> Option<InterfaceSet> {
        self.state.lock().last_mode
    }

    /// The hostname applied to a kind, if any
    pub fn hostname(&self, kind: InterfaceKind) -> Option<String> {
        self.state.lock().hostnames.get(&kind).cloned()
    }

    /// The last long-range setting applied to a kind, if any
    pub fn long_range(&self, kind: InterfaceKind) -> Option<bool> {
        self.state.lock().long_range.get(&kind).copied()
    }

    /// Netifs currently in existence
    pub fn netifs(&self) -> Vec<InterfaceKind> {
        self.state.lock().netifs.clone()
    }

    /// Whether the driver believes it is initialized
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// The `persistent` flag received at init, if init ran
    pub fn persistent(&self) -> Option<bool> {
        self.state.lock().persistent
    }

    /// Whether an event sink is currently installed
    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Deliver a raw event through the installed sink, as the vendor
    /// SDK would from its own context. No-op when no sink is installed.
    pub fn deliver(&self, source: RawSource, code: i32, payload: &[u8]) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(source, code, payload);
        }
    }

    fn check(&self, op: RadioOp) -> DriverResult {
        let mut state = self.state.lock();
        state.calls.bump(op);
        if let Some(status) = state.one_shot_failures.remove(&op) {
            return Err(status);
        }
        if let Some(status) = state.failures.get(&op) {
            return Err(*status);
        }
        Ok(())
    }
}

impl Default for MockRadioDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RadioDriver for MockRadioDriver {
    async fn init(&self, config: &DriverConfig) -> DriverResult {
        self.check(RadioOp::Init)?;
        let mut state = self.state.lock();
        state.initialized = true;
        state.persistent = Some(config.persistent);
        Ok(())
    }

    async fn deinit(&self) -> DriverResult {
        self.check(RadioOp::Deinit)?;
        self.state.lock().initialized = false;
        Ok(())
    }

    fn set_event_sink(&self, sink: RawEventSink) {
        *self.sink.lock() = Some(sink);
    }

    fn clear_event_sink(&self) {
        *self.sink.lock() = None;
    }

    async fn create_netif(&self, kind: InterfaceKind) -> DriverResult {
        self.check(RadioOp::CreateNetif)?;
        self.state.lock().netifs.push(kind);
        Ok(())
    }

    async fn destroy_netif(&self, kind: InterfaceKind) -> DriverResult {
        self.check(RadioOp::DestroyNetif)?;
        self.state.lock().netifs.retain(|k| *k != kind);
        Ok(())
    }

    async fn set_hostname(&self, kind: InterfaceKind, hostname: &str) -> DriverResult {
        self.check(RadioOp::SetHostname)?;
        self.state.lock().hostnames.insert(kind, hostname.to_string());
        Ok(())
    }

    async fn set_mode(&self, set: InterfaceSet) -> DriverResult {
        self.check(RadioOp::SetMode)?;
        self.state.lock().last_mode = Some(set);
        Ok(())
    }

    async fn set_long_range(&self, kind: InterfaceKind, enabled: bool) -> DriverResult {
        self.check(RadioOp::SetLongRange)?;
        self.state.lock().long_range.insert(kind, enabled);
        Ok(())
    }

    async fn start(&self) -> DriverResult {
        self.check(RadioOp::Start)?;
        self.state.lock().started = true;
        Ok(())
    }

    async fn stop(&self) -> DriverResult {
        self.check(RadioOp::Stop)?;
        self.state.lock().started = false;
        Ok(())
    }
}
