//! Mock modem driver for testing.
//!
//! Mirrors the radio mock: call counters, per-operation failure
//! injection, and a captured event sink for delivering raw PPP events.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use netifkit_core::driver::DriverResult;
use netifkit_core::types::{DriverStatus, RawEventSink, RawSource};

use super::driver::{DceConfig, ModemDriver};
use super::serial::DteConfig;

/// One fallible modem driver operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModemOp {
    /// `ModemDriver::register_event_source`
    RegisterEventSource,
    /// `ModemDriver::unregister_event_source`
    UnregisterEventSource,
    /// `ModemDriver::create_netif`
    CreateNetif,
    /// `ModemDriver::destroy_netif`
    DestroyNetif,
    /// `ModemDriver::attach`
    Attach,
    /// `ModemDriver::detach`
    Detach,
    /// `ModemDriver::set_data_mode`
    SetDataMode,
    /// `ModemDriver::set_command_mode`
    SetCommandMode,
    /// `ModemDriver::pin_needed`
    PinNeeded,
    /// `ModemDriver::unlock_pin`
    UnlockPin,
    /// `ModemDriver::signal_quality`
    SignalQuality,
    /// `ModemDriver::imsi`
    Imsi,
    /// `ModemDriver::imei`
    Imei,
    /// `ModemDriver::module_name`
    ModuleName,
    /// `ModemDriver::operator_name`
    OperatorName,
    /// `ModemDriver::power_down`
    PowerDown,
    /// `ModemDriver::reset`
    Reset,
}

#[derive(Default)]
struct MockState {
    calls: HashMap<ModemOp, usize>,
    failures: HashMap<ModemOp, DriverStatus>,
    one_shot_failures: HashMap<ModemOp, DriverStatus>,
    pin_needed: bool,
    unlocked_with: Option<String>,
    attached: bool,
    last_apn: Option<String>,
}

/// Mock modem driver with call counters and failure injection.
pub struct MockModemDriver {
    state: Mutex<MockState>,
    sink: Mutex<Option<RawEventSink>>,
}

impl MockModemDriver {
    /// Create a mock that succeeds on every call, SIM unlocked
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            sink: Mutex::new(None),
        }
    }

    /// Make an operation fail with `status` on every call
    pub fn fail_on(&self, op: ModemOp, status: DriverStatus) {
        self.state.lock().failures.insert(op, status);
    }

    /// Make an operation fail with `status` exactly once
    pub fn fail_once(&self, op: ModemOp, status: DriverStatus) {
        self.state.lock().one_shot_failures.insert(op, status);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.one_shot_failures.clear();
    }

    /// Make the SIM report that a PIN unlock is required
    pub fn set_pin_needed(&self, needed: bool) {
        self.state.lock().pin_needed = needed;
    }

    /// Calls recorded for one operation
    pub fn calls(&self, op: ModemOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// The PIN the session unlocked with, if any
    pub fn unlocked_with(&self) -> Option<String> {
        self.state.lock().unlocked_with.clone()
    }

    /// The APN from the most recent attach
    pub fn last_apn(&self) -> Option<String> {
        self.state.lock().last_apn.clone()
    }

    /// Whether the DTE/DCE pair is currently attached
    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    /// Whether an event sink is currently registered
    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Deliver a raw event through the registered sink
    pub fn deliver(&self, source: RawSource, code: i32, payload: &[u8]) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(source, code, payload);
        }
    }

    fn check(&self, op: ModemOp) -> DriverResult {
        let mut state = self.state.lock();
        *state.calls.entry(op).or_insert(0) += 1;
        if let Some(status) = state.one_shot_failures.remove(&op) {
            return Err(status);
        }
        if let Some(status) = state.failures.get(&op) {
            return Err(*status);
        }
        Ok(())
    }
}

impl Default for MockModemDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModemDriver for MockModemDriver {
    async fn register_event_source(&self, sink: RawEventSink) -> DriverResult {
        self.check(ModemOp::RegisterEventSource)?;
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    async fn unregister_event_source(&self) -> DriverResult {
        self.check(ModemOp::UnregisterEventSource)?;
        *self.sink.lock() = None;
        Ok(())
    }

    async fn create_netif(&self) -> DriverResult {
        self.check(ModemOp::CreateNetif)
    }

    async fn destroy_netif(&self) -> DriverResult {
        self.check(ModemOp::DestroyNetif)
    }

    async fn attach(&self, _dte: &DteConfig, dce: &DceConfig) -> DriverResult {
        self.check(ModemOp::Attach)?;
        let mut state = self.state.lock();
        state.attached = true;
        state.last_apn = Some(dce.apn.clone());
        Ok(())
    }

    async fn detach(&self) -> DriverResult {
        self.check(ModemOp::Detach)?;
        self.state.lock().attached = false;
        Ok(())
    }

    async fn set_data_mode(&self) -> DriverResult {
        self.check(ModemOp::SetDataMode)
    }

    async fn set_command_mode(&self) -> DriverResult {
        self.check(ModemOp::SetCommandMode)
    }

    async fn pin_needed(&self) -> DriverResult<bool> {
        self.check(ModemOp::PinNeeded)?;
        Ok(self.state.lock().pin_needed)
    }

    async fn unlock_pin(&self, pin: &str) -> DriverResult {
        self.check(ModemOp::UnlockPin)?;
        let mut state = self.state.lock();
        state.unlocked_with = Some(pin.to_string());
        state.pin_needed = false;
        Ok(())
    }

    async fn signal_quality(&self) -> DriverResult<(i32, i32)> {
        self.check(ModemOp::SignalQuality)?;
        Ok((-67, 0))
    }

    async fn imsi(&self) -> DriverResult<String> {
        self.check(ModemOp::Imsi)?;
        Ok("001010123456789".to_string())
    }

    async fn imei(&self) -> DriverResult<String> {
        self.check(ModemOp::Imei)?;
        Ok("490154203237518".to_string())
    }

    async fn module_name(&self) -> DriverResult<String> {
        self.check(ModemOp::ModuleName)?;
        Ok("MOCK-MODEM".to_string())
    }

    async fn operator_name(&self) -> DriverResult<String> {
        self.check(ModemOp::OperatorName)?;
        Ok("Test Operator".to_string())
    }

    async fn power_down(&self) -> DriverResult {
        self.check(ModemOp::PowerDown)
    }

    async fn reset(&self) -> DriverResult {
        self.check(ModemOp::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_injection_and_counters() {
        let driver = MockModemDriver::new();
        driver.fail_once(ModemOp::Attach, DriverStatus(0x7001));

        let dte = DteConfig::default();
        let dce = DceConfig {
            model: super::super::driver::ModemModel::Generic,
            apn: "internet".to_string(),
        };
        assert_eq!(driver.attach(&dte, &dce).await, Err(DriverStatus(0x7001)));
        driver.attach(&dte, &dce).await.unwrap();
        assert_eq!(driver.calls(ModemOp::Attach), 2);
        assert_eq!(driver.last_apn().as_deref(), Some("internet"));
    }

    #[tokio::test]
    async fn test_pin_state() {
        let driver = MockModemDriver::new();
        assert!(!driver.pin_needed().await.unwrap());

        driver.set_pin_needed(true);
        assert!(driver.pin_needed().await.unwrap());

        driver.unlock_pin("1234").await.unwrap();
        assert!(!driver.pin_needed().await.unwrap());
        assert_eq!(driver.unlocked_with().as_deref(), Some("1234"));
    }
}
