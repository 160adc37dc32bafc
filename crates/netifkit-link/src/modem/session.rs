//! The PPP modem session coordinator.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use netifkit_core::error::{Error, Result, SessionError};
use netifkit_core::event_bus::NetEvent;
use netifkit_core::types::{DriverStatus, RawEventSink};

use crate::ingress::Ingress;
use crate::pins::{OwnerId, PinRegistry};
use crate::translate::translate;

use super::driver::{DceConfig, ModemDriver, ModemModel, ModemPins};
use super::serial::{DteConfig, FlowControl};

/// Where a session is in its startup protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No resources held.
    Idle,
    /// Bus pins acquired, driver not yet attached.
    PinsAcquired,
    /// DTE/DCE constructed and bound, in command mode.
    DriverAttached,
    /// Data mode entered, PPP negotiation in progress.
    Negotiating,
    /// PPP negotiated an address, the link is usable.
    Active,
    /// A startup step failed and everything was rolled back.
    Failed,
}

/// Which half of the modem's dual personality is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// AT command mode.
    Command,
    /// PPP data mode.
    Data,
}

/// Configuration for a modem session.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Modem model.
    pub model: ModemModel,
    /// Bus pins the session will own while active.
    pub pins: ModemPins,
    /// Access point name. Must be set before `begin`.
    pub apn: Option<String>,
    /// SIM PIN, used only when the SIM reports an unlock is needed.
    pub pin: Option<String>,
    /// UART device path for the DTE side.
    pub uart_device: String,
    /// UART baud rate.
    pub baud: u32,
    /// UART flow-control setting.
    pub flow_control: FlowControl,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            model: ModemModel::Generic,
            pins: ModemPins {
                tx: 17,
                rx: 18,
                rts: None,
                cts: None,
            },
            apn: None,
            pin: None,
            uart_device: "/dev/ttyUSB0".to_string(),
            baud: 115_200,
            flow_control: FlowControl::None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    mode: SessionMode,
}

/// Coordinates one PPP modem session over a vendor modem driver.
///
/// `begin` runs the startup protocol as an ordered sequence with full
/// rollback on any step failure; `end` is the idempotent inverse. The
/// session owns its bus pins exclusively between the two, arbitrated
/// through the shared [`PinRegistry`].
pub struct ModemSession {
    driver: Arc<dyn ModemDriver>,
    pins: Arc<PinRegistry>,
    ingress: Arc<Ingress>,
    config: Mutex<ModemConfig>,
    state: Arc<Mutex<SessionState>>,
    connected_since: Arc<Mutex<Option<DateTime<Utc>>>>,
    owner: OwnerId,
    // Serializes begin/end/connect/disconnect, held across awaits.
    transition: tokio::sync::Mutex<()>,
}

fn driver_err(status: DriverStatus) -> Error {
    SessionError::Driver { status }.into()
}

impl ModemSession {
    /// Create a session with default configuration
    pub fn new(
        driver: Arc<dyn ModemDriver>,
        pins: Arc<PinRegistry>,
        ingress: Arc<Ingress>,
    ) -> Self {
        Self::with_config(driver, pins, ingress, ModemConfig::default())
    }

    /// Create a session with the given configuration
    pub fn with_config(
        driver: Arc<dyn ModemDriver>,
        pins: Arc<PinRegistry>,
        ingress: Arc<Ingress>,
        config: ModemConfig,
    ) -> Self {
        Self {
            driver,
            pins,
            ingress,
            config: Mutex::new(config),
            state: Arc::new(Mutex::new(SessionState {
                phase: SessionPhase::Idle,
                mode: SessionMode::Command,
            })),
            connected_since: Arc::new(Mutex::new(None)),
            owner: OwnerId::new(),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    /// Current session phase
    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase
    }

    /// Current session mode
    pub fn mode(&self) -> SessionMode {
        self.state.lock().mode
    }

    /// When the PPP link last became active, if it is active
    pub fn connected_since(&self) -> Option<DateTime<Utc>> {
        *self.connected_since.lock()
    }

    /// The pins this session currently owns
    pub fn owned_pins(&self) -> Vec<u8> {
        self.pins.owned_by(self.owner)
    }

    /// Set the access point name. Valid only while idle.
    pub fn set_apn(&self, apn: impl Into<String>) -> Result<()> {
        self.ensure_idle("set_apn")?;
        let apn = apn.into();
        if apn.is_empty() {
            return Err(SessionError::Configuration {
                reason: "APN must not be empty".to_string(),
            }
            .into());
        }
        self.config.lock().apn = Some(apn);
        Ok(())
    }

    /// Set the SIM PIN. Valid only while idle; the PIN must be 4-8
    /// ASCII digits.
    pub fn set_pin(&self, pin: impl Into<String>) -> Result<()> {
        self.ensure_idle("set_pin")?;
        let pin = pin.into();
        if pin.len() < 4 || pin.len() > 8 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(SessionError::Configuration {
                reason: format!("PIN must be 4-8 ASCII digits, got {:?}", pin),
            }
            .into());
        }
        self.config.lock().pin = Some(pin);
        Ok(())
    }

    /// Run the session startup protocol.
    ///
    /// Validates the APN, acquires the bus pins, registers the event
    /// source, creates the network interface, attaches the DTE/DCE
    /// pair, and unlocks the SIM when it asks for a PIN. Any failure
    /// after partial pin acquisition rolls every completed step back
    /// before returning; no partial state is left outstanding. On
    /// success the session is `DriverAttached` in command mode.
    pub async fn begin(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        if self.state.lock().phase != SessionPhase::Idle {
            return Err(SessionError::Configuration {
                reason: "session already started".to_string(),
            }
            .into());
        }

        let config = self.config.lock().clone();
        let apn = match &config.apn {
            Some(apn) => apn.clone(),
            None => {
                return Err(SessionError::Configuration {
                    reason: "APN not set".to_string(),
                }
                .into());
            }
        };

        info!("Starting modem session ({:?}, APN {})", config.model, apn);

        // Pins first: nothing below runs unless the session owns the bus.
        for pin in config.pins.list() {
            if let Err(e) = self.pins.acquire(pin, self.owner) {
                self.pins.release_all(self.owner);
                self.state.lock().phase = SessionPhase::Failed;
                return Err(e.into());
            }
        }
        self.state.lock().phase = SessionPhase::PinsAcquired;

        if let Err(status) = self.driver.register_event_source(self.sink()).await {
            self.rollback(false, false, false).await;
            return Err(driver_err(status));
        }

        if let Err(status) = self.driver.create_netif().await {
            self.rollback(false, false, true).await;
            return Err(driver_err(status));
        }

        let dte = DteConfig {
            device: config.uart_device.clone(),
            baud: config.baud,
            data_bits: 8,
            stop_bits: 1,
            flow_control: config.flow_control,
        };
        let dce = DceConfig {
            model: config.model,
            apn,
        };
        if let Err(status) = self.driver.attach(&dte, &dce).await {
            self.rollback(false, true, true).await;
            return Err(driver_err(status));
        }

        match self.driver.pin_needed().await {
            Ok(true) => {
                let pin = match &config.pin {
                    Some(pin) => pin.clone(),
                    None => {
                        self.rollback(true, true, true).await;
                        return Err(SessionError::Configuration {
                            reason: "SIM requires a PIN but none is configured".to_string(),
                        }
                        .into());
                    }
                };
                if let Err(status) = self.driver.unlock_pin(&pin).await {
                    self.rollback(true, true, true).await;
                    return Err(driver_err(status));
                }
            }
            Ok(false) => {}
            Err(status) => {
                self.rollback(true, true, true).await;
                return Err(driver_err(status));
            }
        }

        {
            let mut state = self.state.lock();
            state.phase = SessionPhase::DriverAttached;
            state.mode = SessionMode::Command;
        }
        self.ingress.emit(&NetEvent::PppStarted);
        Ok(())
    }

    /// Tear the session down in inverse order.
    ///
    /// Idempotent: `end` on an idle session is a no-op. Teardown
    /// failures are logged and tolerated so the pins always come back.
    pub async fn end(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        let (phase, mode) = {
            let state = self.state.lock();
            (state.phase, state.mode)
        };
        if phase == SessionPhase::Idle {
            return Ok(());
        }

        let attached = matches!(
            phase,
            SessionPhase::DriverAttached | SessionPhase::Negotiating | SessionPhase::Active
        );
        if attached {
            if mode == SessionMode::Data {
                if let Err(status) = self.driver.set_command_mode().await {
                    warn!("Failed to leave data mode on teardown: {}", status);
                }
            }
            if let Err(status) = self.driver.detach().await {
                warn!("Failed to detach modem: {}", status);
            }
            if let Err(status) = self.driver.destroy_netif().await {
                warn!("Failed to destroy PPP netif: {}", status);
            }
            if let Err(status) = self.driver.unregister_event_source().await {
                warn!("Failed to unregister modem event source: {}", status);
            }
        }

        let freed = self.pins.release_all(self.owner);
        debug!("Modem session released {} pin(s)", freed);

        {
            let mut state = self.state.lock();
            state.phase = SessionPhase::Idle;
            state.mode = SessionMode::Command;
        }
        *self.connected_since.lock() = None;
        if attached {
            self.ingress.emit(&NetEvent::PppStopped);
        }
        Ok(())
    }

    /// Switch the DCE into data mode and start PPP negotiation.
    ///
    /// The session becomes `Negotiating`; `Active` is reached when the
    /// PPP got-IP event arrives from the driver.
    pub async fn connect(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        match self.state.lock().phase {
            SessionPhase::DriverAttached => {}
            SessionPhase::Negotiating | SessionPhase::Active => return Ok(()),
            _ => {
                return Err(SessionError::Configuration {
                    reason: "session not started".to_string(),
                }
                .into());
            }
        }

        self.driver.set_data_mode().await.map_err(driver_err)?;
        let mut state = self.state.lock();
        state.phase = SessionPhase::Negotiating;
        state.mode = SessionMode::Data;
        Ok(())
    }

    /// Switch the DCE back into command mode, ending the data link.
    pub async fn disconnect(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        match self.state.lock().phase {
            SessionPhase::Negotiating | SessionPhase::Active => {}
            SessionPhase::DriverAttached => return Ok(()),
            _ => {
                return Err(SessionError::Configuration {
                    reason: "session not started".to_string(),
                }
                .into());
            }
        }

        self.driver.set_command_mode().await.map_err(driver_err)?;
        let mut state = self.state.lock();
        state.phase = SessionPhase::DriverAttached;
        state.mode = SessionMode::Command;
        *self.connected_since.lock() = None;
        Ok(())
    }

    /// Signal quality as `(rssi, ber)`. Command mode only.
    pub async fn signal_quality(&self) -> Result<(i32, i32)> {
        self.ensure_command_mode()?;
        self.driver.signal_quality().await.map_err(driver_err)
    }

    /// International mobile subscriber identity. Command mode only.
    pub async fn imsi(&self) -> Result<String> {
        self.ensure_command_mode()?;
        self.driver.imsi().await.map_err(driver_err)
    }

    /// International mobile equipment identity. Command mode only.
    pub async fn imei(&self) -> Result<String> {
        self.ensure_command_mode()?;
        self.driver.imei().await.map_err(driver_err)
    }

    /// Module name reported by the modem. Command mode only.
    pub async fn module_name(&self) -> Result<String> {
        self.ensure_command_mode()?;
        self.driver.module_name().await.map_err(driver_err)
    }

    /// Registered operator name. Command mode only.
    pub async fn operator_name(&self) -> Result<String> {
        self.ensure_command_mode()?;
        self.driver.operator_name().await.map_err(driver_err)
    }

    /// Whether the SIM requires a PIN unlock. Command mode only.
    pub async fn pin_needed(&self) -> Result<bool> {
        self.ensure_command_mode()?;
        self.driver.pin_needed().await.map_err(driver_err)
    }

    /// Unlock the SIM with a PIN. Command mode only.
    pub async fn unlock_pin(&self, pin: &str) -> Result<()> {
        self.ensure_command_mode()?;
        self.driver.unlock_pin(pin).await.map_err(driver_err)
    }

    /// Power the modem down. Command mode only.
    pub async fn power_down(&self) -> Result<()> {
        self.ensure_command_mode()?;
        self.driver.power_down().await.map_err(driver_err)
    }

    /// Reset the modem. Command mode only.
    pub async fn reset(&self) -> Result<()> {
        self.ensure_command_mode()?;
        self.driver.reset().await.map_err(driver_err)
    }

    /// Raw-event sink this session installs on its driver: translate,
    /// advance the negotiation phase on PPP got-IP, then run the shared
    /// ingress apply/dispatch path.
    fn sink(&self) -> RawEventSink {
        let state = self.state.clone();
        let connected_since = self.connected_since.clone();
        let ingress = self.ingress.clone();
        Arc::new(move |source, code, payload| {
            match translate(source, code, payload) {
                Some(event) => {
                    if matches!(event, NetEvent::PppGotIpv4 { .. }) {
                        let mut state = state.lock();
                        if state.phase == SessionPhase::Negotiating {
                            state.phase = SessionPhase::Active;
                            *connected_since.lock() = Some(Utc::now());
                            info!("PPP link active");
                        }
                    }
                    ingress.emit(&event);
                }
                None => {
                    debug!("Dropped unhandled modem event ({}, {})", source, code);
                }
            }
        })
    }

    fn ensure_idle(&self, what: &str) -> Result<()> {
        let phase = self.state.lock().phase;
        if phase != SessionPhase::Idle {
            return Err(SessionError::Configuration {
                reason: format!("{} is only valid while the session is idle", what),
            }
            .into());
        }
        Ok(())
    }

    /// Guard for command-mode operations: the driver must be attached
    /// and the session must not be in data mode.
    fn ensure_command_mode(&self) -> Result<()> {
        let state = self.state.lock();
        match state.phase {
            SessionPhase::Idle | SessionPhase::PinsAcquired | SessionPhase::Failed => {
                Err(SessionError::Configuration {
                    reason: "session not started".to_string(),
                }
                .into())
            }
            SessionPhase::Negotiating | SessionPhase::Active => Err(SessionError::WrongMode {
                current: "data".to_string(),
                required: "command".to_string(),
            }
            .into()),
            SessionPhase::DriverAttached => Ok(()),
        }
    }

    /// Undo the completed startup steps in reverse order, best effort,
    /// then release every pin and mark the session failed.
    async fn rollback(&self, attached: bool, netif: bool, event_source: bool) {
        warn!("Modem session startup failed, rolling back");
        if attached {
            if let Err(status) = self.driver.detach().await {
                warn!("Rollback: detach failed: {}", status);
            }
        }
        if netif {
            if let Err(status) = self.driver.destroy_netif().await {
                warn!("Rollback: destroy_netif failed: {}", status);
            }
        }
        if event_source {
            if let Err(status) = self.driver.unregister_event_source().await {
                warn!("Rollback: unregister_event_source failed: {}", status);
            }
        }
        self.pins.release_all(self.owner);
        self.state.lock().phase = SessionPhase::Failed;
    }
}
