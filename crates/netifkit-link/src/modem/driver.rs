//! The modem driver seam.
//!
//! `ModemDriver` is the trait a vendor modem SDK implements; the session
//! coordinator drives it in a fixed order and never issues a
//! command-mode operation while the link is in data mode. As with the
//! radio seam, failures carry the vendor status code verbatim.

use async_trait::async_trait;

use netifkit_core::driver::DriverResult;
use netifkit_core::types::RawEventSink;

use super::serial::DteConfig;

/// Supported modem models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ModemModel {
    /// Generic AT-command modem.
    Generic,
    /// SIMCom SIM800 series.
    Sim800,
    /// SIMCom SIM7000 series.
    Sim7000,
    /// SIMCom SIM7070 series.
    Sim7070,
    /// SIMCom SIM7600 series.
    Sim7600,
    /// Quectel BG96.
    Bg96,
}

/// The bus pins a modem session owns while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemPins {
    /// Host TX pin.
    pub tx: u8,
    /// Host RX pin.
    pub rx: u8,
    /// RTS pin, when hardware flow control is wired.
    pub rts: Option<u8>,
    /// CTS pin, when hardware flow control is wired.
    pub cts: Option<u8>,
}

impl ModemPins {
    /// The pins present in this configuration, in acquisition order
    pub fn list(&self) -> Vec<u8> {
        let mut pins = vec![self.tx, self.rx];
        if let Some(rts) = self.rts {
            pins.push(rts);
        }
        if let Some(cts) = self.cts {
            pins.push(cts);
        }
        pins
    }
}

/// DCE-side configuration: the modem itself.
#[derive(Debug, Clone)]
pub struct DceConfig {
    /// Modem model.
    pub model: ModemModel,
    /// Access point name for the data bearer.
    pub apn: String,
}

/// The vendor modem driver behind a PPP session.
///
/// The session coordinator guarantees ordering: `register_event_source`
/// before `attach`, `detach` before `unregister_event_source`, and no
/// command operation while in data mode.
#[async_trait]
pub trait ModemDriver: Send + Sync {
    /// Register the raw-event callback for the modem's event source.
    async fn register_event_source(&self, sink: RawEventSink) -> DriverResult;

    /// Unregister the raw-event callback.
    async fn unregister_event_source(&self) -> DriverResult;

    /// Create the PPP network-interface object.
    async fn create_netif(&self) -> DriverResult;

    /// Destroy the PPP network-interface object.
    async fn destroy_netif(&self) -> DriverResult;

    /// Construct the DTE and DCE halves and bind them together.
    async fn attach(&self, dte: &DteConfig, dce: &DceConfig) -> DriverResult;

    /// Tear the DTE/DCE halves down and free the device handle.
    async fn detach(&self) -> DriverResult;

    /// Switch the DCE into data (PPP) mode.
    async fn set_data_mode(&self) -> DriverResult;

    /// Switch the DCE back into command mode.
    async fn set_command_mode(&self) -> DriverResult;

    /// Whether the SIM requires a PIN unlock.
    async fn pin_needed(&self) -> DriverResult<bool>;

    /// Unlock the SIM with a PIN.
    async fn unlock_pin(&self, pin: &str) -> DriverResult;

    /// Signal quality as `(rssi, ber)`.
    async fn signal_quality(&self) -> DriverResult<(i32, i32)>;

    /// International mobile subscriber identity.
    async fn imsi(&self) -> DriverResult<String>;

    /// International mobile equipment identity.
    async fn imei(&self) -> DriverResult<String>;

    /// Module name reported by the modem.
    async fn module_name(&self) -> DriverResult<String>;

    /// Currently registered operator name.
    async fn operator_name(&self) -> DriverResult<String>;

    /// Power the modem down.
    async fn power_down(&self) -> DriverResult;

    /// Reset the modem.
    async fn reset(&self) -> DriverResult;
}
