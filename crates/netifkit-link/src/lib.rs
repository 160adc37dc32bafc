//! # NetifKit Link
//!
//! Interface lifecycle and driver plumbing for NetifKit: the lifecycle
//! manager over the shared radio driver, the raw-event translation
//! table and ingress pipeline, the bus-pin ownership registry, and the
//! PPP modem session coordinator with its serial DTE helpers.

pub mod driver;
pub mod ingress;
pub mod lifecycle;
pub mod modem;
pub mod pins;
pub mod translate;

pub use driver::{MockRadioDriver, RadioOp};
pub use ingress::{DisconnectInfo, Ingress};
pub use lifecycle::{IfacePhase, ManagerConfig, NetifManager};
pub use modem::{
    available_uarts, DceConfig, DteConfig, FlowControl, MockModemDriver, ModemConfig, ModemDriver,
    ModemModel, ModemOp, ModemPins, ModemSession, SessionMode, SessionPhase, UartInfo,
};
pub use pins::{OwnerId, PinRegistry};
pub use translate::translate;
