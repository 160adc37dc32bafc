//! PPP modem session coordination.
//!
//! `ModemSession` is the PPP-specific specialization of the lifecycle
//! machinery: it sequences bus-pin acquisition, DTE/DCE construction,
//! and PIN/flow-control negotiation as one ordered startup protocol
//! with full rollback on any step failure. The serial helpers cover
//! host-side UART enumeration and opening for integrations that drive
//! a real modem.

mod driver;
mod mock;
mod serial;
mod session;

pub use driver::{DceConfig, ModemDriver, ModemModel, ModemPins};
pub use mock::{MockModemDriver, ModemOp};
pub use serial::{available_uarts, DteConfig, FlowControl, UartInfo};
pub use session::{ModemConfig, ModemSession, SessionMode, SessionPhase};
