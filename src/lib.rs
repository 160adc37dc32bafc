//! # NetifKit
//!
//! A network-interface lifecycle and event-notification core:
//! - Typed network events translated from raw vendor driver callbacks
//! - An ordered subscriber registry with filtered and channel delivery
//! - Per-interface status bits with blocking waits
//! - Lifecycle management for station, access-point, Ethernet, and PPP
//!   interfaces over one shared radio driver
//! - PPP modem session coordination with bus-pin ownership and rollback
//!
//! ## Architecture
//!
//! NetifKit is organized as a workspace with multiple crates:
//!
//! 1. **netifkit-core** - Types, events, status bits, errors, driver traits
//! 2. **netifkit-link** - Lifecycle manager, event translation, modem sessions
//! 3. **netifkit** - Facade crate re-exporting the public surface
//!
//! The vendor radio and modem drivers are external collaborators behind
//! the [`RadioDriver`] and [`ModemDriver`] seams; mock implementations
//! are provided for testing and host-side development.

pub use netifkit_core::{
    reason_name, DriverConfig, DriverResult, DriverStatus, Error, EventCallback, EventFilter,
    EventService, EventServiceConfig, InterfaceKind, InterfaceSet, LifecycleError, NetEvent,
    NetEventKind, RadioDriver, RawEventSink, RawSource, Result, SessionError, StatusBits,
    StatusFlags, SubscriptionId,
};

pub use netifkit_link::{
    available_uarts, translate, DceConfig, DisconnectInfo, DteConfig, FlowControl, IfacePhase,
    Ingress, ManagerConfig, MockModemDriver, MockRadioDriver, ModemConfig, ModemDriver,
    ModemModel, ModemOp, ModemPins, ModemSession, NetifManager, OwnerId, PinRegistry, RadioOp,
    SessionMode, SessionPhase, UartInfo,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
