//! # NetifKit Core
//!
//! Core types, events, and driver traits for NetifKit.
//! Provides the typed event stream, the subscriber registry, per-interface
//! status bits, error types, and the radio driver seam the lifecycle
//! manager in `netifkit-link` drives.

pub mod driver;
pub mod error;
pub mod event_bus;
pub mod status;
pub mod types;

pub use driver::{DriverConfig, DriverResult, RadioDriver};

pub use error::{Error, LifecycleError, Result, SessionError};

pub use event_bus::{
    reason_name, EventCallback, EventFilter, EventService, EventServiceConfig, NetEvent,
    NetEventKind, SubscriptionId,
};

pub use status::{StatusBits, StatusFlags};

// Re-export type aliases for convenience
pub use types::{
    thread_safe, thread_safe_rw, DriverStatus, InterfaceKind, InterfaceSet, RawEventSink,
    RawSource, ThreadSafe, ThreadSafeRw,
};
