//! # Event Bus Module
//!
//! Provides the typed event stream at the center of the crate: the
//! closed `NetEvent` set and the `EventService` that fans events out to
//! subscribers.
//!
//! ## Overview
//!
//! - Publishers (the lifecycle manager and event translator path) emit
//!   typed events without knowing subscribers
//! - Subscribers filter by event kind and receive events synchronously on
//!   the dispatching thread, or queued on their own task via a broadcast
//!   receiver
//! - Callbacks come in three shapes (no-arg, typed-event, kind-plus-event),
//!   normalized internally to one dispatch form
//!
//! ## Usage
//!
//! ```rust,ignore
//! use netifkit_core::event_bus::{EventCallback, EventFilter, EventService, NetEventKind};
//!
//! let service = EventService::new();
//!
//! // Subscribe to station connect events
//! let subscription = service.subscribe(
//!     EventFilter::Kind(NetEventKind::StationConnected),
//!     EventCallback::event(|event| {
//!         println!("{}", event.describe());
//!     }),
//! );
//!
//! // Unsubscribe when done
//! service.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
