//! The synchronous ingress pipeline.
//!
//! Raw driver events run translate → apply → dispatch on the driver's
//! own delivery context. `apply` is the status-bit mutation step shared
//! by the Wi-Fi/Ethernet lifecycle path and the modem session path; it
//! runs before subscribers see the event, so a subscriber reading the
//! status bits observes the post-event state.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use netifkit_core::event_bus::{reason_name, EventService, NetEvent};
use netifkit_core::status::{StatusBits, StatusFlags};
use netifkit_core::types::{InterfaceKind, RawEventSink, RawSource};

use crate::translate::translate;

/// Diagnostic record of the most recent station disconnect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectInfo {
    /// Vendor disconnect reason code.
    pub reason: u8,
    /// Human-readable reason name.
    pub reason_name: String,
    /// When the disconnect was observed.
    pub at: DateTime<Utc>,
}

/// Shared ingress-side state: status bits, event egress, and the
/// last-disconnect diagnostic.
pub struct Ingress {
    /// Per-interface status bits, mutated only here and by the
    /// lifecycle manager.
    pub status: Arc<StatusBits>,
    /// Event egress to subscribers.
    pub events: Arc<EventService>,
    last_disconnect: Mutex<Option<DisconnectInfo>>,
}

impl Ingress {
    /// Create an ingress pipeline over a status store and event service
    pub fn new(status: Arc<StatusBits>, events: Arc<EventService>) -> Self {
        Self {
            status,
            events,
            last_disconnect: Mutex::new(None),
        }
    }

    /// Build the raw-event sink to install on a driver.
    ///
    /// The sink translates, applies status bits, and dispatches, all
    /// synchronously on the delivering context. Unknown events are
    /// dropped here without a trace at any level above debug.
    pub fn sink(self: &Arc<Self>) -> RawEventSink {
        let ingress = self.clone();
        Arc::new(move |source: RawSource, code: i32, payload: &[u8]| {
            ingress.deliver(source, code, payload);
        })
    }

    /// Run one raw event through the full pipeline
    pub fn deliver(&self, source: RawSource, code: i32, payload: &[u8]) {
        match translate(source, code, payload) {
            Some(event) => {
                tracing::debug!("Event: {}", event.describe());
                self.emit(&event);
            }
            None => {
                tracing::debug!("Dropped unhandled raw event ({}, {})", source, code);
            }
        }
    }

    /// Apply an already-typed event's status bits and dispatch it.
    ///
    /// Used by the lifecycle manager and modem session for the events
    /// they synthesize themselves, so the status-bit rules stay in one
    /// place.
    pub fn emit(&self, event: &NetEvent) {
        self.apply(event);
        self.events.dispatch(event);
    }

    /// The most recent station disconnect, if any
    pub fn last_disconnect(&self) -> Option<DisconnectInfo> {
        self.last_disconnect.lock().clone()
    }

    /// Apply an event's status-bit mutations
    fn apply(&self, event: &NetEvent) {
        use InterfaceKind::*;
        match event {
            NetEvent::StationStarted => {
                self.status.set_bits(Station, StatusFlags::STARTED);
            }
            NetEvent::StationStopped => {
                self.status.clear_bits(
                    Station,
                    StatusFlags::STARTED
                        | StatusFlags::CONNECTED
                        | StatusFlags::HAS_IP
                        | StatusFlags::HAS_IP6
                        | StatusFlags::SCANNING,
                );
            }
            NetEvent::StationConnected { .. } => {
                self.status.set_bits(Station, StatusFlags::CONNECTED);
            }
            NetEvent::StationDisconnected { reason, .. } => {
                self.status
                    .clear_bits(Station, StatusFlags::CONNECTED | StatusFlags::HAS_IP);
                let name = reason_name(*reason);
                tracing::warn!("STA disconnected: reason {} ({})", reason, name);
                *self.last_disconnect.lock() = Some(DisconnectInfo {
                    reason: *reason,
                    reason_name: name.to_string(),
                    at: Utc::now(),
                });
            }
            NetEvent::GotIpv4 { .. } => {
                self.status.set_bits(Station, StatusFlags::HAS_IP);
            }
            NetEvent::GotIpv6 { .. } => {
                self.status.set_bits(Station, StatusFlags::HAS_IP6);
            }
            NetEvent::LostIp => {
                self.status.clear_bits(Station, StatusFlags::HAS_IP);
            }
            NetEvent::ScanDone { .. } => {
                self.status.clear_bits(Station, StatusFlags::SCANNING);
            }
            NetEvent::ApStarted => {
                self.status
                    .set_bits(AccessPoint, StatusFlags::AP_STARTED | StatusFlags::AP_CONNECTED);
            }
            NetEvent::ApStopped => {
                self.status.clear_bits(
                    AccessPoint,
                    StatusFlags::AP_STARTED
                        | StatusFlags::AP_CONNECTED
                        | StatusFlags::AP_HAS_CLIENT,
                );
            }
            NetEvent::ApStationJoined { .. } => {
                self.status.set_bits(AccessPoint, StatusFlags::AP_HAS_CLIENT);
            }
            NetEvent::ApStationLeft { .. } => {
                self.status
                    .clear_bits(AccessPoint, StatusFlags::AP_HAS_CLIENT);
            }
            NetEvent::EthStarted => {
                self.status.set_bits(Ethernet, StatusFlags::STARTED);
            }
            NetEvent::EthStopped => {
                self.status.clear_bits(
                    Ethernet,
                    StatusFlags::STARTED
                        | StatusFlags::CONNECTED
                        | StatusFlags::HAS_IP
                        | StatusFlags::HAS_IP6,
                );
            }
            NetEvent::EthConnected => {
                self.status.set_bits(Ethernet, StatusFlags::CONNECTED);
            }
            NetEvent::EthDisconnected => {
                self.status
                    .clear_bits(Ethernet, StatusFlags::CONNECTED | StatusFlags::HAS_IP);
            }
            NetEvent::EthGotIpv4 { .. } => {
                self.status.set_bits(Ethernet, StatusFlags::HAS_IP);
            }
            NetEvent::EthGotIpv6 { .. } => {
                self.status.set_bits(Ethernet, StatusFlags::HAS_IP6);
            }
            NetEvent::EthLostIp => {
                self.status.clear_bits(Ethernet, StatusFlags::HAS_IP);
            }
            NetEvent::PppStarted => {
                self.status.set_bits(Ppp, StatusFlags::STARTED);
            }
            NetEvent::PppStopped => {
                self.status.clear_bits(
                    Ppp,
                    StatusFlags::STARTED | StatusFlags::CONNECTED | StatusFlags::HAS_IP,
                );
            }
            NetEvent::PppConnected => {
                self.status.set_bits(Ppp, StatusFlags::CONNECTED);
            }
            NetEvent::PppDisconnected => {
                self.status
                    .clear_bits(Ppp, StatusFlags::CONNECTED | StatusFlags::HAS_IP);
            }
            NetEvent::PppGotIpv4 { .. } => {
                self.status.set_bits(Ppp, StatusFlags::HAS_IP);
            }
            NetEvent::PppLostIp => {
                self.status.clear_bits(Ppp, StatusFlags::HAS_IP);
            }
            NetEvent::ModemError { status } => {
                tracing::warn!("Modem error: {}", status);
            }
            // Provisioning and smart-config events carry no status bits.
            _ => {}
        }
    }
}
