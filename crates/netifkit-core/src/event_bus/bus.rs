//! Event service implementation.
//!
//! Provides the `EventService` struct: an ordered, filtered subscriber
//! registry with synchronous dispatch plus a broadcast channel for
//! consumers that want events on their own task.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{NetEvent, NetEventKind};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    Any,
    /// Receive only events of this kind.
    Kind(NetEventKind),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &NetEvent) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Kind(kind) => *kind == event.kind(),
        }
    }
}

/// A subscriber callback in one of the three accepted shapes.
///
/// All shapes are normalized to a single invocation form at dispatch
/// time; the shape only affects what the callback sees. Cloning an
/// `EventCallback` preserves its identity (the inner closure allocation),
/// which is what [`EventService::unsubscribe_callback`] matches on.
#[derive(Clone)]
pub enum EventCallback {
    /// A callback that takes no arguments.
    Simple(Arc<dyn Fn() + Send + Sync>),
    /// A callback that receives the typed event.
    Event(Arc<dyn Fn(&NetEvent) + Send + Sync>),
    /// A callback that receives the kind alongside the typed event,
    /// mirroring the raw `(id, payload)` vendor callback form.
    Raw(Arc<dyn Fn(NetEventKind, &NetEvent) + Send + Sync>),
}

impl EventCallback {
    /// Wrap a no-argument closure
    pub fn simple<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        EventCallback::Simple(Arc::new(f))
    }

    /// Wrap a typed-event closure
    pub fn event<F: Fn(&NetEvent) + Send + Sync + 'static>(f: F) -> Self {
        EventCallback::Event(Arc::new(f))
    }

    /// Wrap a kind-plus-event closure
    pub fn raw<F: Fn(NetEventKind, &NetEvent) + Send + Sync + 'static>(f: F) -> Self {
        EventCallback::Raw(Arc::new(f))
    }

    /// Invoke the callback for an event, whatever its shape
    fn invoke(&self, event: &NetEvent) {
        match self {
            EventCallback::Simple(f) => f(),
            EventCallback::Event(f) => f(event),
            EventCallback::Raw(f) => f(event.kind(), event),
        }
    }

    /// Pointer identity of the wrapped closure allocation.
    ///
    /// Two `EventCallback`s cloned from the same original compare equal;
    /// independently constructed callbacks never do.
    pub fn identity(&self) -> usize {
        match self {
            EventCallback::Simple(f) => Arc::as_ptr(f) as *const () as usize,
            EventCallback::Event(f) => Arc::as_ptr(f) as *const () as usize,
            EventCallback::Raw(f) => Arc::as_ptr(f) as *const () as usize,
        }
    }
}

impl std::fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self {
            EventCallback::Simple(_) => "Simple",
            EventCallback::Event(_) => "Event",
            EventCallback::Raw(_) => "Raw",
        };
        write!(f, "EventCallback::{}({:#x})", shape, self.identity())
    }
}

/// One registered subscription
#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    callback: EventCallback,
}

/// Configuration for the event service
#[derive(Debug, Clone)]
pub struct EventServiceConfig {
    /// Capacity of the broadcast channel for queued consumers.
    /// Lagging receivers lose oldest events.
    pub channel_capacity: usize,
}

impl Default for EventServiceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Filtered, ordered event distribution to subscriber callbacks.
///
/// Dispatch invokes subscribers synchronously, in subscription order, on
/// the dispatching thread. It is re-entrant-safe: a callback may itself
/// subscribe or unsubscribe without corrupting the in-progress iteration.
/// A subscriber removed before a dispatch call is never invoked by it.
pub struct EventService {
    /// Ordered subscriber list. Dispatch order is subscription order.
    subscriptions: Mutex<Vec<Subscription>>,
    /// Broadcast channel sender for queued consumers
    sender: broadcast::Sender<NetEvent>,
    /// Configuration
    config: EventServiceConfig,
}

impl EventService {
    /// Create a new event service with default configuration
    pub fn new() -> Self {
        Self::with_config(EventServiceConfig::default())
    }

    /// Create a new event service with custom configuration
    pub fn with_config(config: EventServiceConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);
        Self {
            subscriptions: Mutex::new(Vec::new()),
            sender,
            config,
        }
    }

    /// Subscribe to events matching a filter
    ///
    /// Always succeeds and returns a handle usable for removal. The
    /// callback runs on the dispatching thread, so it should return
    /// quickly to avoid blocking event delivery to later subscribers.
    pub fn subscribe(&self, filter: EventFilter, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscriptions.lock().push(Subscription {
            id,
            filter,
            callback,
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Unsubscribe by handle
    ///
    /// Returns true if the subscription was found and removed. Removing
    /// an unknown handle is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.lock();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        let removed = subs.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Unsubscribe by callback identity and filter
    ///
    /// Removes the first entry whose callback was cloned from the same
    /// closure and whose filter matches; supports callers who registered
    /// without keeping the handle. No-op if absent.
    pub fn unsubscribe_callback(&self, callback: &EventCallback, filter: EventFilter) -> bool {
        let identity = callback.identity();
        let mut subs = self.subscriptions.lock();
        if let Some(pos) = subs
            .iter()
            .position(|s| s.callback.identity() == identity && s.filter == filter)
        {
            let removed = subs.remove(pos);
            tracing::debug!("Subscription {} removed by callback identity", removed.id);
            true
        } else {
            false
        }
    }

    /// Dispatch an event to all matching subscribers, in subscription order
    ///
    /// The subscriber list is snapshotted up front, so callbacks may
    /// subscribe or unsubscribe from within dispatch; entries added during
    /// this dispatch are not invoked by it, and a snapshot entry whose id
    /// was removed mid-dispatch is skipped. Never fails: a subscriber's
    /// own errors are its responsibility and do not abort delivery to the
    /// rest.
    pub fn dispatch(&self, event: &NetEvent) {
        let snapshot: Vec<Subscription> = self.subscriptions.lock().clone();
        for sub in &snapshot {
            if !sub.filter.matches(event) {
                continue;
            }
            // Liveness check: skip entries unsubscribed by an earlier
            // callback in this same dispatch.
            let alive = self.subscriptions.lock().iter().any(|s| s.id == sub.id);
            if !alive {
                continue;
            }
            sub.callback.invoke(event);
        }

        // Feed queued consumers; a send error just means no receivers.
        let _ = self.sender.send(event.clone());
    }

    /// Get a broadcast receiver for queued event consumption
    ///
    /// Use this for work that must not run on the delivery context, such
    /// as anything that waits on status bits set by the same path.
    pub fn subscribe_channel(&self) -> broadcast::Receiver<NetEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Remove all subscriptions
    pub fn clear(&self) {
        self.subscriptions.lock().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventServiceConfig {
        &self.config
    }
}

impl Default for EventService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}
