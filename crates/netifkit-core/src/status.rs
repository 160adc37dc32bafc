//! Per-interface status bits with blocking waits.
//!
//! `StatusBits` keeps one `StatusFlags` word per interface kind for
//! coarse state querying, orthogonal to the typed event stream. Only the
//! lifecycle manager and the translator-driven ingress path mutate the
//! bits; everything else reads or waits.

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::types::InterfaceKind;

/// A bitmask of coarse interface state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusFlags(pub u32);

impl StatusFlags {
    /// No flags set.
    pub const NONE: StatusFlags = StatusFlags(0);
    /// The interface has started.
    pub const STARTED: StatusFlags = StatusFlags(1 << 0);
    /// The interface is connected (associated / link negotiated).
    pub const CONNECTED: StatusFlags = StatusFlags(1 << 1);
    /// The interface holds an IPv4 address.
    pub const HAS_IP: StatusFlags = StatusFlags(1 << 2);
    /// The interface holds an IPv6 address.
    pub const HAS_IP6: StatusFlags = StatusFlags(1 << 3);
    /// A scan is in progress on the interface.
    pub const SCANNING: StatusFlags = StatusFlags(1 << 4);
    /// The soft-AP half of the radio has started.
    pub const AP_STARTED: StatusFlags = StatusFlags(1 << 5);
    /// The soft-AP is up and accepting clients.
    pub const AP_CONNECTED: StatusFlags = StatusFlags(1 << 6);
    /// At least one client was seen on the soft-AP (tracks the most
    /// recent join/leave event, not a refcount).
    pub const AP_HAS_CLIENT: StatusFlags = StatusFlags(1 << 7);

    /// True if every bit in `mask` is set in `self`
    pub fn contains(&self, mask: StatusFlags) -> bool {
        self.0 & mask.0 == mask.0
    }

    /// True if no bits are set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for StatusFlags {
    type Output = StatusFlags;

    fn bitor(self, rhs: StatusFlags) -> StatusFlags {
        StatusFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StatusFlags {
    fn bitor_assign(&mut self, rhs: StatusFlags) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for StatusFlags {
    type Output = StatusFlags;

    fn bitand(self, rhs: StatusFlags) -> StatusFlags {
        StatusFlags(self.0 & rhs.0)
    }
}

impl std::ops::Not for StatusFlags {
    type Output = StatusFlags;

    fn not(self) -> StatusFlags {
        StatusFlags(!self.0)
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(StatusFlags, &str); 8] = [
            (StatusFlags::STARTED, "started"),
            (StatusFlags::CONNECTED, "connected"),
            (StatusFlags::HAS_IP, "has_ip"),
            (StatusFlags::HAS_IP6, "has_ip6"),
            (StatusFlags::SCANNING, "scanning"),
            (StatusFlags::AP_STARTED, "ap_started"),
            (StatusFlags::AP_CONNECTED, "ap_connected"),
            (StatusFlags::AP_HAS_CLIENT, "ap_has_client"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

/// Thread-safe per-interface status words with blocking waits.
///
/// Waiters block on a condvar, holding no lock while blocked; every
/// mutation wakes all waiters so each can re-check its own mask.
pub struct StatusBits {
    words: Mutex<[StatusFlags; 4]>,
    changed: Condvar,
}

impl StatusBits {
    /// Create a new store with all bits clear
    pub fn new() -> Self {
        Self {
            words: Mutex::new([StatusFlags::NONE; 4]),
            changed: Condvar::new(),
        }
    }

    /// Set bits for an interface, waking any waiters
    pub fn set_bits(&self, interface: InterfaceKind, mask: StatusFlags) {
        let mut words = self.words.lock();
        words[interface.index()] |= mask;
        self.changed.notify_all();
    }

    /// Clear bits for an interface, waking any waiters
    pub fn clear_bits(&self, interface: InterfaceKind, mask: StatusFlags) {
        let mut words = self.words.lock();
        words[interface.index()] = words[interface.index()] & !mask;
        self.changed.notify_all();
    }

    /// Get the current bits for an interface
    pub fn get_bits(&self, interface: InterfaceKind) -> StatusFlags {
        self.words.lock()[interface.index()]
    }

    /// Block until every bit in `mask` is set for `interface`, or until
    /// the timeout elapses.
    ///
    /// Returns whether the condition was met. Safe to call from a
    /// different thread than the mutating one; tolerates spurious
    /// wakeups. Must not be called from a subscriber callback on the
    /// event delivery context if the bits are set by that same context,
    /// as that would deadlock.
    pub fn wait_bits(&self, interface: InterfaceKind, mask: StatusFlags, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut words = self.words.lock();
        loop {
            if words[interface.index()].contains(mask) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if self.changed.wait_for(&mut words, deadline - now).timed_out() {
                return words[interface.index()].contains(mask);
            }
        }
    }

    /// True if the interface is connected
    pub fn is_connected(&self, interface: InterfaceKind) -> bool {
        self.get_bits(interface).contains(StatusFlags::CONNECTED)
    }

    /// True if the interface holds an IPv4 address
    pub fn has_ip(&self, interface: InterfaceKind) -> bool {
        self.get_bits(interface).contains(StatusFlags::HAS_IP)
    }

    /// Clear every bit on every interface
    pub fn reset(&self) {
        let mut words = self.words.lock();
        *words = [StatusFlags::NONE; 4];
        self.changed.notify_all();
    }
}

impl Default for StatusBits {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatusBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.words.lock();
        let mut s = f.debug_struct("StatusBits");
        for kind in InterfaceKind::ALL {
            s.field(kind.as_str(), &words[kind.index()].to_string());
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_flags_ops() {
        let flags = StatusFlags::STARTED | StatusFlags::CONNECTED;
        assert!(flags.contains(StatusFlags::STARTED));
        assert!(flags.contains(StatusFlags::STARTED | StatusFlags::CONNECTED));
        assert!(!flags.contains(StatusFlags::HAS_IP));

        let cleared = flags & !StatusFlags::CONNECTED;
        assert!(!cleared.contains(StatusFlags::CONNECTED));
        assert!(cleared.contains(StatusFlags::STARTED));
    }

    #[test]
    fn test_flags_display() {
        let flags = StatusFlags::STARTED | StatusFlags::HAS_IP;
        assert_eq!(flags.to_string(), "started|has_ip");
        assert_eq!(StatusFlags::NONE.to_string(), "none");
    }

    #[test]
    fn test_set_clear_get() {
        let bits = StatusBits::new();
        bits.set_bits(InterfaceKind::Station, StatusFlags::STARTED);
        bits.set_bits(InterfaceKind::Station, StatusFlags::CONNECTED);
        assert!(bits
            .get_bits(InterfaceKind::Station)
            .contains(StatusFlags::STARTED | StatusFlags::CONNECTED));

        // Other interfaces are untouched
        assert!(bits.get_bits(InterfaceKind::Ppp).is_empty());

        bits.clear_bits(InterfaceKind::Station, StatusFlags::CONNECTED);
        assert!(!bits.is_connected(InterfaceKind::Station));
        assert!(bits
            .get_bits(InterfaceKind::Station)
            .contains(StatusFlags::STARTED));
    }

    #[test]
    fn test_wait_bits_already_set() {
        let bits = StatusBits::new();
        bits.set_bits(InterfaceKind::Station, StatusFlags::CONNECTED);
        assert!(bits.wait_bits(
            InterfaceKind::Station,
            StatusFlags::CONNECTED,
            Duration::from_millis(0)
        ));
    }

    #[test]
    fn test_wait_bits_timeout() {
        let bits = StatusBits::new();
        let start = Instant::now();
        let met = bits.wait_bits(
            InterfaceKind::Station,
            StatusFlags::CONNECTED,
            Duration::from_millis(10),
        );
        assert!(!met);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_wait_bits_cross_thread() {
        let bits = Arc::new(StatusBits::new());
        let setter = bits.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set_bits(InterfaceKind::Ppp, StatusFlags::CONNECTED);
            thread::sleep(Duration::from_millis(20));
            setter.set_bits(InterfaceKind::Ppp, StatusFlags::HAS_IP);
        });

        let met = bits.wait_bits(
            InterfaceKind::Ppp,
            StatusFlags::CONNECTED | StatusFlags::HAS_IP,
            Duration::from_secs(5),
        );
        assert!(met);
        handle.join().unwrap();
    }

    #[test]
    fn test_reset() {
        let bits = StatusBits::new();
        bits.set_bits(InterfaceKind::Station, StatusFlags::STARTED);
        bits.set_bits(InterfaceKind::Ethernet, StatusFlags::STARTED);
        bits.reset();
        for kind in InterfaceKind::ALL {
            assert!(bits.get_bits(kind).is_empty());
        }
    }
}
