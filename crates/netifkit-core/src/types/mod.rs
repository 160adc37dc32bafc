//! Shared identifier types for interfaces, drivers, and raw event sources.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<T>>`, event sinks, callbacks, etc.

pub mod aliases;

pub use aliases::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical network role hosted on the device.
///
/// One shared radio driver backs both `Station` and `AccessPoint`;
/// `Ppp` and `Ethernet` have their own underlying devices but share the
/// same lifecycle and status machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Wi-Fi client (STA).
    Station,
    /// Wi-Fi access point (soft-AP).
    AccessPoint,
    /// Point-to-point link over a cellular modem.
    Ppp,
    /// Wired Ethernet.
    Ethernet,
}

impl InterfaceKind {
    /// All interface kinds, in lifecycle ordering (station before AP,
    /// links last).
    pub const ALL: [InterfaceKind; 4] = [
        InterfaceKind::Station,
        InterfaceKind::AccessPoint,
        InterfaceKind::Ppp,
        InterfaceKind::Ethernet,
    ];

    /// Stable per-kind index for slot arrays.
    pub fn index(&self) -> usize {
        match self {
            InterfaceKind::Station => 0,
            InterfaceKind::AccessPoint => 1,
            InterfaceKind::Ppp => 2,
            InterfaceKind::Ethernet => 3,
        }
    }

    /// Short name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::Station => "sta",
            InterfaceKind::AccessPoint => "ap",
            InterfaceKind::Ppp => "ppp",
            InterfaceKind::Ethernet => "eth",
        }
    }

    /// True for the kinds served by the shared Wi-Fi radio.
    pub fn uses_shared_radio(&self) -> bool {
        matches!(self, InterfaceKind::Station | InterfaceKind::AccessPoint)
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A set of interface kinds, used for mode masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InterfaceSet(pub u8);

impl InterfaceSet {
    pub const NONE: InterfaceSet = InterfaceSet(0);
    pub const STATION: InterfaceSet = InterfaceSet(1 << 0);
    pub const ACCESS_POINT: InterfaceSet = InterfaceSet(1 << 1);
    pub const PPP: InterfaceSet = InterfaceSet(1 << 2);
    pub const ETHERNET: InterfaceSet = InterfaceSet(1 << 3);
    pub const ALL: InterfaceSet = InterfaceSet(0b1111);

    /// The singleton set for one kind.
    pub fn from_kind(kind: InterfaceKind) -> Self {
        match kind {
            InterfaceKind::Station => Self::STATION,
            InterfaceKind::AccessPoint => Self::ACCESS_POINT,
            InterfaceKind::Ppp => Self::PPP,
            InterfaceKind::Ethernet => Self::ETHERNET,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, kind: InterfaceKind) -> bool {
        self.0 & Self::from_kind(kind).0 != 0
    }

    pub fn insert(&mut self, kind: InterfaceKind) {
        self.0 |= Self::from_kind(kind).0;
    }

    pub fn remove(&mut self, kind: InterfaceKind) {
        self.0 &= !Self::from_kind(kind).0;
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Iterate the member kinds in lifecycle ordering.
    pub fn iter(&self) -> impl Iterator<Item = InterfaceKind> + '_ {
        InterfaceKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl std::ops::BitOr for InterfaceSet {
    type Output = InterfaceSet;

    fn bitor(self, rhs: InterfaceSet) -> InterfaceSet {
        InterfaceSet(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for InterfaceSet {
    fn bitor_assign(&mut self, rhs: InterfaceSet) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for InterfaceSet {
    type Output = InterfaceSet;

    fn bitand(self, rhs: InterfaceSet) -> InterfaceSet {
        InterfaceSet(self.0 & rhs.0)
    }
}

impl fmt::Display for InterfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{}", kind)?;
            first = false;
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

impl From<InterfaceKind> for InterfaceSet {
    fn from(kind: InterfaceKind) -> Self {
        InterfaceSet::from_kind(kind)
    }
}

/// A vendor SDK status code, carried verbatim for diagnostics.
///
/// Zero is success; any other value is a driver-defined failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverStatus(pub i32);

impl DriverStatus {
    pub const OK: DriverStatus = DriverStatus(0);

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    pub fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "ok")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

/// The raw event namespaces a vendor driver can deliver from.
///
/// Each source has its own sub-code numbering; the pair
/// `(RawSource, code)` identifies one vendor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawSource {
    /// Wi-Fi driver events (scan, station, soft-AP).
    Wifi,
    /// IP stack events (address acquisition and loss).
    Ip,
    /// Wi-Fi provisioning engine events.
    Provision,
    /// Smart-config provisioning events.
    SmartConfig,
    /// Modem/PPP link events.
    Ppp,
    /// Ethernet MAC events.
    Ethernet,
}

impl RawSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawSource::Wifi => "wifi",
            RawSource::Ip => "ip",
            RawSource::Provision => "prov",
            RawSource::SmartConfig => "smartconfig",
            RawSource::Ppp => "ppp",
            RawSource::Ethernet => "eth",
        }
    }
}

impl fmt::Display for RawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_set_membership() {
        let mut set = InterfaceSet::NONE;
        assert!(set.is_empty());

        set.insert(InterfaceKind::Station);
        set.insert(InterfaceKind::AccessPoint);
        assert!(set.contains(InterfaceKind::Station));
        assert!(set.contains(InterfaceKind::AccessPoint));
        assert!(!set.contains(InterfaceKind::Ppp));
        assert_eq!(set.len(), 2);

        set.remove(InterfaceKind::Station);
        assert!(!set.contains(InterfaceKind::Station));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_interface_set_ops() {
        let ap_sta = InterfaceSet::STATION | InterfaceSet::ACCESS_POINT;
        assert_eq!(ap_sta & InterfaceSet::STATION, InterfaceSet::STATION);
        assert_eq!(ap_sta & InterfaceSet::PPP, InterfaceSet::NONE);
        assert_eq!(InterfaceSet::ALL.len(), 4);
    }

    #[test]
    fn test_interface_set_display() {
        let set = InterfaceSet::STATION | InterfaceSet::PPP;
        assert_eq!(set.to_string(), "sta|ppp");
        assert_eq!(InterfaceSet::NONE.to_string(), "none");
    }

    #[test]
    fn test_interface_set_iter_order() {
        let set = InterfaceSet::ALL;
        let kinds: Vec<InterfaceKind> = set.iter().collect();
        assert_eq!(kinds, InterfaceKind::ALL.to_vec());
    }

    #[test]
    fn test_driver_status() {
        assert!(DriverStatus::OK.is_ok());
        let err = DriverStatus(0x3001);
        assert!(!err.is_ok());
        assert_eq!(err.to_string(), "0x3001");
    }

    #[test]
    fn test_kind_index_is_stable() {
        for (i, kind) in InterfaceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
