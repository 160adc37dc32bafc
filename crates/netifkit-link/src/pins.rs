//! Shared bus-pin ownership registry.
//!
//! Modem sessions acquire exclusive ownership of their UART pins here
//! before touching the hardware, and release them on teardown or on
//! abnormal detach. The registry is the resource-busy arbitration point:
//! a pin already owned by another holder fails acquisition.

use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use netifkit_core::error::SessionError;

/// Identity of a pin owner, unique per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Create a new unique owner identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Owner({})", &self.0.to_string()[..8])
    }
}

/// Process-wide ledger of bus-pin ownership.
#[derive(Debug, Default)]
pub struct PinRegistry {
    owners: Mutex<HashMap<u8, OwnerId>>,
}

impl PinRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive ownership of a pin.
    ///
    /// Re-acquiring a pin already held by the same owner succeeds.
    pub fn acquire(&self, pin: u8, owner: OwnerId) -> Result<(), SessionError> {
        let mut owners = self.owners.lock();
        match owners.get(&pin) {
            Some(current) if *current != owner => Err(SessionError::ResourceBusy {
                resource: format!("pin {}", pin),
            }),
            _ => {
                owners.insert(pin, owner);
                Ok(())
            }
        }
    }

    /// Release a pin if held by this owner. Releasing a pin not held is
    /// a no-op.
    pub fn release(&self, pin: u8, owner: OwnerId) {
        let mut owners = self.owners.lock();
        if owners.get(&pin) == Some(&owner) {
            owners.remove(&pin);
        }
    }

    /// Release every pin held by an owner, returning how many were freed
    pub fn release_all(&self, owner: OwnerId) -> usize {
        let mut owners = self.owners.lock();
        let before = owners.len();
        owners.retain(|_, o| *o != owner);
        before - owners.len()
    }

    /// The pins currently held by an owner
    pub fn owned_by(&self, owner: OwnerId) -> Vec<u8> {
        let mut pins: Vec<u8> = self
            .owners
            .lock()
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(pin, _)| *pin)
            .collect();
        pins.sort_unstable();
        pins
    }

    /// Whether a pin is owned by anyone
    pub fn is_owned(&self, pin: u8) -> bool {
        self.owners.lock().contains_key(&pin)
    }

    /// Total number of owned pins
    pub fn owned_count(&self) -> usize {
        self.owners.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release() {
        let registry = PinRegistry::new();
        let owner = OwnerId::new();

        registry.acquire(17, owner).unwrap();
        assert!(registry.is_owned(17));
        assert_eq!(registry.owned_by(owner), vec![17]);

        registry.release(17, owner);
        assert!(!registry.is_owned(17));
    }

    #[test]
    fn test_conflict() {
        let registry = PinRegistry::new();
        let a = OwnerId::new();
        let b = OwnerId::new();

        registry.acquire(4, a).unwrap();
        let err = registry.acquire(4, b).unwrap_err();
        assert!(matches!(err, SessionError::ResourceBusy { .. }));

        // Same owner may re-acquire
        registry.acquire(4, a).unwrap();
    }

    #[test]
    fn test_release_wrong_owner_is_noop() {
        let registry = PinRegistry::new();
        let a = OwnerId::new();
        let b = OwnerId::new();

        registry.acquire(9, a).unwrap();
        registry.release(9, b);
        assert!(registry.is_owned(9));
    }

    #[test]
    fn test_release_all() {
        let registry = PinRegistry::new();
        let a = OwnerId::new();
        let b = OwnerId::new();

        registry.acquire(1, a).unwrap();
        registry.acquire(2, a).unwrap();
        registry.acquire(3, b).unwrap();

        assert_eq!(registry.release_all(a), 2);
        assert_eq!(registry.owned_count(), 1);
        assert!(registry.is_owned(3));
        assert!(registry.owned_by(a).is_empty());
    }
}
