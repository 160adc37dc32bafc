//! Property tests: lifecycle and pin-registry invariants hold under
//! arbitrary operation sequences against an always-succeeding driver.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use netifkit_core::types::{InterfaceKind, InterfaceSet};
use netifkit_link::driver::{MockRadioDriver, RadioOp};
use netifkit_link::lifecycle::NetifManager;
use netifkit_link::pins::{OwnerId, PinRegistry};

#[derive(Debug, Clone, Copy)]
enum LifecycleOp {
    Enable(InterfaceKind),
    Disable(InterfaceKind),
    SetMode(InterfaceSet),
}

fn kind_strategy() -> impl Strategy<Value = InterfaceKind> {
    prop_oneof![
        Just(InterfaceKind::Station),
        Just(InterfaceKind::AccessPoint),
        Just(InterfaceKind::Ppp),
        Just(InterfaceKind::Ethernet),
    ]
}

fn set_strategy() -> impl Strategy<Value = InterfaceSet> {
    (0u8..16).prop_map(|bits| {
        let mut set = InterfaceSet::NONE;
        for kind in InterfaceKind::ALL {
            if bits & (1 << kind.index()) != 0 {
                set.insert(kind);
            }
        }
        set
    })
}

fn lifecycle_op_strategy() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        kind_strategy().prop_map(LifecycleOp::Enable),
        kind_strategy().prop_map(LifecycleOp::Disable),
        set_strategy().prop_map(LifecycleOp::SetMode),
    ]
}

proptest! {
    /// After any operation sequence the active-interface count, the
    /// enabled set, and the driver lifecycle flags agree.
    #[test]
    fn lifecycle_state_stays_consistent(ops in proptest::collection::vec(lifecycle_op_strategy(), 0..32)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let driver = Arc::new(MockRadioDriver::new());
            let manager = NetifManager::new(driver.clone());

            for op in ops {
                let was_empty = manager.enabled_set().is_empty();
                let inits_before = driver.calls(RadioOp::Init);
                let deinits_before = driver.calls(RadioOp::Deinit);

                match op {
                    LifecycleOp::Enable(kind) => manager.enable(kind).await.unwrap(),
                    LifecycleOp::Disable(kind) => manager.disable(kind).await.unwrap(),
                    LifecycleOp::SetMode(target) => manager.set_mode(target).await.unwrap(),
                }

                let set = manager.enabled_set();

                // The shared driver initializes only when coming up from
                // an empty set and deinitializes only when the set
                // empties; an operation that keeps some interface
                // enabled on both sides must not cycle it
                if !was_empty && !set.is_empty() {
                    prop_assert_eq!(driver.calls(RadioOp::Init), inits_before);
                    prop_assert_eq!(driver.calls(RadioOp::Deinit), deinits_before);
                }
                if was_empty {
                    prop_assert_eq!(driver.calls(RadioOp::Deinit), deinits_before);
                }
                if set.is_empty() {
                    prop_assert_eq!(driver.calls(RadioOp::Init), inits_before);
                }
                prop_assert_eq!(manager.active_interfaces(), set.len());
                for kind in InterfaceKind::ALL {
                    prop_assert_eq!(manager.is_enabled(kind), set.contains(kind));
                }
                // With a driver that never fails, initialized tracks
                // activity exactly
                prop_assert_eq!(manager.driver_initialized(), !set.is_empty());
                prop_assert_eq!(driver.is_initialized(), !set.is_empty());

                // The driver holds exactly one netif per enabled interface
                let mut netifs = driver.netifs();
                netifs.sort_by_key(|k| k.index());
                let mut enabled: Vec<_> = set.iter().collect();
                enabled.sort_by_key(|k| k.index());
                prop_assert_eq!(netifs, enabled);
            }
            Ok(())
        })?;
    }
}

#[derive(Debug, Clone, Copy)]
enum PinOp {
    Acquire { pin: u8, owner: usize },
    Release { pin: u8, owner: usize },
    ReleaseAll { owner: usize },
}

fn pin_op_strategy() -> impl Strategy<Value = PinOp> {
    let pin = 0u8..8;
    let owner = 0usize..3;
    prop_oneof![
        (pin.clone(), owner.clone()).prop_map(|(pin, owner)| PinOp::Acquire { pin, owner }),
        (pin, owner.clone()).prop_map(|(pin, owner)| PinOp::Release { pin, owner }),
        owner.prop_map(|owner| PinOp::ReleaseAll { owner }),
    ]
}

proptest! {
    /// The registry behaves like a map from pin to owner: acquisition
    /// succeeds exactly when the pin is free or already ours, and
    /// releases only ever remove our own entries.
    #[test]
    fn pin_registry_matches_model(ops in proptest::collection::vec(pin_op_strategy(), 0..64)) {
        let registry = PinRegistry::new();
        let owners: Vec<OwnerId> = (0..3).map(|_| OwnerId::new()).collect();
        let mut model: HashMap<u8, usize> = HashMap::new();

        for op in ops {
            match op {
                PinOp::Acquire { pin, owner } => {
                    let expect_ok = !model.contains_key(&pin) || model[&pin] == owner;
                    let result = registry.acquire(pin, owners[owner]);
                    prop_assert_eq!(result.is_ok(), expect_ok);
                    if expect_ok {
                        model.insert(pin, owner);
                    }
                }
                PinOp::Release { pin, owner } => {
                    registry.release(pin, owners[owner]);
                    if model.get(&pin) == Some(&owner) {
                        model.remove(&pin);
                    }
                }
                PinOp::ReleaseAll { owner } => {
                    let expected = model.values().filter(|o| **o == owner).count();
                    prop_assert_eq!(registry.release_all(owners[owner]), expected);
                    model.retain(|_, o| *o != owner);
                }
            }

            prop_assert_eq!(registry.owned_count(), model.len());
            for (pin, owner) in &model {
                prop_assert!(registry.owned_by(owners[*owner]).contains(pin));
            }
        }
    }
}
