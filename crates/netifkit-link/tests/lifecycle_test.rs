//! Integration tests for the interface lifecycle manager over the mock
//! radio driver.

use std::sync::Arc;
use std::time::Duration;

use netifkit_core::event_bus::{EventCallback, EventFilter, NetEvent, NetEventKind};
use netifkit_core::types::{DriverStatus, InterfaceKind, InterfaceSet, RawSource};
use netifkit_link::driver::{MockRadioDriver, RadioOp};
use netifkit_link::lifecycle::{ManagerConfig, NetifManager};
use netifkit_link::translate::{codes, encode_got_ip};

fn manager() -> (Arc<MockRadioDriver>, NetifManager) {
    let driver = Arc::new(MockRadioDriver::new());
    let manager = NetifManager::new(driver.clone());
    (driver, manager)
}

fn manager_with(config: ManagerConfig) -> (Arc<MockRadioDriver>, NetifManager) {
    let driver = Arc::new(MockRadioDriver::new());
    let manager = NetifManager::with_config(driver.clone(), config);
    (driver, manager)
}

#[tokio::test]
async fn test_station_and_ap_share_one_driver() {
    let (driver, manager) = manager();

    manager.enable(InterfaceKind::Station).await.unwrap();
    manager.enable(InterfaceKind::AccessPoint).await.unwrap();

    // One shared init, one radio start, an interface-specific netif each
    assert_eq!(driver.calls(RadioOp::Init), 1);
    assert_eq!(driver.calls(RadioOp::Start), 1);
    assert_eq!(driver.calls(RadioOp::CreateNetif), 2);
    assert_eq!(
        driver.last_mode(),
        Some(InterfaceSet::STATION | InterfaceSet::ACCESS_POINT)
    );

    // Disabling one keeps the shared driver up for the other
    manager.disable(InterfaceKind::Station).await.unwrap();
    assert_eq!(driver.calls(RadioOp::Deinit), 0);
    assert!(manager.driver_initialized());
    assert_eq!(driver.last_mode(), Some(InterfaceSet::ACCESS_POINT));

    // Last one down tears it down
    manager.disable(InterfaceKind::AccessPoint).await.unwrap();
    assert_eq!(driver.calls(RadioOp::Deinit), 1);
    assert!(!manager.driver_initialized());
    assert_eq!(manager.active_interfaces(), 0);
}

#[tokio::test]
async fn test_set_mode_switches_interfaces() {
    let (driver, manager) = manager();

    manager.set_mode(InterfaceSet::STATION).await.unwrap();
    assert!(manager.is_enabled(InterfaceKind::Station));

    manager
        .set_mode(InterfaceSet::STATION | InterfaceSet::ACCESS_POINT)
        .await
        .unwrap();
    assert_eq!(manager.active_interfaces(), 2);

    // Switching AP out while keeping the station never tears down the
    // shared driver
    manager.set_mode(InterfaceSet::STATION).await.unwrap();
    assert!(manager.is_enabled(InterfaceKind::Station));
    assert!(!manager.is_enabled(InterfaceKind::AccessPoint));
    assert_eq!(driver.calls(RadioOp::Deinit), 0);
    assert_eq!(driver.calls(RadioOp::Init), 1);

    manager.set_mode(InterfaceSet::NONE).await.unwrap();
    assert_eq!(driver.calls(RadioOp::Deinit), 1);
}

#[tokio::test]
async fn test_set_mode_disjoint_swap_keeps_driver() {
    let (driver, manager) = manager();
    manager.enable(InterfaceKind::AccessPoint).await.unwrap();

    // AP and Station share no member, so the AP disable runs before the
    // Station enable; the shared driver must survive the gap
    manager.set_mode(InterfaceSet::STATION).await.unwrap();

    assert!(manager.is_enabled(InterfaceKind::Station));
    assert!(!manager.is_enabled(InterfaceKind::AccessPoint));
    assert!(manager.driver_initialized());
    assert_eq!(driver.calls(RadioOp::Deinit), 0);
    assert_eq!(driver.calls(RadioOp::Init), 1);
    assert_eq!(driver.calls(RadioOp::Stop), 0);
    assert!(driver.has_sink());
}

#[tokio::test]
async fn test_enabled_set_tracks_phases() {
    let (_driver, manager) = manager();
    assert!(manager.enabled_set().is_empty());

    manager.enable(InterfaceKind::Ethernet).await.unwrap();
    manager.enable(InterfaceKind::Station).await.unwrap();
    let set = manager.enabled_set();
    assert!(set.contains(InterfaceKind::Ethernet));
    assert!(set.contains(InterfaceKind::Station));
    assert_eq!(set.len(), 2);
    assert_eq!(manager.active_interfaces(), 2);
}

#[tokio::test]
async fn test_teardown_failure_is_tolerated() {
    let (driver, manager) = manager();
    manager.enable(InterfaceKind::Station).await.unwrap();

    // A failing deinit still reports the disable as successful, but the
    // driver stays marked initialized
    driver.fail_on(RadioOp::Deinit, DriverStatus(0x5001));
    manager.disable(InterfaceKind::Station).await.unwrap();
    assert!(!manager.is_enabled(InterfaceKind::Station));
    assert_eq!(manager.active_interfaces(), 0);
    assert!(manager.driver_initialized());

    // The next enable detects the stale init and skips re-init, but
    // must still re-install the event sink the teardown cleared
    driver.clear_failures();
    assert!(!driver.has_sink());
    manager.enable(InterfaceKind::Station).await.unwrap();
    assert_eq!(driver.calls(RadioOp::Init), 1);
    assert!(manager.is_enabled(InterfaceKind::Station));
    assert!(driver.has_sink());

    // Raw events flow again after the recovery enable
    let payload = encode_got_ip(
        true,
        "10.0.0.2".parse().unwrap(),
        "255.255.255.0".parse().unwrap(),
        "10.0.0.1".parse().unwrap(),
    );
    driver.deliver(RawSource::Ip, codes::ip::STA_GOT_IP, &payload);
    assert!(manager.status().has_ip(InterfaceKind::Station));
}

#[tokio::test]
async fn test_long_range_enable_is_strict() {
    let (driver, manager) = manager_with(ManagerConfig {
        long_range: true,
        ..Default::default()
    });
    driver.fail_once(RadioOp::SetLongRange, DriverStatus(0x5002));

    let err = manager.enable(InterfaceKind::Station).await.unwrap_err();
    assert_eq!(err.driver_status(), Some(DriverStatus(0x5002)));
    assert!(!manager.is_enabled(InterfaceKind::Station));
    // Rollback destroyed the netif created during the attempt
    assert!(driver.netifs().is_empty());
}

#[tokio::test]
async fn test_long_range_revert_is_tolerant_by_default() {
    let (driver, manager) = manager_with(ManagerConfig {
        long_range: true,
        ..Default::default()
    });
    manager.enable(InterfaceKind::Station).await.unwrap();
    assert_eq!(driver.long_range(InterfaceKind::Station), Some(true));

    driver.fail_on(RadioOp::SetLongRange, DriverStatus(0x5003));
    manager.disable(InterfaceKind::Station).await.unwrap();
    assert!(!manager.is_enabled(InterfaceKind::Station));
}

#[tokio::test]
async fn test_long_range_revert_strict_surfaces_failure() {
    let (driver, manager) = manager_with(ManagerConfig {
        long_range: true,
        strict_protocol_revert: true,
        ..Default::default()
    });
    manager.enable(InterfaceKind::Station).await.unwrap();

    driver.fail_once(RadioOp::SetLongRange, DriverStatus(0x5004));
    let err = manager.disable(InterfaceKind::Station).await.unwrap_err();
    assert_eq!(err.driver_status(), Some(DriverStatus(0x5004)));
    // The interface stays enabled; the caller decides what to do next
    assert!(manager.is_enabled(InterfaceKind::Station));

    manager.disable(InterfaceKind::Station).await.unwrap();
    assert!(!manager.is_enabled(InterfaceKind::Station));
}

#[tokio::test]
async fn test_hostname_applied_on_enable() {
    let (driver, manager) = manager_with(ManagerConfig {
        hostname: Some("netif-host".to_string()),
        ..Default::default()
    });

    manager.enable(InterfaceKind::Station).await.unwrap();
    assert_eq!(driver.hostname(InterfaceKind::Station).as_deref(), Some("netif-host"));

    // AP netifs carry no hostname
    manager.enable(InterfaceKind::AccessPoint).await.unwrap();
    assert_eq!(driver.hostname(InterfaceKind::AccessPoint), None);
}

#[tokio::test]
async fn test_hostname_failure_does_not_block_enable() {
    let (driver, manager) = manager_with(ManagerConfig {
        hostname: Some("netif-host".to_string()),
        ..Default::default()
    });
    driver.fail_on(RadioOp::SetHostname, DriverStatus(0x5005));

    manager.enable(InterfaceKind::Station).await.unwrap();
    assert!(manager.is_enabled(InterfaceKind::Station));
}

#[tokio::test]
async fn test_lifecycle_events_reach_subscribers() {
    let (_driver, manager) = manager();

    let seen: Arc<parking_lot::Mutex<Vec<NetEventKind>>> =
        Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    manager.events().subscribe(
        EventFilter::Any,
        EventCallback::event(move |event: &NetEvent| {
            sink.lock().push(event.kind());
        }),
    );

    manager.enable(InterfaceKind::Station).await.unwrap();
    manager.disable(InterfaceKind::Station).await.unwrap();

    assert_eq!(
        *seen.lock(),
        vec![NetEventKind::StationStarted, NetEventKind::StationStopped]
    );
}

#[tokio::test]
async fn test_wait_connected_times_out() {
    let (_driver, manager) = manager();
    manager.enable(InterfaceKind::Station).await.unwrap();

    let err = manager
        .wait_connected(InterfaceKind::Station, Duration::from_millis(20))
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_wait_connected_sees_driver_event() {
    let (driver, manager) = manager();
    manager.enable(InterfaceKind::Station).await.unwrap();

    // Raw connect event delivered from another thread, as a real driver
    // callback would
    let driver2 = driver.clone();
    let waker = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        // ssid [u8;32], ssid_len, bssid [u8;6], channel, authmode
        let mut payload = b"tnet!".to_vec();
        payload.resize(32, 0);
        payload.push(5);
        payload.extend_from_slice(&[0xaa; 6]);
        payload.push(11);
        payload.push(3);
        driver2.deliver(RawSource::Wifi, codes::wifi::STA_CONNECTED, &payload);
    });

    manager
        .wait_connected(InterfaceKind::Station, Duration::from_secs(2))
        .unwrap();
    assert!(manager.status().is_connected(InterfaceKind::Station));
    waker.join().unwrap();
}
