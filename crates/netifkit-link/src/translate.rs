//! Vendor event translation.
//!
//! Converts raw vendor event records, tagged by `(RawSource, sub-code)`
//! and carrying an opaque little-endian payload, into typed `NetEvent`s
//! by static table lookup. Combinations absent from the table translate
//! to nothing: many vendor sub-events are intentionally unhandled, and
//! dropping unknown codes silently keeps the table forward-compatible
//! with vendor additions.
//!
//! Decode functions copy every field out of the raw buffer before
//! returning; the buffer belongs to the driver and dies with the
//! delivery callback. A payload shorter than the expected layout also
//! yields no event.

use std::net::{Ipv4Addr, Ipv6Addr};

use netifkit_core::event_bus::NetEvent;
use netifkit_core::types::{DriverStatus, RawSource};

/// Raw sub-codes per source, mirroring the vendor numbering.
pub mod codes {
    /// `RawSource::Wifi` sub-codes.
    pub mod wifi {
        pub const READY: i32 = 0;
        pub const SCAN_DONE: i32 = 1;
        pub const STA_START: i32 = 2;
        pub const STA_STOP: i32 = 3;
        pub const STA_CONNECTED: i32 = 4;
        pub const STA_DISCONNECTED: i32 = 5;
        pub const STA_AUTHMODE_CHANGE: i32 = 6;
        pub const AP_START: i32 = 12;
        pub const AP_STOP: i32 = 13;
        pub const AP_STACONNECTED: i32 = 14;
        pub const AP_STADISCONNECTED: i32 = 15;
        pub const AP_PROBEREQRECVED: i32 = 16;
    }

    /// `RawSource::Ip` sub-codes.
    pub mod ip {
        pub const STA_GOT_IP: i32 = 0;
        pub const STA_LOST_IP: i32 = 1;
        pub const AP_STAIPASSIGNED: i32 = 2;
        pub const GOT_IP6: i32 = 3;
        pub const ETH_GOT_IP: i32 = 4;
        pub const ETH_LOST_IP: i32 = 5;
        pub const PPP_GOT_IP: i32 = 6;
        pub const PPP_LOST_IP: i32 = 7;
        pub const ETH_GOT_IP6: i32 = 8;
    }

    /// `RawSource::Provision` sub-codes.
    pub mod prov {
        pub const INIT: i32 = 0;
        pub const DEINIT: i32 = 1;
        pub const START: i32 = 2;
        pub const END: i32 = 3;
        pub const CRED_RECV: i32 = 4;
        pub const CRED_FAIL: i32 = 5;
        pub const CRED_SUCCESS: i32 = 6;
    }

    /// `RawSource::SmartConfig` sub-codes.
    pub mod sc {
        pub const SCAN_DONE: i32 = 0;
        pub const FOUND_CHANNEL: i32 = 1;
        pub const GOT_SSID_PSWD: i32 = 2;
        pub const SEND_ACK_DONE: i32 = 3;
    }

    /// `RawSource::Ppp` sub-codes.
    pub mod ppp {
        pub const START: i32 = 0;
        pub const STOP: i32 = 1;
        pub const CONNECT: i32 = 2;
        pub const DISCONNECT: i32 = 3;
        pub const ERROR: i32 = 4;
    }

    /// `RawSource::Ethernet` sub-codes.
    pub mod eth {
        pub const START: i32 = 0;
        pub const STOP: i32 = 1;
        pub const CONNECTED: i32 = 2;
        pub const DISCONNECTED: i32 = 3;
    }
}

type DecodeFn = fn(&[u8]) -> Option<NetEvent>;

/// The translation table: one entry per handled `(source, code)` pair.
static TABLE: &[((RawSource, i32), DecodeFn)] = &[
    ((RawSource::Wifi, codes::wifi::READY), |_| Some(NetEvent::Ready)),
    ((RawSource::Wifi, codes::wifi::SCAN_DONE), decode_scan_done),
    ((RawSource::Wifi, codes::wifi::STA_START), |_| {
        Some(NetEvent::StationStarted)
    }),
    ((RawSource::Wifi, codes::wifi::STA_STOP), |_| {
        Some(NetEvent::StationStopped)
    }),
    (
        (RawSource::Wifi, codes::wifi::STA_CONNECTED),
        decode_sta_connected,
    ),
    (
        (RawSource::Wifi, codes::wifi::STA_DISCONNECTED),
        decode_sta_disconnected,
    ),
    (
        (RawSource::Wifi, codes::wifi::STA_AUTHMODE_CHANGE),
        decode_authmode_change,
    ),
    ((RawSource::Wifi, codes::wifi::AP_START), |_| {
        Some(NetEvent::ApStarted)
    }),
    ((RawSource::Wifi, codes::wifi::AP_STOP), |_| {
        Some(NetEvent::ApStopped)
    }),
    (
        (RawSource::Wifi, codes::wifi::AP_STACONNECTED),
        decode_ap_sta_joined,
    ),
    (
        (RawSource::Wifi, codes::wifi::AP_STADISCONNECTED),
        decode_ap_sta_left,
    ),
    (
        (RawSource::Wifi, codes::wifi::AP_PROBEREQRECVED),
        decode_ap_probe,
    ),
    ((RawSource::Ip, codes::ip::STA_GOT_IP), decode_sta_got_ip),
    ((RawSource::Ip, codes::ip::STA_LOST_IP), |_| {
        Some(NetEvent::LostIp)
    }),
    (
        (RawSource::Ip, codes::ip::AP_STAIPASSIGNED),
        decode_ap_ip_assigned,
    ),
    ((RawSource::Ip, codes::ip::GOT_IP6), decode_got_ip6),
    ((RawSource::Ip, codes::ip::ETH_GOT_IP), decode_eth_got_ip),
    ((RawSource::Ip, codes::ip::ETH_LOST_IP), |_| {
        Some(NetEvent::EthLostIp)
    }),
    ((RawSource::Ip, codes::ip::PPP_GOT_IP), decode_ppp_got_ip),
    ((RawSource::Ip, codes::ip::PPP_LOST_IP), |_| {
        Some(NetEvent::PppLostIp)
    }),
    ((RawSource::Ip, codes::ip::ETH_GOT_IP6), decode_eth_got_ip6),
    ((RawSource::Provision, codes::prov::INIT), |_| {
        Some(NetEvent::ProvInit)
    }),
    ((RawSource::Provision, codes::prov::DEINIT), |_| {
        Some(NetEvent::ProvDeinit)
    }),
    ((RawSource::Provision, codes::prov::START), |_| {
        Some(NetEvent::ProvStarted)
    }),
    ((RawSource::Provision, codes::prov::END), |_| {
        Some(NetEvent::ProvEnded)
    }),
    (
        (RawSource::Provision, codes::prov::CRED_RECV),
        decode_prov_cred_recv,
    ),
    (
        (RawSource::Provision, codes::prov::CRED_FAIL),
        decode_prov_cred_fail,
    ),
    ((RawSource::Provision, codes::prov::CRED_SUCCESS), |_| {
        Some(NetEvent::ProvCredentialsSuccess)
    }),
    ((RawSource::SmartConfig, codes::sc::SCAN_DONE), |_| {
        Some(NetEvent::ScScanDone)
    }),
    ((RawSource::SmartConfig, codes::sc::FOUND_CHANNEL), |_| {
        Some(NetEvent::ScFoundChannel)
    }),
    (
        (RawSource::SmartConfig, codes::sc::GOT_SSID_PSWD),
        decode_sc_got_credentials,
    ),
    ((RawSource::SmartConfig, codes::sc::SEND_ACK_DONE), |_| {
        Some(NetEvent::ScAckSent)
    }),
    ((RawSource::Ppp, codes::ppp::START), |_| {
        Some(NetEvent::PppStarted)
    }),
    ((RawSource::Ppp, codes::ppp::STOP), |_| {
        Some(NetEvent::PppStopped)
    }),
    ((RawSource::Ppp, codes::ppp::CONNECT), |_| {
        Some(NetEvent::PppConnected)
    }),
    ((RawSource::Ppp, codes::ppp::DISCONNECT), |_| {
        Some(NetEvent::PppDisconnected)
    }),
    ((RawSource::Ppp, codes::ppp::ERROR), decode_modem_error),
    ((RawSource::Ethernet, codes::eth::START), |_| {
        Some(NetEvent::EthStarted)
    }),
    ((RawSource::Ethernet, codes::eth::STOP), |_| {
        Some(NetEvent::EthStopped)
    }),
    ((RawSource::Ethernet, codes::eth::CONNECTED), |_| {
        Some(NetEvent::EthConnected)
    }),
    ((RawSource::Ethernet, codes::eth::DISCONNECTED), |_| {
        Some(NetEvent::EthDisconnected)
    }),
];

/// Translate a raw vendor event into a typed event.
///
/// Returns `None` for unknown `(source, code)` pairs and for payloads
/// shorter than the entry's layout; both are dropped silently by policy.
pub fn translate(source: RawSource, code: i32, payload: &[u8]) -> Option<NetEvent> {
    TABLE
        .iter()
        .find(|((s, c), _)| *s == source && *c == code)
        .and_then(|(_, decode)| decode(payload))
}

// Little-endian field readers. Each returns None when the buffer is too
// short, which the caller surfaces as "no event".

fn read_u32(payload: &[u8], offset: usize) -> Option<u32> {
    payload
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_i32(payload: &[u8], offset: usize) -> Option<i32> {
    read_u32(payload, offset).map(|v| v as i32)
}

fn read_u8(payload: &[u8], offset: usize) -> Option<u8> {
    payload.get(offset).copied()
}

fn read_mac(payload: &[u8], offset: usize) -> Option<[u8; 6]> {
    payload
        .get(offset..offset + 6)
        .map(|b| [b[0], b[1], b[2], b[3], b[4], b[5]])
}

fn read_ipv4(payload: &[u8], offset: usize) -> Option<Ipv4Addr> {
    read_u32(payload, offset).map(Ipv4Addr::from)
}

/// Read a fixed-capacity SSID or passphrase field: `cap` bytes of data
/// followed by one length byte.
fn read_counted(payload: &[u8], offset: usize, cap: usize) -> Option<Vec<u8>> {
    let data = payload.get(offset..offset + cap)?;
    let len = (*payload.get(offset + cap)? as usize).min(cap);
    Some(data[..len].to_vec())
}

// Layout: status u32, number u8, scan_id u8
fn decode_scan_done(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ScanDone {
        status: read_u32(payload, 0)?,
        number: read_u8(payload, 4)?,
        scan_id: read_u8(payload, 5)?,
    })
}

// Layout: ssid [u8;32], ssid_len u8, bssid [u8;6], channel u8, authmode u8
fn decode_sta_connected(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::StationConnected {
        ssid: read_counted(payload, 0, 32)?,
        bssid: read_mac(payload, 33)?,
        channel: read_u8(payload, 39)?,
        auth_mode: read_u8(payload, 40)?,
    })
}

// Layout: ssid [u8;32], ssid_len u8, bssid [u8;6], reason u8
fn decode_sta_disconnected(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::StationDisconnected {
        ssid: read_counted(payload, 0, 32)?,
        bssid: read_mac(payload, 33)?,
        reason: read_u8(payload, 39)?,
    })
}

// Layout: old_mode u8, new_mode u8
fn decode_authmode_change(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::StationAuthModeChanged {
        old_mode: read_u8(payload, 0)?,
        new_mode: read_u8(payload, 1)?,
    })
}

// Layout: mac [u8;6], aid u8
fn decode_ap_sta_joined(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ApStationJoined {
        mac: read_mac(payload, 0)?,
        aid: read_u8(payload, 6)?,
    })
}

fn decode_ap_sta_left(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ApStationLeft {
        mac: read_mac(payload, 0)?,
        aid: read_u8(payload, 6)?,
    })
}

// Layout: rssi i8, mac [u8;6]
fn decode_ap_probe(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ApProbeRequest {
        rssi: read_u8(payload, 0)? as i8,
        mac: read_mac(payload, 1)?,
    })
}

// Layout: changed u8, ip u32, netmask u32, gateway u32
fn decode_ipv4_info(payload: &[u8]) -> Option<(bool, Ipv4Addr, Ipv4Addr, Ipv4Addr)> {
    Some((
        read_u8(payload, 0)? != 0,
        read_ipv4(payload, 1)?,
        read_ipv4(payload, 5)?,
        read_ipv4(payload, 9)?,
    ))
}

fn decode_sta_got_ip(payload: &[u8]) -> Option<NetEvent> {
    let (changed, ip, netmask, gateway) = decode_ipv4_info(payload)?;
    Some(NetEvent::GotIpv4 {
        changed,
        ip,
        netmask,
        gateway,
    })
}

fn decode_eth_got_ip(payload: &[u8]) -> Option<NetEvent> {
    let (changed, ip, netmask, gateway) = decode_ipv4_info(payload)?;
    Some(NetEvent::EthGotIpv4 {
        changed,
        ip,
        netmask,
        gateway,
    })
}

fn decode_ppp_got_ip(payload: &[u8]) -> Option<NetEvent> {
    let (changed, ip, netmask, gateway) = decode_ipv4_info(payload)?;
    Some(NetEvent::PppGotIpv4 {
        changed,
        ip,
        netmask,
        gateway,
    })
}

// Layout: index i32, addr [u8;16]
fn decode_ipv6_info(payload: &[u8]) -> Option<(i32, Ipv6Addr)> {
    let index = read_i32(payload, 0)?;
    let bytes = payload.get(4..20)?;
    let mut addr = [0u8; 16];
    addr.copy_from_slice(bytes);
    Some((index, Ipv6Addr::from(addr)))
}

fn decode_got_ip6(payload: &[u8]) -> Option<NetEvent> {
    let (index, addr) = decode_ipv6_info(payload)?;
    Some(NetEvent::GotIpv6 { index, addr })
}

fn decode_eth_got_ip6(payload: &[u8]) -> Option<NetEvent> {
    let (index, addr) = decode_ipv6_info(payload)?;
    Some(NetEvent::EthGotIpv6 { index, addr })
}

// Layout: mac [u8;6], ip u32
fn decode_ap_ip_assigned(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ApIpAssigned {
        mac: read_mac(payload, 0)?,
        ip: read_ipv4(payload, 6)?,
    })
}

// Layout: ssid [u8;32], ssid_len u8, password [u8;64], pwd_len u8
fn decode_prov_cred_recv(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ProvCredentialsReceived {
        ssid: read_counted(payload, 0, 32)?,
        password: read_counted(payload, 33, 64)?,
    })
}

// Layout: reason u8
fn decode_prov_cred_fail(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ProvCredentialsFailed {
        reason: read_u8(payload, 0)?,
    })
}

// Layout: ssid [u8;32], ssid_len u8, password [u8;64], pwd_len u8, bssid [u8;6]
fn decode_sc_got_credentials(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ScGotCredentials {
        ssid: read_counted(payload, 0, 32)?,
        password: read_counted(payload, 33, 64)?,
        bssid: read_mac(payload, 98)?,
    })
}

// Layout: status i32
fn decode_modem_error(payload: &[u8]) -> Option<NetEvent> {
    Some(NetEvent::ModemError {
        status: DriverStatus(read_i32(payload, 0)?),
    })
}

/// Build the raw payload for a scan-done event. Test/mock helper.
pub fn encode_scan_done(status: u32, number: u8, scan_id: u8) -> Vec<u8> {
    let mut payload = status.to_le_bytes().to_vec();
    payload.push(number);
    payload.push(scan_id);
    payload
}

/// Build the raw payload for a station-disconnected event. Test/mock helper.
pub fn encode_sta_disconnected(ssid: &[u8], bssid: [u8; 6], reason: u8) -> Vec<u8> {
    let mut payload = vec![0u8; 40];
    let len = ssid.len().min(32);
    payload[..len].copy_from_slice(&ssid[..len]);
    payload[32] = len as u8;
    payload[33..39].copy_from_slice(&bssid);
    payload[39] = reason;
    payload
}

/// Build the raw payload for a got-IPv4 event. Test/mock helper.
pub fn encode_got_ip(changed: bool, ip: Ipv4Addr, netmask: Ipv4Addr, gateway: Ipv4Addr) -> Vec<u8> {
    let mut payload = vec![changed as u8];
    payload.extend_from_slice(&u32::from(ip).to_le_bytes());
    payload.extend_from_slice(&u32::from(netmask).to_le_bytes());
    payload.extend_from_slice(&u32::from(gateway).to_le_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use netifkit_core::event_bus::NetEventKind;

    #[test]
    fn test_scan_done() {
        let payload = encode_scan_done(0, 3, 1);
        let event = translate(RawSource::Wifi, codes::wifi::SCAN_DONE, &payload).unwrap();
        assert_eq!(
            event,
            NetEvent::ScanDone {
                status: 0,
                number: 3,
                scan_id: 1
            }
        );
    }

    #[test]
    fn test_unknown_code_is_dropped() {
        assert!(translate(RawSource::Wifi, 9999, &[]).is_none());
        assert!(translate(RawSource::Ip, 9999, &[1, 2, 3]).is_none());
    }

    #[test]
    fn test_short_payload_is_dropped() {
        // Scan-done needs 6 bytes
        assert!(translate(RawSource::Wifi, codes::wifi::SCAN_DONE, &[0, 0]).is_none());
        // Got-IP needs 13 bytes
        assert!(translate(RawSource::Ip, codes::ip::STA_GOT_IP, &[1, 2, 3, 4]).is_none());
    }

    #[test]
    fn test_no_payload_events() {
        assert_eq!(
            translate(RawSource::Wifi, codes::wifi::STA_START, &[]),
            Some(NetEvent::StationStarted)
        );
        assert_eq!(
            translate(RawSource::Ppp, codes::ppp::CONNECT, &[]),
            Some(NetEvent::PppConnected)
        );
        assert_eq!(
            translate(RawSource::Ethernet, codes::eth::CONNECTED, &[]),
            Some(NetEvent::EthConnected)
        );
    }

    #[test]
    fn test_sta_disconnected_fields() {
        let payload = encode_sta_disconnected(b"mynet", [1, 2, 3, 4, 5, 6], 201);
        let event = translate(RawSource::Wifi, codes::wifi::STA_DISCONNECTED, &payload).unwrap();
        match event {
            NetEvent::StationDisconnected {
                ssid,
                bssid,
                reason,
            } => {
                assert_eq!(ssid, b"mynet");
                assert_eq!(bssid, [1, 2, 3, 4, 5, 6]);
                assert_eq!(reason, 201);
            }
            other => panic!("Wrong event: {:?}", other),
        }
    }

    #[test]
    fn test_got_ip_fields() {
        let payload = encode_got_ip(
            true,
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
        );
        let event = translate(RawSource::Ip, codes::ip::STA_GOT_IP, &payload).unwrap();
        match event {
            NetEvent::GotIpv4 { changed, ip, .. } => {
                assert!(changed);
                assert_eq!(ip, Ipv4Addr::new(192, 168, 1, 10));
            }
            other => panic!("Wrong event: {:?}", other),
        }
    }

    #[test]
    fn test_payload_is_copied_out() {
        // The returned event must not reference the input buffer.
        let event = {
            let payload = encode_sta_disconnected(b"transient", [0; 6], 1);
            translate(RawSource::Wifi, codes::wifi::STA_DISCONNECTED, &payload).unwrap()
        };
        assert_eq!(event.kind(), NetEventKind::StationDisconnected);
    }

    #[test]
    fn test_ssid_len_clamped_to_capacity() {
        let mut payload = encode_sta_disconnected(b"net", [0; 6], 1);
        payload[32] = 200; // lying length byte
        let event = translate(RawSource::Wifi, codes::wifi::STA_DISCONNECTED, &payload).unwrap();
        match event {
            NetEvent::StationDisconnected { ssid, .. } => assert_eq!(ssid.len(), 32),
            other => panic!("Wrong event: {:?}", other),
        }
    }

    #[test]
    fn test_modem_error_status() {
        let payload = 0x7002i32.to_le_bytes().to_vec();
        let event = translate(RawSource::Ppp, codes::ppp::ERROR, &payload).unwrap();
        assert_eq!(
            event,
            NetEvent::ModemError {
                status: DriverStatus(0x7002)
            }
        );
    }

    #[test]
    fn test_table_has_no_duplicate_keys() {
        for (i, ((s1, c1), _)) in TABLE.iter().enumerate() {
            for ((s2, c2), _) in TABLE.iter().skip(i + 1) {
                assert!(
                    !(s1 == s2 && c1 == c2),
                    "duplicate table entry ({:?}, {})",
                    s1,
                    c1
                );
            }
        }
    }
}
