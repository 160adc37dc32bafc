//! Typed network event definitions.
//!
//! `NetEvent` is the closed set of normalized events the translator
//! produces and subscribers consume, independent of any vendor-specific
//! event representation. Events are cloneable and serializable for
//! logging/replay.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::types::{DriverStatus, InterfaceKind};

/// A normalized network event with its kind-specific payload.
///
/// Payload fields mirror the vendor event fields application logic needs
/// (SSID/BSSID bytes, addresses, reason codes). Events are immutable once
/// constructed and handed to the event service by reference for the
/// duration of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetEvent {
    // Wi-Fi station
    /// Wi-Fi driver finished bring-up and is ready for commands.
    Ready,
    /// A station scan completed.
    ScanDone {
        /// Vendor scan status (0 = success).
        status: u32,
        /// Number of access points found.
        number: u8,
        /// Scan sequence identifier.
        scan_id: u8,
    },
    /// The station interface started.
    StationStarted,
    /// The station interface stopped.
    StationStopped,
    /// The station associated with an access point.
    StationConnected {
        /// SSID bytes of the access point.
        ssid: Vec<u8>,
        /// BSSID of the access point.
        bssid: [u8; 6],
        /// Channel the association is on.
        channel: u8,
        /// Vendor authentication mode code.
        auth_mode: u8,
    },
    /// The station disassociated from an access point.
    StationDisconnected {
        /// SSID bytes of the access point.
        ssid: Vec<u8>,
        /// BSSID of the access point.
        bssid: [u8; 6],
        /// Vendor disconnect reason code. See [`reason_name`].
        reason: u8,
    },
    /// The access point changed its authentication mode.
    StationAuthModeChanged {
        /// Previous vendor authentication mode code.
        old_mode: u8,
        /// New vendor authentication mode code.
        new_mode: u8,
    },
    /// The station obtained an IPv4 address.
    GotIpv4 {
        /// Whether the address differs from the previous one.
        changed: bool,
        /// Assigned address.
        ip: Ipv4Addr,
        /// Network mask.
        netmask: Ipv4Addr,
        /// Default gateway.
        gateway: Ipv4Addr,
    },
    /// The station obtained an IPv6 address.
    GotIpv6 {
        /// Netif-relative address slot index.
        index: i32,
        /// Assigned address.
        addr: Ipv6Addr,
    },
    /// The station lost its IPv4 address.
    LostIp,

    // Access point
    /// The soft-AP interface started.
    ApStarted,
    /// The soft-AP interface stopped.
    ApStopped,
    /// A client station joined the soft-AP.
    ApStationJoined {
        /// Client MAC address.
        mac: [u8; 6],
        /// Association identifier assigned to the client.
        aid: u8,
    },
    /// A client station left the soft-AP.
    ApStationLeft {
        /// Client MAC address.
        mac: [u8; 6],
        /// Association identifier the client held.
        aid: u8,
    },
    /// A probe request was received by the soft-AP.
    ApProbeRequest {
        /// Received signal strength of the probe.
        rssi: i8,
        /// MAC address of the probing station.
        mac: [u8; 6],
    },
    /// The soft-AP DHCP server assigned a client an address.
    ApIpAssigned {
        /// Client MAC address.
        mac: [u8; 6],
        /// Assigned address.
        ip: Ipv4Addr,
    },

    // Ethernet
    /// The Ethernet interface started.
    EthStarted,
    /// The Ethernet interface stopped.
    EthStopped,
    /// Ethernet link came up.
    EthConnected,
    /// Ethernet link went down.
    EthDisconnected,
    /// The Ethernet interface obtained an IPv4 address.
    EthGotIpv4 {
        /// Whether the address differs from the previous one.
        changed: bool,
        /// Assigned address.
        ip: Ipv4Addr,
        /// Network mask.
        netmask: Ipv4Addr,
        /// Default gateway.
        gateway: Ipv4Addr,
    },
    /// The Ethernet interface obtained an IPv6 address.
    EthGotIpv6 {
        /// Netif-relative address slot index.
        index: i32,
        /// Assigned address.
        addr: Ipv6Addr,
    },
    /// The Ethernet interface lost its IPv4 address.
    EthLostIp,

    // PPP / modem
    /// The PPP interface started.
    PppStarted,
    /// The PPP interface stopped.
    PppStopped,
    /// The PPP link negotiated successfully.
    PppConnected,
    /// The PPP link went down.
    PppDisconnected,
    /// The PPP interface obtained an IPv4 address.
    PppGotIpv4 {
        /// Whether the address differs from the previous one.
        changed: bool,
        /// Assigned address.
        ip: Ipv4Addr,
        /// Network mask.
        netmask: Ipv4Addr,
        /// Default gateway.
        gateway: Ipv4Addr,
    },
    /// The PPP interface lost its IPv4 address.
    PppLostIp,
    /// The modem reported an error condition.
    ModemError {
        /// Vendor status code describing the error.
        status: DriverStatus,
    },

    // Provisioning
    /// The provisioning manager initialized.
    ProvInit,
    /// The provisioning manager deinitialized.
    ProvDeinit,
    /// A provisioning session started.
    ProvStarted,
    /// A provisioning session ended.
    ProvEnded,
    /// Wi-Fi credentials were received over provisioning.
    ProvCredentialsReceived {
        /// SSID bytes received.
        ssid: Vec<u8>,
        /// Passphrase bytes received.
        password: Vec<u8>,
    },
    /// Applying received credentials failed.
    ProvCredentialsFailed {
        /// Vendor failure reason code.
        reason: u8,
    },
    /// Applying received credentials succeeded.
    ProvCredentialsSuccess,

    // Smart-config
    /// Smart-config finished scanning.
    ScScanDone,
    /// Smart-config locked onto the sender's channel.
    ScFoundChannel,
    /// Smart-config decoded credentials.
    ScGotCredentials {
        /// SSID bytes received.
        ssid: Vec<u8>,
        /// Passphrase bytes received.
        password: Vec<u8>,
        /// Target BSSID, when the sender pinned one.
        bssid: [u8; 6],
    },
    /// Smart-config acknowledged the sender.
    ScAckSent,
}

/// Fieldless discriminant of [`NetEvent`], used for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetEventKind {
    /// See [`NetEvent::Ready`].
    Ready,
    /// See [`NetEvent::ScanDone`].
    ScanDone,
    /// See [`NetEvent::StationStarted`].
    StationStarted,
    /// See [`NetEvent::StationStopped`].
    StationStopped,
    /// See [`NetEvent::StationConnected`].
    StationConnected,
    /// See [`NetEvent::StationDisconnected`].
    StationDisconnected,
    /// See [`NetEvent::StationAuthModeChanged`].
    StationAuthModeChanged,
    /// See [`NetEvent::GotIpv4`].
    GotIpv4,
    /// See [`NetEvent::GotIpv6`].
    GotIpv6,
    /// See [`NetEvent::LostIp`].
    LostIp,
    /// See [`NetEvent::ApStarted`].
    ApStarted,
    /// See [`NetEvent::ApStopped`].
    ApStopped,
    /// See [`NetEvent::ApStationJoined`].
    ApStationJoined,
    /// See [`NetEvent::ApStationLeft`].
    ApStationLeft,
    /// See [`NetEvent::ApProbeRequest`].
    ApProbeRequest,
    /// See [`NetEvent::ApIpAssigned`].
    ApIpAssigned,
    /// See [`NetEvent::EthStarted`].
    EthStarted,
    /// See [`NetEvent::EthStopped`].
    EthStopped,
    /// See [`NetEvent::EthConnected`].
    EthConnected,
    /// See [`NetEvent::EthDisconnected`].
    EthDisconnected,
    /// See [`NetEvent::EthGotIpv4`].
    EthGotIpv4,
    /// See [`NetEvent::EthGotIpv6`].
    EthGotIpv6,
    /// See [`NetEvent::EthLostIp`].
    EthLostIp,
    /// See [`NetEvent::PppStarted`].
    PppStarted,
    /// See [`NetEvent::PppStopped`].
    PppStopped,
    /// See [`NetEvent::PppConnected`].
    PppConnected,
    /// See [`NetEvent::PppDisconnected`].
    PppDisconnected,
    /// See [`NetEvent::PppGotIpv4`].
    PppGotIpv4,
    /// See [`NetEvent::PppLostIp`].
    PppLostIp,
    /// See [`NetEvent::ModemError`].
    ModemError,
    /// See [`NetEvent::ProvInit`].
    ProvInit,
    /// See [`NetEvent::ProvDeinit`].
    ProvDeinit,
    /// See [`NetEvent::ProvStarted`].
    ProvStarted,
    /// See [`NetEvent::ProvEnded`].
    ProvEnded,
    /// See [`NetEvent::ProvCredentialsReceived`].
    ProvCredentialsReceived,
    /// See [`NetEvent::ProvCredentialsFailed`].
    ProvCredentialsFailed,
    /// See [`NetEvent::ProvCredentialsSuccess`].
    ProvCredentialsSuccess,
    /// See [`NetEvent::ScScanDone`].
    ScScanDone,
    /// See [`NetEvent::ScFoundChannel`].
    ScFoundChannel,
    /// See [`NetEvent::ScGotCredentials`].
    ScGotCredentials,
    /// See [`NetEvent::ScAckSent`].
    ScAckSent,
}

impl NetEvent {
    /// Get the fieldless kind of this event
    pub fn kind(&self) -> NetEventKind {
        match self {
            NetEvent::Ready => NetEventKind::Ready,
            NetEvent::ScanDone { .. } => NetEventKind::ScanDone,
            NetEvent::StationStarted => NetEventKind::StationStarted,
            NetEvent::StationStopped => NetEventKind::StationStopped,
            NetEvent::StationConnected { .. } => NetEventKind::StationConnected,
            NetEvent::StationDisconnected { .. } => NetEventKind::StationDisconnected,
            NetEvent::StationAuthModeChanged { .. } => NetEventKind::StationAuthModeChanged,
            NetEvent::GotIpv4 { .. } => NetEventKind::GotIpv4,
            NetEvent::GotIpv6 { .. } => NetEventKind::GotIpv6,
            NetEvent::LostIp => NetEventKind::LostIp,
            NetEvent::ApStarted => NetEventKind::ApStarted,
            NetEvent::ApStopped => NetEventKind::ApStopped,
            NetEvent::ApStationJoined { .. } => NetEventKind::ApStationJoined,
            NetEvent::ApStationLeft { .. } => NetEventKind::ApStationLeft,
            NetEvent::ApProbeRequest { .. } => NetEventKind::ApProbeRequest,
            NetEvent::ApIpAssigned { .. } => NetEventKind::ApIpAssigned,
            NetEvent::EthStarted => NetEventKind::EthStarted,
            NetEvent::EthStopped => NetEventKind::EthStopped,
            NetEvent::EthConnected => NetEventKind::EthConnected,
            NetEvent::EthDisconnected => NetEventKind::EthDisconnected,
            NetEvent::EthGotIpv4 { .. } => NetEventKind::EthGotIpv4,
            NetEvent::EthGotIpv6 { .. } => NetEventKind::EthGotIpv6,
            NetEvent::EthLostIp => NetEventKind::EthLostIp,
            NetEvent::PppStarted => NetEventKind::PppStarted,
            NetEvent::PppStopped => NetEventKind::PppStopped,
            NetEvent::PppConnected => NetEventKind::PppConnected,
            NetEvent::PppDisconnected => NetEventKind::PppDisconnected,
            NetEvent::PppGotIpv4 { .. } => NetEventKind::PppGotIpv4,
            NetEvent::PppLostIp => NetEventKind::PppLostIp,
            NetEvent::ModemError { .. } => NetEventKind::ModemError,
            NetEvent::ProvInit => NetEventKind::ProvInit,
            NetEvent::ProvDeinit => NetEventKind::ProvDeinit,
            NetEvent::ProvStarted => NetEventKind::ProvStarted,
            NetEvent::ProvEnded => NetEventKind::ProvEnded,
            NetEvent::ProvCredentialsReceived { .. } => NetEventKind::ProvCredentialsReceived,
            NetEvent::ProvCredentialsFailed { .. } => NetEventKind::ProvCredentialsFailed,
            NetEvent::ProvCredentialsSuccess => NetEventKind::ProvCredentialsSuccess,
            NetEvent::ScScanDone => NetEventKind::ScScanDone,
            NetEvent::ScFoundChannel => NetEventKind::ScFoundChannel,
            NetEvent::ScGotCredentials { .. } => NetEventKind::ScGotCredentials,
            NetEvent::ScAckSent => NetEventKind::ScAckSent,
        }
    }

    /// Get the logical interface this event belongs to, if any.
    ///
    /// Provisioning and smart-config events have no owning interface.
    pub fn interface(&self) -> Option<InterfaceKind> {
        use NetEventKind::*;
        match self.kind() {
            Ready | ScanDone | StationStarted | StationStopped | StationConnected
            | StationDisconnected | StationAuthModeChanged | GotIpv4 | GotIpv6 | LostIp => {
                Some(InterfaceKind::Station)
            }
            ApStarted | ApStopped | ApStationJoined | ApStationLeft | ApProbeRequest
            | ApIpAssigned => Some(InterfaceKind::AccessPoint),
            EthStarted | EthStopped | EthConnected | EthDisconnected | EthGotIpv4 | EthGotIpv6
            | EthLostIp => Some(InterfaceKind::Ethernet),
            PppStarted | PppStopped | PppConnected | PppDisconnected | PppGotIpv4 | PppLostIp
            | ModemError => Some(InterfaceKind::Ppp),
            _ => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn describe(&self) -> String {
        match self {
            NetEvent::Ready => "WiFi ready".to_string(),
            NetEvent::ScanDone { number, .. } => format!("Scan done: {} results", number),
            NetEvent::StationStarted => "STA started".to_string(),
            NetEvent::StationStopped => "STA stopped".to_string(),
            NetEvent::StationConnected { ssid, channel, .. } => {
                format!(
                    "STA connected to {} (ch {})",
                    String::from_utf8_lossy(ssid),
                    channel
                )
            }
            NetEvent::StationDisconnected { ssid, reason, .. } => {
                format!(
                    "STA disconnected from {}: {} ({})",
                    String::from_utf8_lossy(ssid),
                    reason,
                    reason_name(*reason)
                )
            }
            NetEvent::StationAuthModeChanged { old_mode, new_mode } => {
                format!("STA auth mode: {} -> {}", old_mode, new_mode)
            }
            NetEvent::GotIpv4 { ip, .. } => format!("STA got IP: {}", ip),
            NetEvent::GotIpv6 { addr, .. } => format!("STA got IPv6: {}", addr),
            NetEvent::LostIp => "STA lost IP".to_string(),
            NetEvent::ApStarted => "AP started".to_string(),
            NetEvent::ApStopped => "AP stopped".to_string(),
            NetEvent::ApStationJoined { mac, aid } => {
                format!("AP client joined: {} (aid {})", format_mac(mac), aid)
            }
            NetEvent::ApStationLeft { mac, aid } => {
                format!("AP client left: {} (aid {})", format_mac(mac), aid)
            }
            NetEvent::ApProbeRequest { rssi, mac } => {
                format!("AP probe from {} ({} dBm)", format_mac(mac), rssi)
            }
            NetEvent::ApIpAssigned { mac, ip } => {
                format!("AP assigned {} to {}", ip, format_mac(mac))
            }
            NetEvent::EthStarted => "ETH started".to_string(),
            NetEvent::EthStopped => "ETH stopped".to_string(),
            NetEvent::EthConnected => "ETH link up".to_string(),
            NetEvent::EthDisconnected => "ETH link down".to_string(),
            NetEvent::EthGotIpv4 { ip, .. } => format!("ETH got IP: {}", ip),
            NetEvent::EthGotIpv6 { addr, .. } => format!("ETH got IPv6: {}", addr),
            NetEvent::EthLostIp => "ETH lost IP".to_string(),
            NetEvent::PppStarted => "PPP started".to_string(),
            NetEvent::PppStopped => "PPP stopped".to_string(),
            NetEvent::PppConnected => "PPP connected".to_string(),
            NetEvent::PppDisconnected => "PPP disconnected".to_string(),
            NetEvent::PppGotIpv4 { ip, .. } => format!("PPP got IP: {}", ip),
            NetEvent::PppLostIp => "PPP lost IP".to_string(),
            NetEvent::ModemError { status } => format!("Modem error: {}", status),
            NetEvent::ProvInit => "Provisioning initialized".to_string(),
            NetEvent::ProvDeinit => "Provisioning deinitialized".to_string(),
            NetEvent::ProvStarted => "Provisioning started".to_string(),
            NetEvent::ProvEnded => "Provisioning ended".to_string(),
            NetEvent::ProvCredentialsReceived { ssid, .. } => {
                format!("Provisioning credentials for {}", String::from_utf8_lossy(ssid))
            }
            NetEvent::ProvCredentialsFailed { reason } => {
                format!("Provisioning credentials failed: {}", reason)
            }
            NetEvent::ProvCredentialsSuccess => "Provisioning credentials applied".to_string(),
            NetEvent::ScScanDone => "SmartConfig scan done".to_string(),
            NetEvent::ScFoundChannel => "SmartConfig found channel".to_string(),
            NetEvent::ScGotCredentials { ssid, .. } => {
                format!("SmartConfig credentials for {}", String::from_utf8_lossy(ssid))
            }
            NetEvent::ScAckSent => "SmartConfig ack sent".to_string(),
        }
    }
}

impl std::fmt::Display for NetEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Format a MAC address as colon-separated hex
fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// Human-readable name for a vendor disconnect reason code.
///
/// Codes below 200 come from the 802.11 deauth/disassoc reason space;
/// 200 and up are driver-internal connection failures.
pub fn reason_name(reason: u8) -> &'static str {
    match reason {
        1 => "UNSPECIFIED",
        2 => "AUTH_EXPIRE",
        3 => "AUTH_LEAVE",
        4 => "ASSOC_EXPIRE",
        5 => "ASSOC_TOOMANY",
        6 => "NOT_AUTHED",
        7 => "NOT_ASSOCED",
        8 => "ASSOC_LEAVE",
        9 => "ASSOC_NOT_AUTHED",
        10 => "DISASSOC_PWRCAP_BAD",
        11 => "DISASSOC_SUPCHAN_BAD",
        13 => "IE_INVALID",
        14 => "MIC_FAILURE",
        15 => "4WAY_HANDSHAKE_TIMEOUT",
        16 => "GROUP_KEY_UPDATE_TIMEOUT",
        17 => "IE_IN_4WAY_DIFFERS",
        18 => "GROUP_CIPHER_INVALID",
        19 => "PAIRWISE_CIPHER_INVALID",
        20 => "AKMP_INVALID",
        21 => "UNSUPP_RSN_IE_VERSION",
        22 => "INVALID_RSN_IE_CAP",
        23 => "802_1X_AUTH_FAILED",
        24 => "CIPHER_SUITE_REJECTED",
        200 => "BEACON_TIMEOUT",
        201 => "NO_AP_FOUND",
        202 => "AUTH_FAIL",
        203 => "ASSOC_FAIL",
        204 => "HANDSHAKE_TIMEOUT",
        205 => "CONNECTION_FAIL",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        let event = NetEvent::ScanDone {
            status: 0,
            number: 3,
            scan_id: 1,
        };
        assert_eq!(event.kind(), NetEventKind::ScanDone);
        assert_eq!(NetEvent::LostIp.kind(), NetEventKind::LostIp);
    }

    #[test]
    fn test_event_interface() {
        assert_eq!(
            NetEvent::StationStarted.interface(),
            Some(InterfaceKind::Station)
        );
        assert_eq!(
            NetEvent::ApStarted.interface(),
            Some(InterfaceKind::AccessPoint)
        );
        assert_eq!(NetEvent::PppConnected.interface(), Some(InterfaceKind::Ppp));
        assert_eq!(
            NetEvent::EthConnected.interface(),
            Some(InterfaceKind::Ethernet)
        );
        assert_eq!(NetEvent::ProvStarted.interface(), None);
        assert_eq!(NetEvent::ScAckSent.interface(), None);
    }

    #[test]
    fn test_event_describe() {
        let event = NetEvent::StationDisconnected {
            ssid: b"testnet".to_vec(),
            bssid: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
            reason: 201,
        };
        let text = event.describe();
        assert!(text.contains("testnet"));
        assert!(text.contains("NO_AP_FOUND"));
    }

    #[test]
    fn test_event_serialization() {
        let event = NetEvent::GotIpv4 {
            changed: true,
            ip: Ipv4Addr::new(192, 168, 4, 2),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(192, 168, 4, 1),
        };
        let json = serde_json::to_string(&event).expect("Should serialize");
        let parsed: NetEvent = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_reason_names() {
        assert_eq!(reason_name(2), "AUTH_EXPIRE");
        assert_eq!(reason_name(200), "BEACON_TIMEOUT");
        assert_eq!(reason_name(255), "UNKNOWN");
    }
}
