//! Host-side serial DTE helpers.
//!
//! Provides UART enumeration and opening for integrations that drive a
//! real modem over a host serial port, plus the pure mapping from the
//! session's flow-control setting to the serialport types.

use std::time::Duration;

use netifkit_core::error::{Error, Result};

/// Serial flow-control setting for the DTE side of a modem session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FlowControl {
    /// No flow control.
    #[default]
    None,
    /// RTS/CTS hardware flow control.
    Hardware,
    /// XON/XOFF software flow control.
    Software,
}

/// Convert a flow-control setting to serialport format
pub(crate) fn to_serialport_flow_control(fc: FlowControl) -> serialport::FlowControl {
    match fc {
        FlowControl::None => serialport::FlowControl::None,
        FlowControl::Hardware => serialport::FlowControl::Hardware,
        FlowControl::Software => serialport::FlowControl::Software,
    }
}

/// Information about an available UART device
#[derive(Debug, Clone)]
pub struct UartInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl UartInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }
}

/// List UART devices a modem could plausibly be attached to
///
/// Filters enumerated ports to common modem/USB-serial patterns:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*, /dev/ttyS*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn available_uarts() -> Result<Vec<UartInfo>> {
    match serialport::available_ports() {
        Ok(ports) => {
            let infos: Vec<UartInfo> = ports
                .iter()
                .filter(|port| is_modem_port(&port.port_name))
                .map(|port| {
                    let mut info = UartInfo::new(&port.port_name, port_description(port));
                    if let serialport::SerialPortType::UsbPort(usb) = &port.port_type {
                        info.vid = Some(usb.vid);
                        info.pid = Some(usb.pid);
                        info.manufacturer = usb.manufacturer.clone();
                        info.serial_number = usb.serial_number.clone();
                    }
                    info
                })
                .collect();
            Ok(infos)
        }
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(Error::other(format!("Failed to enumerate ports: {}", e)))
        }
    }
}

/// Check if a port name matches modem/USB-serial patterns
fn is_modem_port(port_name: &str) -> bool {
    if port_name.starts_with("COM") && port_name[3..].chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    if port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/ttyS")
    {
        return true;
    }

    if port_name.starts_with("/dev/cu.usbserial-") || port_name.starts_with("/dev/cu.usbmodem") {
        return true;
    }

    false
}

/// Get a user-friendly description for a port
fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb) => {
            format!(
                "USB {} {}",
                usb.manufacturer.as_deref().unwrap_or("Device"),
                usb.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Host-side DTE configuration: the UART the modem is wired to.
#[derive(Debug, Clone)]
pub struct DteConfig {
    /// UART device path (e.g., "/dev/ttyUSB2")
    pub device: String,
    /// Baud rate
    pub baud: u32,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Flow-control setting
    pub flow_control: FlowControl,
}

impl Default for DteConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud: 115_200,
            data_bits: 8,
            stop_bits: 1,
            flow_control: FlowControl::None,
        }
    }
}

impl DteConfig {
    /// Open the configured UART
    pub fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        let builder = serialport::new(&self.device, self.baud)
            .timeout(Duration::from_millis(10))
            .data_bits(match self.data_bits {
                5 => serialport::DataBits::Five,
                6 => serialport::DataBits::Six,
                7 => serialport::DataBits::Seven,
                8 => serialport::DataBits::Eight,
                _ => {
                    return Err(Error::other(format!(
                        "Invalid data bits: {}",
                        self.data_bits
                    )))
                }
            })
            .stop_bits(match self.stop_bits {
                1 => serialport::StopBits::One,
                2 => serialport::StopBits::Two,
                _ => {
                    return Err(Error::other(format!(
                        "Invalid stop bits: {}",
                        self.stop_bits
                    )))
                }
            })
            .flow_control(to_serialport_flow_control(self.flow_control));

        match builder.open() {
            Ok(port) => Ok(port),
            Err(e) => {
                tracing::warn!("Failed to open UART {}: {}", self.device, e);
                Err(Error::other(format!(
                    "Failed to open UART {}: {}",
                    self.device, e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_control_mapping() {
        assert_eq!(
            to_serialport_flow_control(FlowControl::None),
            serialport::FlowControl::None
        );
        assert_eq!(
            to_serialport_flow_control(FlowControl::Hardware),
            serialport::FlowControl::Hardware
        );
        assert_eq!(
            to_serialport_flow_control(FlowControl::Software),
            serialport::FlowControl::Software
        );
    }

    #[test]
    fn test_modem_port_patterns() {
        assert!(is_modem_port("COM3"));
        assert!(is_modem_port("/dev/ttyUSB2"));
        assert!(is_modem_port("/dev/ttyACM0"));
        assert!(is_modem_port("/dev/cu.usbmodem14201"));
        assert!(!is_modem_port("COMX"));
        assert!(!is_modem_port("/dev/video0"));
    }

    #[test]
    fn test_dte_config_rejects_bad_layout() {
        let config = DteConfig {
            data_bits: 9,
            ..Default::default()
        };
        assert!(config.open().is_err());

        let config = DteConfig {
            stop_bits: 3,
            ..Default::default()
        };
        assert!(config.open().is_err());
    }
}
