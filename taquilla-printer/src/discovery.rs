//! Printer discovery
//!
//! Re-enumerates serial ports and OS print queues on every call; nothing is
//! cached. Enumeration failures degrade the report (empty lists, unknown
//! fields) instead of aborting it.

use serde::Serialize;
use serialport::SerialPortType;
use tracing::{info, instrument, warn};

use crate::spool::Spooler;

/// Keywords a serial port description must contain (case-insensitive)
/// to qualify as a printer candidate. Godex units enumerate either under
/// their own name or under the USB-to-serial bridge chip they ship with.
const SERIAL_KEYWORDS: [&str; 5] = ["godex", "usb serial", "usb-serial", "prolific", "ftdi"];

/// Keywords a print-queue name must contain (case-insensitive)
const QUEUE_KEYWORDS: [&str; 3] = ["godex", "bp500", "bp-500"];

/// A serial port that looks like a printer.
#[derive(Debug, Clone, Serialize)]
pub struct SerialCandidate {
    pub port: String,
    pub description: String,
    pub hwid: String,
}

/// An OS print queue whose name matches a known vendor or model keyword.
///
/// Port and driver are resolved by opening the queue; when the open fails
/// the queue is still reported with both left unknown.
#[derive(Debug, Clone, Serialize)]
pub struct QueueCandidate {
    pub name: String,
    pub port: Option<String>,
    pub driver: Option<String>,
    /// Raw spooler status flag word observed at discovery time
    pub status: u32,
}

/// Result of one discovery pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub serial_ports: Vec<SerialCandidate>,
    pub queue_printers: Vec<QueueCandidate>,
    /// Queue candidates whose resolved port name contains "usb"
    pub usb_printers: Vec<QueueCandidate>,
}

pub(crate) fn description_matches(description: &str) -> bool {
    let lower = description.to_lowercase();
    SERIAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub(crate) fn queue_name_matches(name: &str) -> bool {
    let lower = name.to_lowercase();
    QUEUE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn describe_port_type(port_type: &SerialPortType) -> (String, String) {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let description = match (&usb.manufacturer, &usb.product) {
                (Some(m), Some(p)) => format!("{} {}", m, p),
                (None, Some(p)) => p.clone(),
                (Some(m), None) => m.clone(),
                (None, None) => "USB serial device".to_string(),
            };
            let hwid = format!("USB VID:PID={:04x}:{:04x}", usb.vid, usb.pid);
            (description, hwid)
        }
        SerialPortType::PciPort => ("PCI serial port".to_string(), String::new()),
        SerialPortType::BluetoothPort => ("Bluetooth serial port".to_string(), String::new()),
        SerialPortType::Unknown => ("Unknown serial device".to_string(), String::new()),
    }
}

/// Enumerate candidate printers over both transports.
#[instrument(skip(spooler))]
pub fn discover(spooler: &dyn Spooler) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    // Serial side
    match serialport::available_ports() {
        Ok(ports) => {
            for port in ports {
                let (description, hwid) = describe_port_type(&port.port_type);
                info!(port = %port.port_name, description = %description, "Serial port found");
                if description_matches(&description) {
                    report.serial_ports.push(SerialCandidate {
                        port: port.port_name,
                        description,
                        hwid,
                    });
                }
            }
        }
        Err(e) => warn!(error = %e, "Serial port enumeration failed"),
    }

    // Queue side
    match spooler.enumerate() {
        Ok(names) => {
            for name in names {
                if !queue_name_matches(&name) {
                    continue;
                }
                let candidate = match spooler.open(&name).and_then(|h| h.details()) {
                    Ok(details) => QueueCandidate {
                        name: name.clone(),
                        port: Some(details.port_name),
                        driver: Some(details.driver_name),
                        status: details.status,
                    },
                    Err(e) => {
                        warn!(queue = %name, error = %e, "Could not read queue details");
                        QueueCandidate {
                            name: name.clone(),
                            port: None,
                            driver: None,
                            status: 0,
                        }
                    }
                };

                if candidate
                    .port
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains("usb"))
                {
                    report.usb_printers.push(candidate.clone());
                }
                info!(queue = %name, port = ?candidate.port, "Print queue found");
                report.queue_printers.push(candidate);
            }
        }
        Err(e) => warn!(error = %e, "Print queue enumeration failed"),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::fake::{FakeQueue, FakeSpooler};

    #[test]
    fn serial_keywords_match_case_insensitively() {
        assert!(description_matches("GODEX label printer"));
        assert!(description_matches("Prolific USB-Serial Controller"));
        assert!(description_matches("FTDI FT232R USB UART"));
        assert!(description_matches("generic usb serial adapter"));
        assert!(!description_matches("Intel Management Engine"));
    }

    #[test]
    fn queue_keywords_match_model_codes() {
        assert!(queue_name_matches("Godex G500"));
        assert!(queue_name_matches("BP500L Label"));
        assert!(queue_name_matches("bp-500 office"));
        assert!(!queue_name_matches("HP LaserJet"));
    }

    #[test]
    fn matching_queues_are_reported_with_details() {
        let spooler = FakeSpooler::with_queues(vec![
            FakeQueue::new("Godex BP500", "USB001"),
            FakeQueue::new("HP LaserJet", "LPT1:"),
        ]);

        let report = discover(&spooler);

        assert_eq!(report.queue_printers.len(), 1);
        let candidate = &report.queue_printers[0];
        assert_eq!(candidate.name, "Godex BP500");
        assert_eq!(candidate.port.as_deref(), Some("USB001"));
        assert_eq!(candidate.driver.as_deref(), Some("Godex BP500L"));
    }

    #[test]
    fn usb_ports_land_in_the_usb_subset() {
        let spooler = FakeSpooler::with_queues(vec![
            FakeQueue::new("Godex BP500", "USB001"),
            FakeQueue::new("Godex serial", "COM3"),
        ]);

        let report = discover(&spooler);

        assert_eq!(report.queue_printers.len(), 2);
        assert_eq!(report.usb_printers.len(), 1);
        assert_eq!(report.usb_printers[0].name, "Godex BP500");
    }

    #[test]
    fn open_failure_still_reports_the_queue() {
        let mut queue = FakeQueue::new("Godex BP500", "USB001");
        queue.fail_open = true;
        let spooler = FakeSpooler::with_queues(vec![queue]);

        let report = discover(&spooler);

        assert_eq!(report.queue_printers.len(), 1);
        assert!(report.queue_printers[0].port.is_none());
        assert!(report.queue_printers[0].driver.is_none());
        assert!(report.usb_printers.is_empty());
    }

    #[test]
    fn spooler_failure_degrades_to_empty_lists() {
        let report = discover(&crate::spool::UnsupportedSpooler);
        assert!(report.queue_printers.is_empty());
        assert!(report.usb_printers.is_empty());
    }
}
