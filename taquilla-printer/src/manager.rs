//! Connection manager
//!
//! Owns the one active channel and dispatches send/status calls over it.
//! The channel is a tagged union selected at connect time: a persistent
//! serial stream, or a chosen queue name (the queue handle itself is
//! reopened for every operation, so "connected" there just means a target
//! was picked and verified openable once).

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::discovery::{self, DiscoveryReport};
use crate::encoding::{EncodingPolicy, encode_ascii};
use crate::error::{PrintError, PrintResult};
use crate::serial::{self, SEND_STATUS_READ_CAP, STATUS_READ_CAP, SerialChannel};
use crate::spool::{Spooler, decode_job_status, decode_queue_status, platform_spooler};

/// Document name attached to every raw spool job
pub const DOC_NAME: &str = "Etiqueta EPL";

/// How many queued jobs to inspect when reporting the last job's outcome
const MAX_JOBS: u32 = 10;

/// Transport tuning knobs.
///
/// The defaults are the values the printers are known to work with; the
/// settle delay is a timing approximation (the device offers no completion
/// acknowledgment), not a protocol guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub encoding: EncodingPolicy,
}

fn default_baud_rate() -> u32 {
    9600
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_probe_timeout_ms() -> u64 {
    2000
}
fn default_settle_ms() -> u64 {
    500
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            connect_timeout_ms: default_connect_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            settle_ms: default_settle_ms(),
            encoding: EncodingPolicy::default(),
        }
    }
}

impl PrinterConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// The one active channel. A queue target and an open serial stream can
/// never coexist.
enum Channel {
    Disconnected,
    Serial(SerialChannel),
    Queue { name: String },
}

/// Discovers, connects to and drives one printer at a time.
pub struct PrinterManager {
    spooler: Box<dyn Spooler>,
    config: PrinterConfig,
    channel: Channel,
}

impl PrinterManager {
    /// Manager backed by the platform's print spooler.
    pub fn new() -> Self {
        Self::with_spooler(platform_spooler(), PrinterConfig::default())
    }

    pub fn with_config(config: PrinterConfig) -> Self {
        Self::with_spooler(platform_spooler(), config)
    }

    /// Manager with an explicit spooler implementation. This is the seam
    /// the tests drive with a fake.
    pub fn with_spooler(spooler: Box<dyn Spooler>, config: PrinterConfig) -> Self {
        Self {
            spooler,
            config,
            channel: Channel::Disconnected,
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self.channel, Channel::Disconnected)
    }

    /// The active target: a serial port path or a queue name.
    pub fn target(&self) -> Option<&str> {
        match &self.channel {
            Channel::Disconnected => None,
            Channel::Serial(channel) => Some(channel.path()),
            Channel::Queue { name } => Some(name),
        }
    }

    /// Enumerate candidate printers. Always re-scans the OS.
    pub fn discover(&self) -> DiscoveryReport {
        discovery::discover(self.spooler.as_ref())
    }

    /// Transiently open a port and check whether a printer answers there.
    pub fn probe(&self, port: &str, baud: u32) -> bool {
        serial::probe(
            port,
            baud,
            self.config.probe_timeout(),
            self.config.settle(),
        )
    }

    /// Open a serial connection.
    ///
    /// With no port given, serial candidates are probed in enumeration
    /// order and the first one that answers is used.
    #[instrument(skip(self))]
    pub fn connect_serial(&mut self, port: Option<&str>, baud: Option<u32>) -> PrintResult<()> {
        let baud = baud.unwrap_or(self.config.baud_rate);

        let path = match port {
            Some(p) => p.to_string(),
            None => {
                let report = self.discover();
                report
                    .serial_ports
                    .iter()
                    .find(|candidate| self.probe(&candidate.port, baud))
                    .map(|candidate| candidate.port.clone())
                    .ok_or_else(|| {
                        PrintError::NotFound("no serial printer answered a probe".to_string())
                    })?
            }
        };

        let channel = SerialChannel::open(&path, baud, self.config.connect_timeout())?;
        info!(port = %path, baud, "Serial printer connected");
        self.channel = Channel::Serial(channel);
        Ok(())
    }

    /// Select a print queue as the target.
    ///
    /// With no name given, the first discovered queue candidate is used,
    /// falling back to the first USB-subset candidate. The queue is opened
    /// once to verify it exists, then released; sends reopen it.
    #[instrument(skip(self))]
    pub fn connect_queue(&mut self, name: Option<&str>) -> PrintResult<()> {
        let name = match name {
            Some(n) => n.to_string(),
            None => {
                let report = self.discover();
                report
                    .queue_printers
                    .first()
                    .or_else(|| report.usb_printers.first())
                    .map(|candidate| candidate.name.clone())
                    .ok_or_else(|| {
                        PrintError::NotFound("no matching print queue found".to_string())
                    })?
            }
        };

        self.spooler.open(&name)?;
        info!(queue = %name, "Print queue selected");
        self.channel = Channel::Queue { name };
        Ok(())
    }

    /// Send a rendered command through the active channel.
    ///
    /// Success reflects only that the write completed; the post-send status
    /// poll is logged diagnostics and never fails the call.
    #[instrument(skip(self, command), fields(bytes = command.len()))]
    pub fn send(&mut self, command: &str) -> PrintResult<()> {
        match &self.channel {
            Channel::Queue { name } => {
                let name = name.clone();
                self.send_queue(&name, command)
            }
            Channel::Serial(_) => self.send_serial(command),
            Channel::Disconnected => {
                error!("Send with no active connection");
                Err(PrintError::NotConnected)
            }
        }
    }

    fn send_queue(&self, name: &str, command: &str) -> PrintResult<()> {
        let payload = encode_ascii(command, self.config.encoding)?;

        let mut handle = self.spooler.open(name)?;
        handle.start_raw_job(DOC_NAME)?;
        handle.write(&payload)?;
        handle.end_job()?;
        drop(handle);

        info!(queue = %name, bytes = payload.len(), "Raw job submitted");

        // Give the spooler a moment to hand the job to the device, then
        // log queue and job state. Purely diagnostic.
        thread::sleep(self.config.settle());

        match self.spooler.open(name).and_then(|h| h.details()) {
            Ok(details) => {
                info!(queue = %name, status = %decode_queue_status(details.status), "Queue status after send")
            }
            Err(e) => warn!(queue = %name, error = %e, "Queue status unavailable after send"),
        }

        if let Some(outcome) = self.last_job_status() {
            info!(queue = %name, outcome = %outcome, "Last job");
        }

        Ok(())
    }

    fn send_serial(&mut self, command: &str) -> PrintResult<()> {
        let settle = self.config.settle();
        let policy = self.config.encoding;

        let Channel::Serial(channel) = &mut self.channel else {
            return Err(PrintError::NotConnected);
        };

        let mut text = command.to_string();
        if !text.ends_with('\n') {
            text.push_str("\r\n");
        }
        let payload = encode_ascii(&text, policy)?;

        info!(port = %channel.path(), bytes = payload.len(), "Sending command over serial");
        channel.send(&payload)?;

        thread::sleep(settle);

        match channel.poll_status(settle, SEND_STATUS_READ_CAP) {
            Some(reply) => info!(reply = %hex::encode(&reply), "Serial status reply"),
            None => warn!("No serial status reply"),
        }

        Ok(())
    }

    /// Readable status of the active channel.
    pub fn status(&mut self) -> String {
        let settle = self.config.settle();

        match &mut self.channel {
            Channel::Disconnected => "not connected".to_string(),
            Channel::Queue { name } => {
                let name = name.clone();
                match self.spooler.open(&name).and_then(|h| h.details()) {
                    Ok(details) => decode_queue_status(details.status),
                    Err(e) => format!("status unavailable: {}", e),
                }
            }
            Channel::Serial(channel) => match channel.poll_status(settle, STATUS_READ_CAP) {
                Some(reply) => format!("status response: {}", hex::encode(reply)),
                None => "no response".to_string(),
            },
        }
    }

    /// Outcome of the most recent job on the target queue.
    ///
    /// `None` when no queue is active or the spooler cannot be queried;
    /// enumeration errors are logged, never raised.
    pub fn last_job_status(&self) -> Option<String> {
        let Channel::Queue { name } = &self.channel else {
            return None;
        };

        let jobs = match self.spooler.open(name).and_then(|h| h.jobs(MAX_JOBS)) {
            Ok(jobs) => jobs,
            Err(e) => {
                error!(queue = %name, error = %e, "Job enumeration failed");
                return None;
            }
        };

        let Some(last) = jobs.last() else {
            return Some("no jobs in the queue".to_string());
        };

        if last.status == 0 {
            Some(format!("job '{}' completed without errors", last.document))
        } else {
            Some(format!(
                "job '{}' ended with: {}",
                last.document,
                decode_job_status(last.status)
            ))
        }
    }

    /// Drop the active channel. Serial ports close here; queue targets are
    /// simply forgotten.
    pub fn disconnect(&mut self) {
        match std::mem::replace(&mut self.channel, Channel::Disconnected) {
            Channel::Serial(channel) => info!(port = %channel.path(), "Serial connection closed"),
            Channel::Queue { name } => info!(queue = %name, "Print queue released"),
            Channel::Disconnected => {}
        }
    }
}

impl Default for PrinterManager {
    fn default() -> Self {
        Self::new()
    }
}
