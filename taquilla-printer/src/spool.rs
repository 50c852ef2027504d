//! OS print-queue capability interface
//!
//! The manager never talks to the OS spooler directly; it goes through the
//! [`Spooler`] / [`SpoolHandle`] traits so the core logic stays portable and
//! testable with a fake. The real Windows adapter lives in `spool_win`;
//! every other platform gets [`UnsupportedSpooler`].

use crate::error::{PrintError, PrintResult};

/// Resolved queue attributes, read after opening the queue.
#[derive(Debug, Clone)]
pub struct QueueDetails {
    pub port_name: String,
    pub driver_name: String,
    /// Raw spooler status flag word (see the `QUEUE_STATUS_*` constants)
    pub status: u32,
}

/// One entry from the queue's job list.
#[derive(Debug, Clone)]
pub struct JobInfo {
    pub id: u32,
    pub document: String,
    /// Raw job status flag word (see the `JOB_STATUS_*` constants)
    pub status: u32,
}

/// Access to the OS print-queue subsystem.
pub trait Spooler {
    /// Names of all registered queues (local and connected)
    fn enumerate(&self) -> PrintResult<Vec<String>>;

    /// Open a queue by name
    fn open(&self, name: &str) -> PrintResult<Box<dyn SpoolHandle>>;
}

/// An open queue. The underlying OS handle is released on drop.
pub trait SpoolHandle {
    /// Port name, driver name and status flags of the queue
    fn details(&self) -> PrintResult<QueueDetails>;

    /// Begin a raw-datatype print job with the given document name
    fn start_raw_job(&mut self, doc_name: &str) -> PrintResult<()>;

    /// Write the full payload into the current job
    fn write(&mut self, data: &[u8]) -> PrintResult<()>;

    /// End the current job
    fn end_job(&mut self) -> PrintResult<()>;

    /// Enumerate up to `max` queued jobs at the least-detailed info level
    fn jobs(&self, max: u32) -> PrintResult<Vec<JobInfo>>;
}

// Winspool flag words pass through the capability interface undecoded, so
// the bit values are pinned here rather than in the Windows adapter.
pub const QUEUE_STATUS_PAUSED: u32 = 0x0000_0001;
pub const QUEUE_STATUS_ERROR: u32 = 0x0000_0002;
pub const QUEUE_STATUS_PENDING_DELETION: u32 = 0x0000_0004;
pub const QUEUE_STATUS_PAPER_JAM: u32 = 0x0000_0008;
pub const QUEUE_STATUS_PAPER_OUT: u32 = 0x0000_0010;
pub const QUEUE_STATUS_OFFLINE: u32 = 0x0000_0080;

pub const JOB_STATUS_ERROR: u32 = 0x0000_0002;
pub const JOB_STATUS_OFFLINE: u32 = 0x0000_0020;
pub const JOB_STATUS_PAPER_OUT: u32 = 0x0000_0040;
pub const JOB_STATUS_BLOCKED: u32 = 0x0000_0200;

/// Decode a queue status flag word into a readable report.
///
/// A zero flag word means the queue is ready.
pub fn decode_queue_status(flags: u32) -> String {
    if flags == 0 {
        return "ready".to_string();
    }

    let mut parts = Vec::new();
    if flags & QUEUE_STATUS_PAUSED != 0 {
        parts.push("paused");
    }
    if flags & QUEUE_STATUS_ERROR != 0 {
        parts.push("error");
    }
    if flags & QUEUE_STATUS_PENDING_DELETION != 0 {
        parts.push("pending deletion");
    }
    if flags & QUEUE_STATUS_PAPER_JAM != 0 {
        parts.push("paper jam");
    }
    if flags & QUEUE_STATUS_PAPER_OUT != 0 {
        parts.push("paper out");
    }
    if flags & QUEUE_STATUS_OFFLINE != 0 {
        parts.push("offline");
    }
    if parts.is_empty() {
        // Unmapped bits still indicate a non-ready queue
        return format!("status 0x{:x}", flags);
    }
    parts.join(", ")
}

/// Decode a non-zero job status flag word.
pub fn decode_job_status(flags: u32) -> String {
    let mut parts = Vec::new();
    if flags & JOB_STATUS_BLOCKED != 0 {
        parts.push("blocked");
    }
    if flags & JOB_STATUS_ERROR != 0 {
        parts.push("job error");
    }
    if flags & JOB_STATUS_PAPER_OUT != 0 {
        parts.push("paper out");
    }
    if flags & JOB_STATUS_OFFLINE != 0 {
        parts.push("offline");
    }
    if parts.is_empty() {
        return format!("status 0x{:x}", flags);
    }
    parts.join(", ")
}

/// Spooler stub for platforms without an OS print-queue binding.
///
/// Every operation reports [`PrintError::UnsupportedPlatform`], which the
/// caller's boundary is expected to surface distinctly from generic
/// transmission failures.
pub struct UnsupportedSpooler;

impl Spooler for UnsupportedSpooler {
    fn enumerate(&self) -> PrintResult<Vec<String>> {
        Err(PrintError::UnsupportedPlatform)
    }

    fn open(&self, _name: &str) -> PrintResult<Box<dyn SpoolHandle>> {
        Err(PrintError::UnsupportedPlatform)
    }
}

/// The spooler implementation for the current platform.
pub fn platform_spooler() -> Box<dyn Spooler> {
    #[cfg(windows)]
    {
        Box::new(crate::spool_win::WinSpooler)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedSpooler)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_queue_status_is_ready() {
        assert_eq!(decode_queue_status(0), "ready");
    }

    #[test]
    fn queue_status_joins_active_flags() {
        let report = decode_queue_status(QUEUE_STATUS_PAPER_OUT | QUEUE_STATUS_OFFLINE);
        assert!(report.contains("paper out"));
        assert!(report.contains("offline"));
        assert!(!report.contains("paused"));
    }

    #[test]
    fn job_status_decodes_fixed_set() {
        let report = decode_job_status(JOB_STATUS_BLOCKED | JOB_STATUS_ERROR);
        assert!(report.contains("blocked"));
        assert!(report.contains("job error"));
    }

    #[test]
    fn unmapped_bits_fall_back_to_hex() {
        assert_eq!(decode_queue_status(0x4000), "status 0x4000");
    }
}
