//! # taquilla-printer
//!
//! Discovery and transport for Godex-class label/ticket printers.
//!
//! ## Scope
//!
//! This crate handles HOW bytes reach the printer:
//! - Serial and OS-print-queue discovery (keyword-filtered)
//! - Serial transport (9600 8-N-1, STX status polls)
//! - Raw spool jobs through a swappable OS capability trait
//! - Queue and job status decoding
//!
//! Ticket content (WHAT to print) lives in `taquilla-tickets`; the two
//! crates are independent and meet at [`PrinterManager::send`], which takes
//! plain command text.
//!
//! ## Example
//!
//! ```ignore
//! use taquilla_printer::PrinterManager;
//!
//! let mut manager = PrinterManager::new();
//! manager.connect_queue(None)?;      // first Godex/BP500 queue
//! manager.send(&command)?;           // rendered EPL/TSPL text
//! println!("{}", manager.status());
//! manager.disconnect();
//! ```

mod discovery;
mod encoding;
mod error;
mod manager;
mod serial;
mod spool;

#[cfg(windows)]
mod spool_win;

// Re-exports
pub use discovery::{DiscoveryReport, QueueCandidate, SerialCandidate, discover};
pub use encoding::{EncodingPolicy, encode_ascii};
pub use error::{PrintError, PrintResult};
pub use manager::{DOC_NAME, PrinterConfig, PrinterManager};
pub use serial::{STATUS_REQUEST, SerialChannel, probe};
pub use spool::{
    JobInfo, QueueDetails, SpoolHandle, Spooler, UnsupportedSpooler, decode_job_status,
    decode_queue_status, platform_spooler,
};
