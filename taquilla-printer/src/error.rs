//! Error types for the printer transport crate

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// No matching device or queue was discovered
    #[error("No printer found: {0}")]
    NotFound(String),

    /// OS-level open error (device busy, missing, access denied)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Write or print-job error after a channel was established
    #[error("Transmission failed: {0}")]
    Transmission(String),

    /// Payload contains characters outside the printer's ASCII encoding
    /// and the strict policy is active
    #[error("Payload is not ASCII-encodable: {0}")]
    Encoding(String),

    /// A send or status call was made with no active channel
    #[error("Not connected to any printer")]
    NotConnected,

    /// The OS print-queue capability is unavailable on this platform
    #[error("Print spooler is not available on this platform")]
    UnsupportedPlatform,

    /// IO error on the serial channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
