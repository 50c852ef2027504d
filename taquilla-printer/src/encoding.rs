//! ASCII payload encoding
//!
//! The printer command interpreter only accepts ASCII. Rendered commands
//! arrive as UTF-8 strings; this module turns them into wire bytes under a
//! single, explicit policy that applies to both transports.

use serde::{Deserialize, Serialize};

use crate::error::{PrintError, PrintResult};

/// What to do with characters the printer's ASCII encoding cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingPolicy {
    /// Drop non-ASCII bytes from the payload
    #[default]
    Lossy,
    /// Fail the operation before any bytes are written
    Strict,
}

/// Encode a command string as ASCII bytes under the given policy.
pub fn encode_ascii(text: &str, policy: EncodingPolicy) -> PrintResult<Vec<u8>> {
    if text.is_ascii() {
        return Ok(text.as_bytes().to_vec());
    }

    match policy {
        EncodingPolicy::Strict => {
            let bad = text.chars().find(|c| !c.is_ascii()).unwrap_or('?');
            Err(PrintError::Encoding(format!(
                "character {:?} cannot be sent to the printer",
                bad
            )))
        }
        EncodingPolicy::Lossy => Ok(text.bytes().filter(u8::is_ascii).collect()),
    }
}
