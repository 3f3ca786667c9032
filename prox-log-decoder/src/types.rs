//! Core types for the card log decoder library
//!
//! This module defines the raw sample record read from capture files and the
//! credential the decoder emits. The decoder is stateless and only outputs
//! decoded credentials - it does not make access decisions or talk to reader
//! hardware.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Raw line sample from a capture file
///
/// This represents a single sampled transition exactly as captured, before
/// any bit inversion or frame interpretation. The reader lines are active
/// low: a low data level carries a logical one, and bits are latched while
/// the clock line is low.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    /// Capture timestamp, kept verbatim from the log (never interpreted)
    pub timestamp: String,
    /// Sensed data line level (0 or 1)
    pub data: u8,
    /// Sensed clock line level (0 or 1)
    pub clock: u8,
    /// Sensed card-present line level (0 or 1)
    pub present: u8,
}

impl RawSample {
    /// Build a sample latched on a low clock edge
    ///
    /// Bit-dump captures record one data level per clock edge, so every
    /// character becomes a latched sample with no timestamp.
    pub fn clocked(data: u8) -> Self {
        Self {
            timestamp: String::new(),
            data,
            clock: 0,
            present: 0,
        }
    }

    /// Logical data bit carried by this sample (data line is active low)
    pub fn logical_bit(&self) -> bool {
        self.data == 0
    }

    /// True if the clock line marks this sample as a latched bit
    pub fn is_clocked(&self) -> bool {
        self.clock == 0
    }

    /// True if the card-present line is asserted (active low)
    pub fn is_present(&self) -> bool {
        self.present == 0
    }
}

/// A decoded card credential - the primary output of the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCredential {
    /// Facility (site) code, the upper 8 bits of the credential payload
    pub facility_code: u8,
    /// Card number, the lower 16 bits of the credential payload
    pub card_number: u16,
}

impl DecodedCredential {
    /// Serial number in the reader's conventional `FFF-CCCCC` form
    pub fn serial(&self) -> String {
        format!("{:03}-{:05}", self.facility_code, self.card_number)
    }
}

impl fmt::Display for DecodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serial())
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The capture holds fewer bits than the decode step requires
    #[error("Insufficient data: need {needed} bits, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The bitstream does not chunk into a well-formed card frame
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// The capture file could not be parsed into samples
    #[error("Failed to parse capture file: {0}")]
    CaptureParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Capture file formats understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// Sample log: one `timestamp,data,clock,present` record per line,
    /// preceded by a header record
    Csv,
    /// Bit dump: one `0`/`1` data level character per clock edge
    Bits,
}

impl CaptureFormat {
    /// Infer the capture format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("log") => Ok(CaptureFormat::Csv),
            Some("bits") | Some("txt") => Ok(CaptureFormat::Bits),
            _ => Err(DecodeError::CaptureParseError(format!(
                "Unsupported capture format: {:?}",
                extension
            ))),
        }
    }
}

impl FromStr for CaptureFormat {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" | "log" => Ok(CaptureFormat::Csv),
            "bits" | "txt" => Ok(CaptureFormat::Bits),
            other => Err(DecodeError::CaptureParseError(format!(
                "Unknown capture format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureFormat::Csv => write!(f, "csv"),
            CaptureFormat::Bits => write!(f, "bits"),
        }
    }
}
