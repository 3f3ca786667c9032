//! Prox Log Decoder Library
//!
//! A stateless, reusable library for decoding card reader capture logs
//! (sampled clock/data line levels) into credentials.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Parses capture files (sample logs, bit dumps) into raw samples
//! - Reduces samples to the logical bitstream the reader clocked out
//! - Takes the frame apart and emits the facility code and card number
//! - Optionally verifies frame structure the way the reader hardware does
//!
//! The library does NOT:
//! - Make access decisions or consult a card database
//! - Verify the checksum value (the reader hardware never does either)
//! - Talk to reader hardware or GPIO lines
//! - Render reports
//!
//! All higher-level functionality is in the application layer (prox-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use prox_log_decoder::{Decoder, DecoderConfig};
//! use std::path::Path;
//!
//! // Decode a capture with hardware-style structure checks enabled
//! let config = DecoderConfig::new().with_frame_validation(true);
//! let decoder = Decoder::with_config(config);
//!
//! let credential = decoder.decode_file(Path::new("card.csv")).unwrap();
//! println!("Facility {}, card {}", credential.facility_code, credential.card_number);
//! println!("Serial: {}", credential.serial());
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use types::{CaptureFormat, DecodeError, DecodedCredential, RawSample, Result};

// Internal modules (not exposed in public API)
mod formats;
mod frame;

// Fixed protocol constants of this reader variant
pub use frame::{CREDENTIAL_BITS, FIELD_BITS_PER_SEGMENT, LEADING_BITS, SEGMENT_BITS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
