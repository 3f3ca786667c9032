//! Decode report records
//!
//! One report per capture file, carrying either the decoded credential or
//! the decode failure. Reports serialize to JSON for machine consumers and
//! render as one-line text for the terminal.

use chrono::{DateTime, Utc};
use prox_log_decoder::{DecodeError, DecodedCredential};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of decoding one capture file
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    /// Capture file this report describes
    pub file: PathBuf,
    /// When the decode ran
    pub decoded_at: DateTime<Utc>,
    /// Decoded credential fields, absent when decoding failed
    #[serde(flatten)]
    pub credential: Option<DecodedCredential>,
    /// Serial form of the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Decode failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecodeReport {
    pub fn success(file: PathBuf, credential: DecodedCredential) -> Self {
        Self {
            file,
            decoded_at: Utc::now(),
            serial: Some(credential.serial()),
            credential: Some(credential),
            error: None,
        }
    }

    pub fn failure(file: PathBuf, error: &DecodeError) -> Self {
        Self {
            file,
            decoded_at: Utc::now(),
            credential: None,
            serial: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.credential.is_some()
    }

    /// One line of terminal output for this report
    pub fn render_text(&self) -> String {
        match &self.credential {
            Some(credential) => format!(
                "✓ {} → {} (facility {}, card {})",
                self.file.display(),
                credential.serial(),
                credential.facility_code,
                credential.card_number
            ),
            None => format!(
                "✗ {}: {}",
                self.file.display(),
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
