//! Decoder configuration types
//!
//! The decoder needs very little configuration. Both knobs mirror behavior
//! of the reader hardware and default to off, so plain captures decode the
//! way the offline tools process them.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Verify frame structure (leading zeros, segment parity, sentinels,
    /// pad bits) instead of taking the frame apart by position alone
    #[serde(default)]
    pub validate_frame: bool,

    /// Only keep samples latched while the card-present line is asserted
    #[serde(default)]
    pub require_present: bool,
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable structural frame validation
    pub fn with_frame_validation(mut self, enabled: bool) -> Self {
        self.validate_frame = enabled;
        self
    }

    /// Builder method: enable or disable card-present gating
    pub fn with_present_filter(mut self, enabled: bool) -> Self {
        self.require_present = enabled;
        self
    }
}
