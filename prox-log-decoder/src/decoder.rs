//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct is the entry point for turning captured samples or
//! capture files into credentials.

use crate::config::DecoderConfig;
use crate::formats::{BitsSampleIterator, CaptureFileParser, CsvSampleIterator};
use crate::frame::FrameDecoder;
use crate::types::{CaptureFormat, DecodedCredential, RawSample, Result};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
///
/// A decoder is cheap to build, holds no state besides its configuration,
/// and can decode any number of captures from any thread.
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder with the default configuration
    pub fn new() -> Self {
        Self {
            config: DecoderConfig::default(),
        }
    }

    /// Create a new decoder with the given configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The configuration this decoder runs with
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a captured sample sequence into a credential
    ///
    /// Samples taken while the clock line was high are discarded, the
    /// active-low data levels are inverted, and the remaining bitstream is
    /// taken apart as a card frame.
    ///
    /// # Example
    /// ```
    /// use prox_log_decoder::{Decoder, RawSample};
    ///
    /// let decoder = Decoder::new();
    /// let samples = vec![RawSample::clocked(1); 10];
    /// // Ten bits cannot hold a frame
    /// assert!(decoder.decode(&samples).is_err());
    /// ```
    pub fn decode(&self, samples: &[RawSample]) -> Result<DecodedCredential> {
        let bits = self.collect_bitstream(samples);
        log::debug!(
            "Collected {} latched bits from {} samples",
            bits.len(),
            samples.len()
        );
        FrameDecoder::decode(&bits, self.config.validate_frame)
    }

    /// Decode an already latched logical bitstream
    ///
    /// The input must hold logical bit values, inversion of the active-low
    /// data line included. Capture files store raw levels instead; those go
    /// through [`Decoder::decode_file`].
    pub fn decode_bitstream(&self, bits: &[bool]) -> Result<DecodedCredential> {
        FrameDecoder::decode(bits, self.config.validate_frame)
    }

    /// Decode a capture file, inferring the format from its extension
    ///
    /// # Example
    /// ```no_run
    /// use prox_log_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let credential = decoder.decode_file(Path::new("card.csv")).unwrap();
    /// println!("{}", credential.serial());
    /// ```
    pub fn decode_file(&self, path: &Path) -> Result<DecodedCredential> {
        let format = CaptureFormat::from_path(path)?;
        self.decode_file_as(path, format)
    }

    /// Decode a capture file in an explicitly chosen format
    pub fn decode_file_as(&self, path: &Path, format: CaptureFormat) -> Result<DecodedCredential> {
        log::info!("Decoding capture file: {:?} ({} format)", path, format);

        let samples: Vec<RawSample> = match format {
            CaptureFormat::Csv => CsvSampleIterator::parse(path)?.collect::<Result<_>>()?,
            CaptureFormat::Bits => BitsSampleIterator::parse(path)?.collect::<Result<_>>()?,
        };
        self.decode(&samples)
    }

    /// Reduce raw samples to the logical bitstream they latched
    fn collect_bitstream(&self, samples: &[RawSample]) -> Vec<bool> {
        samples
            .iter()
            .filter(|sample| sample.is_clocked())
            .filter(|sample| !self.config.require_present || sample.is_present())
            .map(|sample| sample.logical_bit())
            .collect()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
