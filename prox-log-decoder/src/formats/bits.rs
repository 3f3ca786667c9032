//! Bit dump capture parser
//!
//! Parses captures stored as a bare run of `0`/`1` characters, one sensed
//! data level per clock edge. This is the form the reader firmware prints
//! when dumping its sample buffer. ASCII whitespace is ignored, so dumps
//! may be wrapped or line broken.

use crate::formats::CaptureFileParser;
use crate::types::{DecodeError, RawSample, Result};
use std::fs;
use std::path::Path;

/// Iterator over raw samples from a bit dump file
pub struct BitsSampleIterator {
    samples: std::vec::IntoIter<RawSample>,
}

impl CaptureFileParser for BitsSampleIterator {
    fn parse(path: &Path) -> Result<Self> {
        log::info!("Parsing bit dump: {:?}", path);

        if !path.exists() {
            return Err(DecodeError::CaptureParseError(format!(
                "Capture file not found: {:?}",
                path
            )));
        }

        let text = fs::read_to_string(path)?;
        let samples = parse_levels(&text)?;
        log::info!("Bit dump holds {} samples", samples.len());

        Ok(Self {
            samples: samples.into_iter(),
        })
    }
}

impl Iterator for BitsSampleIterator {
    type Item = Result<RawSample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.samples.next().map(Ok)
    }
}

/// Turn a run of level characters into clock-latched samples
fn parse_levels(text: &str) -> Result<Vec<RawSample>> {
    let mut samples = Vec::with_capacity(text.len());
    for (offset, ch) in text.chars().enumerate() {
        match ch {
            '0' => samples.push(RawSample::clocked(0)),
            '1' => samples.push(RawSample::clocked(1)),
            c if c.is_ascii_whitespace() => {}
            other => {
                return Err(DecodeError::CaptureParseError(format!(
                    "Invalid character {:?} at offset {} in bit dump",
                    other, offset
                )))
            }
        }
    }
    Ok(samples)
}
