//! Capture file format parsers
//!
//! This module contains parsers for the capture forms produced by the
//! reader logging tools. Each parser implements an iterator pattern over
//! RawSample objects, in capture order.

use crate::types::{RawSample, Result};
use std::path::Path;

pub mod bits;
pub mod csv;

// Re-export parser types
pub use bits::BitsSampleIterator;
pub use csv::CsvSampleIterator;

/// Common trait for all capture file parsers
///
/// This trait provides a unified interface for parsing different capture
/// formats. Each parser returns an iterator over RawSample objects.
pub trait CaptureFileParser: Iterator<Item = Result<RawSample>> + Sized {
    /// Open a capture file and return an iterator over its samples
    fn parse(path: &Path) -> Result<Self>;
}
