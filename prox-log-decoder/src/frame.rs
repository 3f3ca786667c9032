//! Frame decoding engine
//!
//! Turns a latched logical bitstream into a credential. Handles the leading
//! zero region, 5-bit segmentation, zero-padding trim, sentinel and checksum
//! removal, payload bit reversal and field extraction.
//!
//! The wire layout, after inversion of the active-low data line:
//!
//! ```text
//! 25 zeros | START SEG SEG ... SEG END LRC | trailing zeros
//! ```
//!
//! Each segment is 5 bits: 4 data bits sent least significant first, then
//! an odd parity bit. The start block is 0xB (wire order `1101`), the end
//! block 0xF (`1111`). Data segments carry 3 payload bits and a zero pad
//! bit. Only the final 26 payload bits are significant; they hold the two
//! field parity bits, the facility code and the card number.

use crate::types::{DecodeError, DecodedCredential, Result};

/// Number of leading framing bits before the first segment
pub const LEADING_BITS: usize = 25;

/// Width of one frame segment (4 data bits plus parity)
pub const SEGMENT_BITS: usize = 5;

/// Payload bits carried by each data segment
pub const FIELD_BITS_PER_SEGMENT: usize = 3;

/// Width of the credential window at the tail of the payload stream
pub const CREDENTIAL_BITS: usize = 26;

/// Start sentinel block (0xB) in wire bit order, parity excluded
const START_SENTINEL: [bool; 4] = [true, true, false, true];

/// End sentinel block (0xF) in wire bit order, parity excluded
const END_SENTINEL: [bool; 4] = [true, true, true, true];

/// Frame decoder - extracts a credential from a logical bitstream
pub(crate) struct FrameDecoder;

impl FrameDecoder {
    /// Decode a logical bitstream into a credential
    ///
    /// The stream must already be inverted from raw line levels. With
    /// `validate` set, the structural checks the reader hardware performs
    /// (leading zeros, segment parity, sentinels, pad bits) run before any
    /// field extraction; without it the frame is taken apart by position
    /// alone, the way the offline capture tools do.
    pub fn decode(bits: &[bool], validate: bool) -> Result<DecodedCredential> {
        if bits.len() < LEADING_BITS {
            return Err(DecodeError::InsufficientData {
                needed: LEADING_BITS,
                available: bits.len(),
            });
        }
        let (leading, frame) = bits.split_at(LEADING_BITS);
        log::trace!("Frame region: {}", Self::format_bits(frame));

        let mut segments: Vec<&[bool]> = frame.chunks(SEGMENT_BITS).collect();
        while segments.last().map_or(false, |seg| Self::is_zero_padding(seg)) {
            segments.pop();
        }
        log::debug!("{} segments after trimming zero padding", segments.len());

        // The frame must still hold the start sentinel, the checksum and
        // the end sentinel before any data segment can be recovered.
        match segments.len() {
            0 => {
                return Err(DecodeError::MalformedFrame(
                    "no segments remain after trimming zero padding".to_string(),
                ))
            }
            1 => {
                return Err(DecodeError::MalformedFrame(
                    "frame has no checksum segment".to_string(),
                ))
            }
            2 => {
                return Err(DecodeError::MalformedFrame(
                    "frame has no end sentinel segment".to_string(),
                ))
            }
            _ => {}
        }

        if validate {
            Self::validate_frame(leading, &segments)?;
        }

        // Wire order is START, data..., END, LRC. The checksum value itself
        // is never verified, matching the reader hardware.
        let count = segments.len();
        let data_segments = &segments[1..count - 2];
        log::debug!(
            "Frame layout: start sentinel, {} data segments, end sentinel, checksum",
            data_segments.len()
        );

        let field_bits = Self::collect_field_bits(data_segments)?;
        log::trace!(
            "Collected {} field bits: {}",
            field_bits.len(),
            Self::format_bits(&field_bits)
        );

        let credential = Self::extract_credential(&field_bits)?;
        log::debug!("Decoded credential {}", credential.serial());
        Ok(credential)
    }

    /// True for a full-width segment of all zero bits
    fn is_zero_padding(segment: &[bool]) -> bool {
        segment.len() == SEGMENT_BITS && segment.iter().all(|&bit| !bit)
    }

    /// Collect payload bits from the data segments
    ///
    /// Each data segment carries its payload in the first three wire bits,
    /// least significant first; reversing them appends the payload most
    /// significant bit first. The pad and parity bits never contribute.
    fn collect_field_bits(data_segments: &[&[bool]]) -> Result<Vec<bool>> {
        let mut field_bits = Vec::with_capacity(data_segments.len() * FIELD_BITS_PER_SEGMENT);
        for (index, segment) in data_segments.iter().enumerate() {
            if segment.len() < FIELD_BITS_PER_SEGMENT {
                return Err(DecodeError::MalformedFrame(format!(
                    "data segment {} has {} bits, expected at least {}",
                    index,
                    segment.len(),
                    FIELD_BITS_PER_SEGMENT
                )));
            }
            field_bits.push(segment[2]);
            field_bits.push(segment[1]);
            field_bits.push(segment[0]);
        }
        Ok(field_bits)
    }

    /// Extract the credential from the collected payload bits
    ///
    /// Only the final window is significant; anything before it is junk
    /// clocked out while the card spins up. The first and last window bits
    /// are parity and do not contribute to the fields.
    fn extract_credential(field_bits: &[bool]) -> Result<DecodedCredential> {
        if field_bits.len() < CREDENTIAL_BITS {
            return Err(DecodeError::InsufficientData {
                needed: CREDENTIAL_BITS,
                available: field_bits.len(),
            });
        }
        let window = &field_bits[field_bits.len() - CREDENTIAL_BITS..];
        let payload = &window[1..CREDENTIAL_BITS - 1];

        let value = Self::bits_to_uint(payload);
        Ok(DecodedCredential {
            facility_code: ((value >> 16) & 0xFF) as u8,
            card_number: (value & 0xFFFF) as u16,
        })
    }

    /// Verify the frame structure the way the reader hardware does
    ///
    /// The checksum segment gets its parity verified like every other
    /// segment, but the checksum value itself is not recomputed.
    fn validate_frame(leading: &[bool], segments: &[&[bool]]) -> Result<()> {
        if leading.iter().any(|&bit| bit) {
            return Err(DecodeError::MalformedFrame(
                "expected zeros in the leading bit region".to_string(),
            ));
        }

        let count = segments.len();
        for (index, segment) in segments.iter().enumerate() {
            if segment.len() != SEGMENT_BITS {
                return Err(DecodeError::MalformedFrame(format!(
                    "premature end of data in segment {}",
                    index
                )));
            }
            if !Self::has_odd_parity(segment) {
                let message = if index == count - 1 {
                    "parity failure in checksum segment".to_string()
                } else {
                    format!("parity failure in segment {}", index)
                };
                return Err(DecodeError::MalformedFrame(message));
            }
        }

        if !segments[0].starts_with(&START_SENTINEL) {
            return Err(DecodeError::MalformedFrame(
                "invalid start sentinel segment".to_string(),
            ));
        }
        if !segments[count - 2].starts_with(&END_SENTINEL) {
            return Err(DecodeError::MalformedFrame(
                "invalid end sentinel segment".to_string(),
            ));
        }
        for (index, segment) in segments[1..count - 2].iter().enumerate() {
            if segment[SEGMENT_BITS - 2] {
                return Err(DecodeError::MalformedFrame(format!(
                    "nonzero pad bit in data segment {}",
                    index
                )));
            }
        }
        Ok(())
    }

    /// True if the set bits of the segment count to an odd number
    fn has_odd_parity(segment: &[bool]) -> bool {
        segment.iter().filter(|&&bit| bit).count() % 2 == 1
    }

    /// Fold a bit slice into an unsigned value, most significant bit first
    fn bits_to_uint(bits: &[bool]) -> u32 {
        bits.iter().fold(0u32, |acc, &bit| (acc << 1) | (bit as u32))
    }

    fn format_bits(bits: &[bool]) -> String {
        bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Logical bitstream for facility 1, card 515: 25 leading zeros, the
    /// start sentinel, nine data segments (one junk payload bit), the end
    /// sentinel and the checksum
    const SYNTHETIC: &str = "0000000000000000000000000110100010000001000010010000001010000000100001011011111100001";

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn decode(s: &str) -> Result<DecodedCredential> {
        FrameDecoder::decode(&bits(s), false)
    }

    fn decode_strict(s: &str) -> Result<DecodedCredential> {
        FrameDecoder::decode(&bits(s), true)
    }

    #[test]
    fn test_decode_synthetic_frame() {
        let credential = decode(SYNTHETIC).unwrap();
        assert_eq!(credential.facility_code, 1);
        assert_eq!(credential.card_number, 515);
        assert_eq!(credential.serial(), "001-00515");
    }

    #[test]
    fn test_trailing_zero_padding_is_inert() {
        let padded = format!("{}{}", SYNTHETIC, "00000".repeat(4));
        assert_eq!(decode(&padded).unwrap(), decode(SYNTHETIC).unwrap());
    }

    #[test]
    fn test_short_stream_is_insufficient() {
        let err = decode("0000000000").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InsufficientData {
                needed: LEADING_BITS,
                available: 10
            }
        ));
    }

    #[test]
    fn test_all_zero_stream_is_malformed() {
        // Every segment is zero padding, so the trim leaves nothing
        let err = decode(&"0".repeat(60)).unwrap_err();
        match err {
            DecodeError::MalformedFrame(msg) => assert!(msg.contains("trimming")),
            other => panic!("expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_frame_missing_checksum_and_sentinel_segments() {
        let leading = "0".repeat(25);

        // Only the start sentinel survives the trim
        let err = decode(&format!("{}11010", leading)).unwrap_err();
        assert!(err.to_string().contains("checksum"));

        // Start sentinel and checksum, but no end sentinel
        let err = decode(&format!("{}1101000001", leading)).unwrap_err();
        assert!(err.to_string().contains("end sentinel"));
    }

    #[test]
    fn test_frame_without_data_segments_is_insufficient() {
        // Start sentinel, end sentinel and checksum leave zero field bits
        let frame = format!("{}110101111100001", "0".repeat(25));
        let err = decode(&frame).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InsufficientData {
                needed: CREDENTIAL_BITS,
                available: 0
            }
        ));
    }

    #[test]
    fn test_too_few_field_bits_is_insufficient() {
        // Six data segments carry 18 field bits, short of the 26-bit window
        let frame = format!("{}11010{}1111100001", "0".repeat(25), "00100".repeat(6));
        let err = decode(&frame).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InsufficientData {
                needed: CREDENTIAL_BITS,
                available: 18
            }
        ));
    }

    #[test]
    fn test_collect_field_bits_reverses_payload() {
        let segment = bits("10010");
        let field = FrameDecoder::collect_field_bits(&[&segment[..]]).unwrap();
        assert_eq!(field, bits("001"));

        // Reversing twice restores the original payload order
        let twice = FrameDecoder::collect_field_bits(&[&field[..]]).unwrap();
        assert_eq!(twice, bits("100"));
    }

    #[test]
    fn test_collect_field_bits_rejects_short_segment() {
        let segment = bits("01");
        let err = FrameDecoder::collect_field_bits(&[&segment[..]]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedFrame(_)));
    }

    #[test]
    fn test_credential_window_boundaries() {
        // Exactly 26 bits: parity, facility 1, card 515, parity
        let window = format!("0{:08b}{:016b}0", 1, 515);
        let credential = FrameDecoder::extract_credential(&bits(&window)).unwrap();
        assert_eq!(credential.facility_code, 1);
        assert_eq!(credential.card_number, 515);

        // A 27th bit in front is junk outside the window
        let wider = format!("1{}", window);
        assert_eq!(
            FrameDecoder::extract_credential(&bits(&wider)).unwrap(),
            credential
        );

        let err = FrameDecoder::extract_credential(&bits(&window[1..])).unwrap_err();
        assert!(matches!(err, DecodeError::InsufficientData { .. }));
    }

    #[test]
    fn test_bits_to_uint_folds_msb_first() {
        assert_eq!(FrameDecoder::bits_to_uint(&bits("101")), 5);
        assert_eq!(FrameDecoder::bits_to_uint(&bits("0000001000000011")), 515);
        assert_eq!(FrameDecoder::bits_to_uint(&[]), 0);
    }

    #[test]
    fn test_zero_padding_requires_full_width() {
        assert!(FrameDecoder::is_zero_padding(&bits("00000")));
        assert!(!FrameDecoder::is_zero_padding(&bits("000")));
        assert!(!FrameDecoder::is_zero_padding(&bits("00100")));
    }

    #[test]
    fn test_validation_accepts_clean_frame() {
        let credential = decode_strict(SYNTHETIC).unwrap();
        assert_eq!(credential.serial(), "001-00515");
    }

    #[test]
    fn test_validation_checks_leading_region() {
        let mut stream = bits(SYNTHETIC);
        stream[3] = true;

        // Positional decoding never looks at the leading bits
        let relaxed = FrameDecoder::decode(&stream, false).unwrap();
        assert_eq!(relaxed.card_number, 515);

        let err = FrameDecoder::decode(&stream, true).unwrap_err();
        assert!(err.to_string().contains("leading"));
    }

    #[test]
    fn test_validation_checks_segment_parity() {
        // Flip the parity bit of the first data segment; the payload bits
        // are untouched, so positional decoding still succeeds
        let mut stream = bits(SYNTHETIC);
        stream[34] = !stream[34];

        assert_eq!(FrameDecoder::decode(&stream, false).unwrap().card_number, 515);

        let err = FrameDecoder::decode(&stream, true).unwrap_err();
        assert!(err.to_string().contains("parity failure in segment 1"));
    }

    #[test]
    fn test_validation_checks_checksum_parity() {
        // Corrupt the checksum segment while keeping it non-zero
        let stream = format!("{}00011", &SYNTHETIC[..SYNTHETIC.len() - 5]);
        let err = decode_strict(&stream).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_validation_checks_sentinels() {
        // Replace the start sentinel with an odd-parity non-sentinel block
        let stream = format!("{}10000{}", &SYNTHETIC[..25], &SYNTHETIC[30..]);
        assert_eq!(decode(&stream).unwrap().card_number, 515);
        let err = decode_strict(&stream).unwrap_err();
        assert!(err.to_string().contains("start sentinel"));

        // Replace the end sentinel the same way
        let stream = format!("{}11010{}", &SYNTHETIC[..75], &SYNTHETIC[80..]);
        assert_eq!(decode(&stream).unwrap().card_number, 515);
        let err = decode_strict(&stream).unwrap_err();
        assert!(err.to_string().contains("end sentinel"));
    }

    #[test]
    fn test_validation_checks_pad_bits() {
        // First data segment becomes 00111: parity holds but the pad is set
        let stream = format!("{}00111{}", &SYNTHETIC[..30], &SYNTHETIC[35..]);
        assert_eq!(decode(&stream).unwrap().card_number, 515);
        let err = decode_strict(&stream).unwrap_err();
        assert!(err.to_string().contains("pad bit"));
    }

    #[test]
    fn test_validation_rejects_truncated_segment() {
        let stream = format!("{}111", SYNTHETIC);
        let err = decode_strict(&stream).unwrap_err();
        assert!(err.to_string().contains("premature end"));
    }
}
