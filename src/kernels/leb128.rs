//! This module contains the pure, stateless kernels for performing LEB128
//! (Little-Endian Base 128) variable-length integer encoding and decoding.
//!
//! The codec uses it for the small scalar fields of the stream: the baseline,
//! block element counts and exception counts. Encoding writes straight into a
//! caller-owned slice; decoding advances a `Cursor`. Both are panic-free.

use num_traits::{PrimInt, Unsigned};
use std::io::Cursor;

use crate::error::PforError;

/// Longest encoding of a 64-bit value.
pub const MAX_LEN_U64: usize = 10;

//==================================================================================
// 1. Public API for Single-Value Operations
//==================================================================================

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u64) -> usize {
    let bits = (64 - value.leading_zeros()) as usize;
    bits.div_ceil(7).max(1)
}

/// Encodes a single unsigned integer into `out`, returning the bytes written.
pub fn encode_one<T>(value: T, out: &mut [u8]) -> Result<usize, PforError>
where
    T: PrimInt + Unsigned,
{
    let mut current = value
        .to_u64()
        .ok_or_else(|| PforError::UnsupportedType("LEB128 value wider than 64 bits".to_string()))?;
    let needed = encoded_len(current);
    if out.len() < needed {
        return Err(PforError::BufferTooSmall {
            required: needed,
            actual: out.len(),
        });
    }

    for slot in out.iter_mut().take(needed) {
        let mut byte = (current & 0x7F) as u8;
        current >>= 7;
        if current != 0 {
            byte |= 0x80;
        }
        *slot = byte;
    }
    Ok(needed)
}

/// Decodes a single unsigned integer from a LEB128 byte stream cursor.
pub fn decode_one<T>(cursor: &mut Cursor<&[u8]>) -> Result<T, PforError>
where
    T: PrimInt + Unsigned,
{
    let mut result = T::zero();
    let mut shift = 0;
    let total_bits = std::mem::size_of::<T>() * 8;

    loop {
        let pos = cursor.position() as usize;
        let byte = *cursor
            .get_ref()
            .get(pos)
            .ok_or_else(|| PforError::Leb128DecodeError("Unexpected end of buffer".to_string()))?;
        cursor.set_position((pos + 1) as u64);

        // Check if adding these 7 bits would overflow the type's capacity.
        if shift >= total_bits {
            return Err(PforError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }

        let seven_bit_payload = T::from(byte & 0x7F).ok_or_else(|| {
            PforError::Leb128DecodeError("Failed to create 7-bit payload from byte".to_string())
        })?;
        result = result | (seven_bit_payload << shift);

        if byte & 0x80 == 0 {
            // The last byte may not set bits beyond the type's width.
            if shift + 7 > total_bits && (byte >> (total_bits - shift)) > 0 {
                return Err(PforError::Leb128DecodeError(
                    "Integer overflow during decoding".to_string(),
                ));
            }
            return Ok(result);
        }

        shift += 7;
    }
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) -> (usize, u64) {
        let mut buf = [0u8; MAX_LEN_U64];
        let written = encode_one(value, &mut buf).unwrap();
        let mut cursor = Cursor::new(&buf[..written]);
        let decoded: u64 = decode_one(&mut cursor).unwrap();
        assert_eq!(cursor.position() as usize, written);
        (written, decoded)
    }

    #[test]
    fn test_leb128_roundtrip_u64() {
        for value in [0u64, 1, 127, 128, 1000, u32::MAX as u64, u64::MAX] {
            let (written, decoded) = roundtrip(value);
            assert_eq!(decoded, value);
            assert_eq!(written, encoded_len(value));
        }
    }

    #[test]
    fn test_known_encoding() {
        let mut buf = [0u8; 3];
        let written = encode_one(624485u64, &mut buf).unwrap();
        assert_eq!(written, 3);
        assert_eq!(buf, [0xE5, 0x8E, 0x26]);
    }

    #[test]
    fn test_encode_into_short_buffer_fails() {
        let mut buf = [0u8; 1];
        let result = encode_one(300u32, &mut buf);
        assert!(matches!(
            result,
            Err(PforError::BufferTooSmall { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_decode_truncated_buffer() {
        let truncated = [0xE5u8, 0x8E];
        let mut cursor = Cursor::new(&truncated[..]);
        let result = decode_one::<u64>(&mut cursor);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unexpected end of buffer"));
        }
    }

    #[test]
    fn test_decode_overflow_error() {
        // This represents a value larger than u64::MAX
        let encoded_bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut cursor = Cursor::new(&encoded_bytes[..]);
        let result = decode_one::<u64>(&mut cursor);
        if let Err(PforError::Leb128DecodeError(msg)) = result {
            assert!(msg.contains("overflow"));
        } else {
            panic!("Expected Leb128DecodeError for overflow");
        }
    }

    #[test]
    fn test_decode_overflow_narrow_type() {
        // 2^32 does not fit a u32.
        let mut buf = [0u8; MAX_LEN_U64];
        let written = encode_one(1u64 << 32, &mut buf).unwrap();
        let mut cursor = Cursor::new(&buf[..written]);
        assert!(decode_one::<u32>(&mut cursor).is_err());
    }
}
