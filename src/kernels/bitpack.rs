//! This module contains the pure, stateless kernels for performing dense, serial
//! fixed-width bit-packing and unpacking.
//!
//! Values are laid end to end, least-significant bit first, with no padding
//! between them. The codec uses this layout wherever lane alignment buys nothing:
//! the partial final block of a stream and the high-bit residuals of exceptions.
//! Both directions operate on caller-owned slices through `bitvec` views and
//! never allocate.

use bitvec::prelude::*;

use crate::error::PforError;
use crate::traits::Word;

/// Number of bytes `count` values of `bit_width` bits occupy.
#[inline]
pub fn packed_len(count: usize, bit_width: u8) -> usize {
    (count * bit_width as usize).div_ceil(8)
}

/// Packs `values` at `bit_width` bits each into the front of `out`.
///
/// Returns the number of bytes written, which is always `packed_len`.
pub fn pack<W: Word>(values: &[W], bit_width: u8, out: &mut [u8]) -> Result<usize, PforError> {
    if bit_width as u32 > W::BITS {
        return Err(PforError::BitpackEncodeError(0, bit_width));
    }
    let max_val = W::low_mask(bit_width);
    if let Some(&bad) = values.iter().find(|&&v| v > max_val) {
        return Err(PforError::BitpackEncodeError(bad.widen(), bit_width));
    }
    if bit_width == 0 {
        return Ok(0);
    }

    let len = packed_len(values.len(), bit_width);
    if out.len() < len {
        return Err(PforError::BufferTooSmall {
            required: len,
            actual: out.len(),
        });
    }

    let region = &mut out[..len];
    region.fill(0);
    let bits = region.view_bits_mut::<Lsb0>();
    let width = bit_width as usize;
    for (i, &val) in values.iter().enumerate() {
        bits[i * width..(i + 1) * width].store_le::<u64>(val.widen());
    }
    Ok(len)
}

/// Unpacks `out.len()` values of `bit_width` bits from the front of `input`.
///
/// Returns the number of bytes consumed. Only `out` is written.
pub fn unpack<W: Word>(input: &[u8], bit_width: u8, out: &mut [W]) -> Result<usize, PforError> {
    if bit_width as u32 > W::BITS {
        return Err(PforError::BitpackDecodeError);
    }
    if bit_width == 0 {
        out.fill(W::zero());
        return Ok(0);
    }

    let len = packed_len(out.len(), bit_width);
    if input.len() < len {
        return Err(PforError::BitpackDecodeError);
    }

    let bits = input[..len].view_bits::<Lsb0>();
    let width = bit_width as usize;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = W::narrow(bits[i * width..(i + 1) * width].load_le::<u64>());
    }
    Ok(len)
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitpack_u32_roundtrip() {
        let original: Vec<u32> = vec![5, 6, 7, 1];
        let mut packed = [0u8; 8];
        let written = pack(&original, 3, &mut packed).unwrap();
        assert_eq!(written, 2);

        let mut decoded = [0u32; 4];
        let consumed = unpack(&packed[..written], 3, &mut decoded).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(decoded.to_vec(), original);
    }

    #[test]
    fn test_layout_is_lsb_first() {
        // 0b101 then 0b011 -> byte 0b00_011_101
        let mut packed = [0u8; 1];
        pack(&[0b101u32, 0b011], 3, &mut packed).unwrap();
        assert_eq!(packed[0], 0b0001_1101);
    }

    #[test]
    fn test_full_width_u64_roundtrip() {
        let original = [u64::MAX, 0, 1 << 63, 12345];
        let mut packed = [0u8; 32];
        let written = pack(&original, 64, &mut packed).unwrap();
        assert_eq!(written, 32);

        let mut decoded = [0u64; 4];
        unpack(&packed, 64, &mut decoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_zero_width_writes_nothing() {
        let mut packed = [0xAAu8; 4];
        assert_eq!(pack(&[0u32; 10], 0, &mut packed).unwrap(), 0);
        assert_eq!(packed, [0xAA; 4]);

        let mut decoded = [7u32; 10];
        assert_eq!(unpack(&[], 0, &mut decoded).unwrap(), 0);
        assert_eq!(decoded, [0; 10]);
    }

    #[test]
    fn test_decode_truncated_buffer_error() {
        let original: Vec<u32> = vec![10, 20, 30];
        let mut packed = [0u8; 2];
        pack(&original, 5, &mut packed).unwrap();

        let mut decoded = [0u32; 3];
        let result = unpack(&packed[..1], 5, &mut decoded);
        assert!(matches!(result, Err(PforError::BitpackDecodeError)));
    }

    #[test]
    fn test_encode_value_exceeds_bit_width_error() {
        let original: Vec<u32> = vec![1, 2, 3, 8]; // 8 requires 4 bits
        let mut packed = [0u8; 4];

        let result = pack(&original, 3, &mut packed);

        if let Err(PforError::BitpackEncodeError(val, width)) = result {
            assert_eq!(val, 8);
            assert_eq!(width, 3);
        } else {
            panic!("Expected BitpackEncodeError");
        }
    }
}
