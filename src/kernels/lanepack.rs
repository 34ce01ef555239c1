//! Lane-aligned ("vertical") bit-packing for full blocks.
//!
//! A block of `block_size` values is split across `L` lanes, `L` being the number
//! of elements that fit one vector register of the variant (see
//! `BlockWidth::lanes`). Value `i` belongs to lane `i % L` at lane index `i / L`.
//! Every lane packs its values serially into its own word stream, and word `k`
//! of lane `j` is stored at word position `k * L + j`:
//!
//! ```text
//!   word stream:  [lane0 w0][lane1 w0]..[laneL-1 w0][lane0 w1][lane1 w1]..
//! ```
//!
//! Because each lane holds exactly `Word::BITS` values, every lane occupies
//! exactly `bit_width` words and all lanes see identical bit offsets at every
//! step. Unpacking therefore reads `L` contiguous words and applies one shift and
//! one mask to all of them at once, which is what the compiler turns into vector
//! instructions. The wide variant runs the same kernels compiled for AVX2.

use crate::config::BlockWidth;
use crate::error::PforError;
use crate::traits::Word;

/// Largest block any variant uses.
pub const MAX_BLOCK_SIZE: usize = 256;

/// Number of bytes a full block packs into: `block_size * bit_width / 8`.
#[inline]
pub fn packed_len(width: BlockWidth, bit_width: u8) -> usize {
    width.block_size() * bit_width as usize / 8
}

//==================================================================================
// 1. Generic Lane Kernels
//==================================================================================

#[inline(always)]
fn pack_vertical<W: Word, const L: usize>(values: &[W], bit_width: u8, words: &mut [W]) {
    let width = bit_width as u32;
    let mask = W::low_mask(bit_width);
    let per_lane = values.len() / L;
    words[..bit_width as usize * L].fill(W::zero());

    for k in 0..per_lane {
        let bit = k as u32 * width;
        let word = (bit / <W as Word>::BITS) as usize;
        let shift = bit % <W as Word>::BITS;
        let spills = shift + width > <W as Word>::BITS;
        let row = &values[k * L..(k + 1) * L];

        for j in 0..L {
            let v = row[j] & mask;
            words[word * L + j] = words[word * L + j] | (v << shift as usize);
            if spills {
                let carry = v >> (<W as Word>::BITS - shift) as usize;
                words[(word + 1) * L + j] = words[(word + 1) * L + j] | carry;
            }
        }
    }
}

#[inline(always)]
fn unpack_vertical<W: Word, const L: usize>(words: &[W], bit_width: u8, out: &mut [W]) {
    let width = bit_width as u32;
    let mask = W::low_mask(bit_width);
    let per_lane = out.len() / L;

    for k in 0..per_lane {
        let bit = k as u32 * width;
        let word = (bit / <W as Word>::BITS) as usize;
        let shift = bit % <W as Word>::BITS;
        let lo = &words[word * L..(word + 1) * L];
        let row = &mut out[k * L..(k + 1) * L];

        if shift + width > <W as Word>::BITS {
            let hi = &words[(word + 1) * L..(word + 2) * L];
            let back = (<W as Word>::BITS - shift) as usize;
            for j in 0..L {
                row[j] = ((lo[j] >> shift as usize) | (hi[j] << back)) & mask;
            }
        } else {
            for j in 0..L {
                row[j] = (lo[j] >> shift as usize) & mask;
            }
        }
    }
}

//==================================================================================
// 2. Wide (AVX2) Entry Points
//==================================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2 {
    use super::{pack_vertical, unpack_vertical};

    #[target_feature(enable = "avx2")]
    pub unsafe fn pack_u32x8(values: &[u32], bit_width: u8, words: &mut [u32]) {
        pack_vertical::<u32, 8>(values, bit_width, words)
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn pack_u64x4(values: &[u64], bit_width: u8, words: &mut [u64]) {
        pack_vertical::<u64, 4>(values, bit_width, words)
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn unpack_u32x8(words: &[u32], bit_width: u8, out: &mut [u32]) {
        unpack_vertical::<u32, 8>(words, bit_width, out)
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn unpack_u64x4(words: &[u64], bit_width: u8, out: &mut [u64]) {
        unpack_vertical::<u64, 4>(words, bit_width, out)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn pack_wide<W: Word>(values: &[W], bit_width: u8, words: &mut [W]) -> Result<(), PforError> {
    if !crate::capability::supports_wide_variant() {
        return Err(PforError::CapabilityMismatch {
            variant: BlockWidth::W256,
        });
    }
    // SAFETY: AVX2 support was verified just above. The casts are identity
    // casts selected by the word width.
    unsafe {
        if <W as Word>::BITS == 32 {
            avx2::pack_u32x8(
                bytemuck::cast_slice(values),
                bit_width,
                bytemuck::cast_slice_mut(words),
            );
        } else {
            avx2::pack_u64x4(
                bytemuck::cast_slice(values),
                bit_width,
                bytemuck::cast_slice_mut(words),
            );
        }
    }
    Ok(())
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn unpack_wide<W: Word>(words: &[W], bit_width: u8, out: &mut [W]) -> Result<(), PforError> {
    if !crate::capability::supports_wide_variant() {
        return Err(PforError::CapabilityMismatch {
            variant: BlockWidth::W256,
        });
    }
    // SAFETY: AVX2 support was verified just above. The casts are identity
    // casts selected by the word width.
    unsafe {
        if <W as Word>::BITS == 32 {
            avx2::unpack_u32x8(
                bytemuck::cast_slice(words),
                bit_width,
                bytemuck::cast_slice_mut(out),
            );
        } else {
            avx2::unpack_u64x4(
                bytemuck::cast_slice(words),
                bit_width,
                bytemuck::cast_slice_mut(out),
            );
        }
    }
    Ok(())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn pack_wide<W: Word>(_values: &[W], _bit_width: u8, _words: &mut [W]) -> Result<(), PforError> {
    Err(PforError::CapabilityMismatch {
        variant: BlockWidth::W256,
    })
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn unpack_wide<W: Word>(_words: &[W], _bit_width: u8, _out: &mut [W]) -> Result<(), PforError> {
    Err(PforError::CapabilityMismatch {
        variant: BlockWidth::W256,
    })
}

//==================================================================================
// 3. Public API
//==================================================================================

/// Packs one full block of `width.block_size()` values at `bit_width` bits.
///
/// Only the low `bit_width` bits of each value are kept. Returns the number of
/// bytes written to `out`, always `packed_len(width, bit_width)`.
pub fn pack_block<W: Word>(
    values: &[W],
    bit_width: u8,
    width: BlockWidth,
    out: &mut [u8],
) -> Result<usize, PforError> {
    let block_size = width.block_size();
    if values.len() != block_size {
        return Err(PforError::BufferMismatch(block_size, values.len()));
    }
    if bit_width as u32 > <W as Word>::BITS {
        return Err(PforError::BitpackEncodeError(0, bit_width));
    }
    let len = packed_len(width, bit_width);
    if out.len() < len {
        return Err(PforError::BufferTooSmall {
            required: len,
            actual: out.len(),
        });
    }
    if bit_width == 0 {
        return Ok(0);
    }

    let lanes = width.lanes(<W as Word>::BITS);
    let n_words = bit_width as usize * lanes;
    let mut words = [W::zero(); MAX_BLOCK_SIZE];

    match (width, lanes) {
        (BlockWidth::W128, 4) => pack_vertical::<W, 4>(values, bit_width, &mut words),
        (BlockWidth::W128, _) => pack_vertical::<W, 2>(values, bit_width, &mut words),
        (BlockWidth::W256, _) => pack_wide(values, bit_width, &mut words)?,
    }

    for (i, word) in words[..n_words].iter().enumerate() {
        word.write_le(&mut out[i * W::BYTES..]);
    }
    Ok(len)
}

/// Unpacks one full block of `width.block_size()` values into `out`.
///
/// `out` is block-sized scratch; nothing outside it is touched. Returns the
/// number of bytes consumed from `input`.
pub fn unpack_block<W: Word>(
    input: &[u8],
    bit_width: u8,
    width: BlockWidth,
    out: &mut [W],
) -> Result<usize, PforError> {
    let block_size = width.block_size();
    if out.len() != block_size {
        return Err(PforError::BufferMismatch(block_size, out.len()));
    }
    if bit_width as u32 > <W as Word>::BITS {
        return Err(PforError::BitpackDecodeError);
    }
    if bit_width == 0 {
        out.fill(W::zero());
        return Ok(0);
    }
    let len = packed_len(width, bit_width);
    if input.len() < len {
        return Err(PforError::BitpackDecodeError);
    }

    let lanes = width.lanes(<W as Word>::BITS);
    let n_words = bit_width as usize * lanes;
    let mut words = [W::zero(); MAX_BLOCK_SIZE];
    for (i, word) in words[..n_words].iter_mut().enumerate() {
        *word = W::read_le(&input[i * W::BYTES..]);
    }

    match (width, lanes) {
        (BlockWidth::W128, 4) => unpack_vertical::<W, 4>(&words, bit_width, out),
        (BlockWidth::W128, _) => unpack_vertical::<W, 2>(&words, bit_width, out),
        (BlockWidth::W256, _) => unpack_wide(&words, bit_width, out)?,
    }
    Ok(len)
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::supports_wide_variant;

    fn sample<W: Word>(count: usize, bit_width: u8) -> Vec<W> {
        let mask = W::low_mask(bit_width).widen();
        (0..count as u64)
            .map(|i| W::narrow(i.wrapping_mul(0x9E37_79B9_7F4A_7C15) & mask))
            .collect()
    }

    fn roundtrip<W: Word>(width: BlockWidth) {
        for bit_width in 0..=<W as Word>::BITS as u8 {
            let values = sample::<W>(width.block_size(), bit_width);
            let mut packed = [0u8; 256 * 8];
            let written = pack_block(&values, bit_width, width, &mut packed).unwrap();
            assert_eq!(written, packed_len(width, bit_width));

            let mut decoded = vec![W::zero(); width.block_size()];
            let consumed = unpack_block(&packed[..written], bit_width, width, &mut decoded).unwrap();
            assert_eq!(consumed, written);
            assert_eq!(decoded, values, "bit width {}", bit_width);
        }
    }

    #[test]
    fn test_narrow_roundtrip_u32() {
        roundtrip::<u32>(BlockWidth::W128);
    }

    #[test]
    fn test_narrow_roundtrip_u64() {
        roundtrip::<u64>(BlockWidth::W128);
    }

    #[test]
    fn test_wide_roundtrip_or_refusal() {
        if supports_wide_variant() {
            roundtrip::<u32>(BlockWidth::W256);
            roundtrip::<u64>(BlockWidth::W256);
        } else {
            let values = vec![1u32; 256];
            let mut packed = [0u8; 256 * 4];
            let result = pack_block(&values, 1, BlockWidth::W256, &mut packed);
            assert!(matches!(result, Err(PforError::CapabilityMismatch { .. })));
        }
    }

    #[test]
    fn test_full_width_layout_is_identity() {
        // At 32 bits every value is one word, and k * L + j == i.
        let values: Vec<u32> = (0..128u32).map(|i| i * 1000 + 7).collect();
        let mut packed = [0u8; 512];
        pack_block(&values, 32, BlockWidth::W128, &mut packed).unwrap();
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&packed[i * 4..i * 4 + 4], &v.to_le_bytes());
        }
    }

    #[test]
    fn test_single_bit_lane_interleaving() {
        // Value 13 sits in lane 1 at lane index 3: bit 3 of word 1.
        let mut values = vec![0u32; 128];
        values[13] = 1;
        let mut packed = [0u8; 16];
        pack_block(&values, 1, BlockWidth::W128, &mut packed).unwrap();
        assert_eq!(packed[..4], [0, 0, 0, 0]);
        assert_eq!(packed[4..8], [8, 0, 0, 0]);
        assert_eq!(packed[8..], [0; 8]);
    }

    #[test]
    fn test_pack_masks_high_bits() {
        let values = vec![0xFFu64; 128];
        let mut packed = [0u8; 64];
        let written = pack_block(&values, 4, BlockWidth::W128, &mut packed).unwrap();
        let mut decoded = vec![0u64; 128];
        unpack_block(&packed[..written], 4, BlockWidth::W128, &mut decoded).unwrap();
        assert!(decoded.iter().all(|&v| v == 0xF));
    }

    #[test]
    fn test_unpack_truncated_input() {
        let mut decoded = vec![0u32; 128];
        let result = unpack_block(&[0u8; 15], 1, BlockWidth::W128, &mut decoded);
        assert!(matches!(result, Err(PforError::BitpackDecodeError)));
    }

    #[test]
    fn test_wrong_block_length_rejected() {
        let mut packed = [0u8; 64];
        let result = pack_block(&[1u32; 100], 3, BlockWidth::W128, &mut packed);
        assert!(matches!(result, Err(PforError::BufferMismatch(128, 100))));
    }
}
