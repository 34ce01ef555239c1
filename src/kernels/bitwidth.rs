//! Per-block bit-width selection.
//!
//! The selector looks at the significant-bit histogram of a block's deltas and
//! picks the narrowest width that leaves at most `budget` outliers. Outliers
//! become exceptions. A final cost check discards the patched layout when it
//! would not actually be smaller than packing every delta at full block width.

use crate::kernels::{bitpack, leb128};
use crate::traits::Word;

/// The width chosen for one block and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthChoice {
    /// Width of the packed payload.
    pub bit_width: u8,
    /// Width of the largest delta in the block.
    pub max_bit_width: u8,
    /// Number of deltas wider than `bit_width`.
    pub exceptions: usize,
}

impl WidthChoice {
    /// Width of the high residuals stored for exceptions.
    pub fn exception_bit_width(&self) -> u8 {
        if self.exceptions == 0 {
            0
        } else {
            self.max_bit_width - self.bit_width
        }
    }
}

/// Size in bytes of an exception section holding `count` residuals of
/// `high_bits` bits in a block of `block_size` slots. Zero when `count` is zero.
pub fn exception_section_len(count: usize, high_bits: u8, block_size: usize) -> usize {
    if count == 0 {
        return 0;
    }
    1 + position_list_len(count).min(bitmap_len(block_size)) + bitpack::packed_len(count, high_bits)
}

/// Bytes taken by a LEB128 count followed by one byte per position.
#[inline]
pub fn position_list_len(count: usize) -> usize {
    leb128::encoded_len(count as u64) + count
}

/// Bytes taken by a one-bit-per-slot position bitmap.
#[inline]
pub fn bitmap_len(block_size: usize) -> usize {
    block_size.div_ceil(8)
}

/// Chooses the payload width for `deltas`.
///
/// Picks the smallest `b` with at most `budget` deltas wider than `b`, then
/// falls back to the block's maximum width unless patching is strictly smaller.
pub fn select<W: Word>(deltas: &[W], budget: usize, block_size: usize) -> WidthChoice {
    let mut histogram = [0usize; 65];
    for &d in deltas {
        histogram[d.bit_len() as usize] += 1;
    }

    let max_bit_width = histogram
        .iter()
        .rposition(|&n| n > 0)
        .unwrap_or(0) as u8;

    // Walk down from the top, accumulating how many deltas exceed each width.
    let mut exceeding = 0usize;
    let mut bit_width = max_bit_width;
    let mut exceptions = 0usize;
    for b in (0..max_bit_width).rev() {
        exceeding += histogram[b as usize + 1];
        if exceeding > budget {
            break;
        }
        bit_width = b;
        exceptions = exceeding;
    }

    let unpatched = WidthChoice {
        bit_width: max_bit_width,
        max_bit_width,
        exceptions: 0,
    };
    if exceptions == 0 {
        return unpatched;
    }

    let n = deltas.len();
    let patched_len = bitpack::packed_len(n, bit_width)
        + exception_section_len(exceptions, max_bit_width - bit_width, block_size);
    let unpatched_len = bitpack::packed_len(n, max_bit_width);
    if patched_len >= unpatched_len {
        return unpatched;
    }

    WidthChoice {
        bit_width,
        max_bit_width,
        exceptions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_block_selects_zero_width() {
        let choice = select(&[0u32; 128], 8, 128);
        assert_eq!(choice.bit_width, 0);
        assert_eq!(choice.exceptions, 0);
    }

    #[test]
    fn test_uniform_block_has_no_exceptions() {
        let deltas: Vec<u32> = (0..128).map(|i| i % 16).collect();
        let choice = select(&deltas, 8, 128);
        assert_eq!(choice.bit_width, 4);
        assert_eq!(choice.exceptions, 0);
    }

    #[test]
    fn test_outliers_become_exceptions() {
        let mut deltas = vec![1u64; 128];
        deltas[5] = 1 << 40;
        deltas[90] = 1 << 33;
        let choice = select(&deltas, 8, 128);
        assert_eq!(choice.bit_width, 1);
        assert_eq!(choice.max_bit_width, 41);
        assert_eq!(choice.exceptions, 2);
        assert_eq!(choice.exception_bit_width(), 40);
    }

    #[test]
    fn test_budget_is_respected() {
        let mut deltas = vec![3u32; 128];
        for d in deltas.iter_mut().take(9) {
            *d = 1000;
        }
        // Nine outliers exceed a budget of eight, so no patching.
        let choice = select(&deltas, 8, 128);
        assert_eq!(choice.bit_width, 10);
        assert_eq!(choice.exceptions, 0);

        let choice = select(&deltas, 9, 128);
        assert_eq!(choice.bit_width, 2);
        assert_eq!(choice.exceptions, 9);
    }

    #[test]
    fn test_zero_budget_disables_patching() {
        let mut deltas = vec![0u32; 128];
        deltas[0] = u32::MAX;
        let choice = select(&deltas, 0, 128);
        assert_eq!(choice.bit_width, 32);
        assert_eq!(choice.exceptions, 0);
    }

    #[test]
    fn test_cost_guard_rejects_unprofitable_patching() {
        // Patching all four values at b = 0 costs 7 bytes against 1 byte unpatched.
        let deltas = [1u32, 1, 1, 3];
        let choice = select(&deltas, 8, 128);
        assert_eq!(choice.bit_width, 2);
        assert_eq!(choice.exceptions, 0);
    }

    #[test]
    fn test_exception_section_prefers_smaller_position_encoding() {
        assert_eq!(exception_section_len(0, 5, 128), 0);
        // 1 header + (1 count + 2 positions) + 2 bytes of residuals
        assert_eq!(exception_section_len(2, 8, 128), 6);
        // 40 positions: the 16-byte bitmap wins over a 41-byte list.
        assert_eq!(exception_section_len(40, 1, 128), 1 + 16 + 5);
    }
}
