//! Exception ("patch") encoding and application.
//!
//! A delta wider than the block's payload width keeps its low `b` bits in the
//! payload slot; its high residual `d >> b` goes to the exception section:
//!
//! ```text
//!   [header: u8]      bits 0-6: residual width bx, bit 7: positions are a bitmap
//!   [positions]       LEB128 count + one byte per position, or a block-sized bitmap
//!   [residuals]       count values densely packed at bx bits
//! ```
//!
//! Whichever position encoding is smaller is written. Positions are always in
//! ascending order, so a list that is not strictly increasing is corrupt.

use bitvec::prelude::*;
use std::io::Cursor;

use crate::error::PforError;
use crate::kernels::bitwidth::{bitmap_len, position_list_len};
use crate::kernels::lanepack::MAX_BLOCK_SIZE;
use crate::kernels::{bitpack, leb128};
use crate::traits::Word;

const BITMAP_FLAG: u8 = 0x80;
const WIDTH_MASK: u8 = 0x7F;

/// Moves the high bits of every delta wider than `bit_width` into an exception
/// section written to `out`, leaving only the low bits in `deltas`.
///
/// Returns the number of bytes written (zero if no delta needs patching).
pub fn encode<W: Word>(
    deltas: &mut [W],
    bit_width: u8,
    block_size: usize,
    out: &mut [u8],
) -> Result<usize, PforError> {
    if bit_width as u32 >= <W as Word>::BITS {
        return Ok(0);
    }

    let mask = W::low_mask(bit_width);
    let mut positions = [0u8; MAX_BLOCK_SIZE];
    let mut highs = [W::zero(); MAX_BLOCK_SIZE];
    let mut count = 0usize;
    let mut high_bits = 0u8;

    for (pos, d) in deltas.iter_mut().enumerate() {
        if *d > mask {
            let high = *d >> bit_width as usize;
            positions[count] = pos as u8;
            highs[count] = high;
            high_bits = high_bits.max(high.bit_len());
            count += 1;
            *d = *d & mask;
        }
    }
    if count == 0 {
        return Ok(0);
    }

    let use_bitmap = bitmap_len(block_size) < position_list_len(count);
    let positions_len = if use_bitmap {
        bitmap_len(block_size)
    } else {
        position_list_len(count)
    };
    let required = 1 + positions_len + bitpack::packed_len(count, high_bits);
    if out.len() < required {
        return Err(PforError::BufferTooSmall {
            required,
            actual: out.len(),
        });
    }

    out[0] = high_bits | if use_bitmap { BITMAP_FLAG } else { 0 };
    let mut offset = 1;
    if use_bitmap {
        let region = &mut out[offset..offset + positions_len];
        region.fill(0);
        let bits = region.view_bits_mut::<Lsb0>();
        for &pos in &positions[..count] {
            bits.set(pos as usize, true);
        }
    } else {
        offset += leb128::encode_one(count as u64, &mut out[offset..])?;
        out[offset..offset + count].copy_from_slice(&positions[..count]);
    }
    offset = 1 + positions_len;
    offset += bitpack::pack(&highs[..count], high_bits, &mut out[offset..])?;

    log_metric!("event" = "patch_encode", "exceptions" = &count, "bitmap" = &use_bitmap);
    Ok(offset)
}

/// Reads an exception section from `input` and ORs the residuals back into
/// `scratch[..count]`, where `count` is the block's element count.
///
/// Returns the number of bytes consumed and the number of exceptions applied.
/// Nothing outside `scratch[..count]` is written, whatever the input holds.
pub fn apply<W: Word>(
    input: &[u8],
    bit_width: u8,
    count: usize,
    block_size: usize,
    scratch: &mut [W],
) -> Result<(usize, usize), PforError> {
    if bit_width as u32 >= <W as Word>::BITS {
        return Err(corrupt("exceptions on a full-width block"));
    }
    let header = *input.first().ok_or_else(|| corrupt("missing exception header"))?;
    let high_bits = header & WIDTH_MASK;
    if bit_width as u32 + high_bits as u32 > <W as Word>::BITS {
        return Err(corrupt("exception residual wider than the word"));
    }

    let mut positions = [0u8; MAX_BLOCK_SIZE];
    let mut offset = 1;
    let n_exceptions = if header & BITMAP_FLAG != 0 {
        let len = bitmap_len(block_size);
        let region = input
            .get(offset..offset + len)
            .ok_or_else(|| corrupt("truncated exception bitmap"))?;
        let mut n = 0usize;
        for pos in region.view_bits::<Lsb0>().iter_ones() {
            if pos >= count {
                return Err(corrupt("exception position outside the block"));
            }
            positions[n] = pos as u8;
            n += 1;
        }
        offset += len;
        n
    } else {
        let mut cursor = Cursor::new(&input[offset..]);
        let n: u64 = leb128::decode_one(&mut cursor).map_err(|_| corrupt("bad exception count"))?;
        let n = n as usize;
        if n == 0 || n > count {
            return Err(corrupt("exception count out of range"));
        }
        offset += cursor.position() as usize;
        let list = input
            .get(offset..offset + n)
            .ok_or_else(|| corrupt("truncated exception positions"))?;
        for (i, &pos) in list.iter().enumerate() {
            if pos as usize >= count || (i > 0 && pos <= list[i - 1]) {
                return Err(corrupt("exception positions out of order or outside the block"));
            }
        }
        positions[..n].copy_from_slice(list);
        offset += n;
        n
    };

    let mut highs = [W::zero(); MAX_BLOCK_SIZE];
    let consumed = bitpack::unpack(&input[offset..], high_bits, &mut highs[..n_exceptions])
        .map_err(|_| corrupt("truncated exception residuals"))?;

    let live = &mut scratch[..count];
    for (&pos, &high) in positions[..n_exceptions].iter().zip(&highs[..n_exceptions]) {
        let slot = &mut live[pos as usize];
        *slot = *slot | (high << bit_width as usize);
    }
    Ok((offset + consumed, n_exceptions))
}

fn corrupt(msg: &str) -> PforError {
    PforError::CorruptStream(msg.to_string())
}
