//! Defines the byte layout of a compressed stream. This is the single source of
//! truth for the block header, the block layouts and the worst-case size bound.
//!
//! ```text
//!   stream := baseline block*
//!   baseline := LEB128(key of the first element)        (absent when N == 0)
//!   block := LEB128(count) width payload exceptions?
//!   width := u8, bits 0-6: payload bit width b, bit 7: exception section follows
//! ```
//!
//! The block size, direction and delta base are not stored; they are fixed by the
//! codec variant and must match on both sides.

use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::PforError;
use crate::kernels::leb128;

//==================================================================================
// I. Format Constants
//==================================================================================

/// Longest possible baseline preamble (a LEB128 64-bit key).
pub const MAX_BASELINE_LEN: usize = leb128::MAX_LEN_U64;

/// Worst-case header bytes per block: a two-byte LEB128 count plus the width byte.
/// The cost guard ensures payload plus exceptions never exceed the raw element
/// bytes, so this is all a block can add.
pub const MAX_BLOCK_OVERHEAD: usize = 3;

const EXCEPTIONS_FLAG: u8 = 0x80;
const WIDTH_MASK: u8 = 0x7F;

//==================================================================================
// II. Block Header
//==================================================================================

/// The fixed-format metadata in front of every block's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub count: usize,
    pub bit_width: u8,
    pub has_exceptions: bool,
}

impl BlockHeader {
    /// Serializes the header into `out`, returning the bytes written.
    pub fn write(&self, out: &mut [u8]) -> Result<usize, PforError> {
        let offset = leb128::encode_one(self.count as u64, out)?;
        let slot = out.get_mut(offset).ok_or(PforError::BufferTooSmall {
            required: offset + 1,
            actual: offset,
        })?;
        *slot = self.bit_width | if self.has_exceptions { EXCEPTIONS_FLAG } else { 0 };
        Ok(offset + 1)
    }

    /// Parses a header from the front of `input`, returning it with the bytes consumed.
    pub fn read(input: &[u8]) -> Result<(Self, usize), PforError> {
        let mut cursor = Cursor::new(input);
        let count: u64 = leb128::decode_one(&mut cursor)
            .map_err(|e| PforError::CorruptStream(format!("block count: {}", e)))?;
        let offset = cursor.position() as usize;
        let width = *input
            .get(offset)
            .ok_or_else(|| PforError::CorruptStream("missing block width byte".to_string()))?;
        Ok((
            Self {
                count: count as usize,
                bit_width: width & WIDTH_MASK,
                has_exceptions: width & EXCEPTIONS_FLAG != 0,
            },
            offset + 1,
        ))
    }
}

//==================================================================================
// III. Block Layout
//==================================================================================

/// How a block's payload is bit-packed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockLayout {
    /// Lane-interleaved packing of a full block.
    Vertical,
    /// Dense LSB-first packing of a partial final block.
    Serial,
}

impl BlockLayout {
    pub fn for_count(count: usize, block_size: usize) -> Self {
        if count == block_size {
            Self::Vertical
        } else {
            Self::Serial
        }
    }
}

/// What the decoder learned about one block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockStats {
    pub index: usize,
    pub count: usize,
    pub bit_width: u8,
    pub exceptions: usize,
    pub layout: BlockLayout,
    pub encoded_len: usize,
}

//==================================================================================
// IV. Size Bound
//==================================================================================

/// Worst-case stream length for `n` elements of `element_bytes` bytes each.
pub fn max_compressed_len(n: usize, element_bytes: usize, block_size: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n * element_bytes + n.div_ceil(block_size) * MAX_BLOCK_OVERHEAD + MAX_BASELINE_LEN
}
