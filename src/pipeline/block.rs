//! Encoding and decoding of a single block.
//!
//! Encode runs delta -> width selection -> patch extraction -> packing and lays
//! the block out as header, payload, exceptions. Decode reverses it: the payload
//! is unpacked into block-sized stack scratch, exceptions are ORed in, and only
//! then is the prefix sum run into the caller's slice.

use num_traits::Zero;

use crate::config::CodecConfig;
use crate::error::PforError;
use crate::kernels::lanepack::{self, MAX_BLOCK_SIZE};
use crate::kernels::{bitpack, bitwidth, delta, patch};
use crate::pipeline::format::{BlockHeader, BlockLayout, BlockStats};
use crate::traits::{Element, Word};

fn tail(buf: &mut [u8], at: usize) -> Result<&mut [u8], PforError> {
    let actual = buf.len();
    buf.get_mut(at..).ok_or(PforError::BufferTooSmall {
        required: at,
        actual,
    })
}

fn corrupt(context: &str, err: PforError) -> PforError {
    match err {
        PforError::CapabilityMismatch { .. } | PforError::CorruptStream(_) => err,
        other => PforError::CorruptStream(format!("{}: {}", context, other)),
    }
}

/// Encodes `block` (at most one block of elements) into `out`.
///
/// `prev` is the word of the element preceding the block. Returns the bytes
/// written and the word of the block's last element.
pub fn encode_block<E: Element>(
    block: &[E],
    prev: E::Word,
    config: &CodecConfig,
    out: &mut [u8],
) -> Result<(usize, E::Word), PforError> {
    let width = config.block_width;
    let block_size = width.block_size();
    let count = block.len();
    let layout = BlockLayout::for_count(count, block_size);

    let mut deltas = [E::Word::zero(); MAX_BLOCK_SIZE];
    let last = delta::encode_block(
        block,
        prev,
        config.direction,
        config.delta_base,
        &mut deltas[..count],
    );

    let choice = bitwidth::select(
        &deltas[..count],
        config.effective_exception_budget(),
        block_size,
    );
    let b = choice.bit_width;
    let header = BlockHeader {
        count,
        bit_width: b,
        has_exceptions: choice.exceptions > 0,
    };
    let header_len = header.write(out)?;

    let payload_len = match layout {
        BlockLayout::Vertical => lanepack::packed_len(width, b),
        BlockLayout::Serial => bitpack::packed_len(count, b),
    };
    let exceptions_at = header_len + payload_len;
    let exceptions_len = if header.has_exceptions {
        patch::encode(
            &mut deltas[..count],
            b,
            block_size,
            tail(out, exceptions_at)?,
        )?
    } else {
        0
    };

    let payload = tail(out, header_len)?;
    match layout {
        BlockLayout::Vertical => lanepack::pack_block(&deltas[..block_size], b, width, payload)?,
        BlockLayout::Serial => bitpack::pack(&deltas[..count], b, payload)?,
    };

    log::debug!(
        "encode block: count={} b={} max_b={} exceptions={} layout={:?}",
        count,
        b,
        choice.max_bit_width,
        choice.exceptions,
        layout
    );
    log_metric!("event" = "block_encoded", "bit_width" = &b, "exceptions" = &choice.exceptions);

    Ok((exceptions_at + exceptions_len, last))
}

/// Decodes one block from the front of `input` into `out`.
///
/// `out.len()` is the element count the block must hold; the header is checked
/// against it. Returns the block's statistics (with `index` left at 0) and the
/// word of its last element.
pub fn decode_block<E: Element>(
    input: &[u8],
    prev: E::Word,
    config: &CodecConfig,
    out: &mut [E],
) -> Result<(BlockStats, E::Word), PforError> {
    let width = config.block_width;
    let block_size = width.block_size();
    let count = out.len();

    let (header, mut offset) = BlockHeader::read(input)?;
    if header.count != count {
        return Err(PforError::CorruptStream(format!(
            "block holds {} elements, expected {}",
            header.count, count
        )));
    }
    let b = header.bit_width;
    if b as u32 > <E::Word as Word>::BITS {
        return Err(PforError::CorruptStream(format!(
            "bit width {} exceeds the element width",
            b
        )));
    }

    let layout = BlockLayout::for_count(count, block_size);
    let payload = &input[offset..];
    let mut scratch = [E::Word::zero(); MAX_BLOCK_SIZE];
    offset += match layout {
        BlockLayout::Vertical => {
            lanepack::unpack_block(payload, b, width, &mut scratch[..block_size])
        }
        BlockLayout::Serial => bitpack::unpack(payload, b, &mut scratch[..count]),
    }
    .map_err(|e| corrupt("payload", e))?;

    let mut exceptions = 0;
    if header.has_exceptions {
        let (consumed, applied) =
            patch::apply(&input[offset..], b, count, block_size, &mut scratch[..block_size])?;
        offset += consumed;
        exceptions = applied;
    }

    let last = delta::decode_block(
        &scratch[..count],
        prev,
        config.direction,
        config.delta_base,
        out,
    );

    log::debug!(
        "decode block: count={} b={} exceptions={} layout={:?}",
        count,
        b,
        exceptions,
        layout
    );

    let stats = BlockStats {
        index: 0,
        count,
        bit_width: b,
        exceptions,
        layout,
        encoded_len: offset,
    };
    Ok((stats, last))
}
