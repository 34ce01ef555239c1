// In: src/bridge/stateless_api.rs

//! Free-function entry points: the named p4nd1 presets, the byte-level
//! dispatchers keyed by `ElementType`, and stream analysis.

use once_cell::sync::OnceCell;

use crate::bridge::codec::Codec;
use crate::bridge::format::CompressionStats;
use crate::config::{BlockWidth, CodecConfig};
use crate::error::PforError;
use crate::pipeline::{format::MAX_BASELINE_LEN, stream, BlockStats};
use crate::traits::Element;
use crate::types::ElementType;
use crate::utils::{safe_bytes_to_typed_slice, safe_bytes_to_typed_slice_mut};

//==================================================================================
// 1. Named Presets
//==================================================================================

/// The process-wide codec behind each named preset. A refused variant is not
/// cached, so every call to it reports `CapabilityMismatch` again.
fn preset(width: BlockWidth) -> Result<&'static Codec, PforError> {
    static NARROW: OnceCell<Codec> = OnceCell::new();
    static WIDE: OnceCell<Codec> = OnceCell::new();
    let cell = match width {
        BlockWidth::W128 => &NARROW,
        BlockWidth::W256 => &WIDE,
    };
    cell.get_or_try_init(|| Codec::new(CodecConfig::p4nd1(width)))
}

/// p4nd1 encode, 128-element blocks, 32-bit elements.
pub fn p4nd1enc128v32<E: Element<Word = u32>>(input: &[E], out: &mut [u8]) -> Result<usize, PforError> {
    preset(BlockWidth::W128)?.encode(input, out)
}

/// p4nd1 decode, 128-element blocks, 32-bit elements.
pub fn p4nd1dec128v32<E: Element<Word = u32>>(
    input: &[u8],
    n: usize,
    out: &mut [E],
) -> Result<usize, PforError> {
    preset(BlockWidth::W128)?.decode(input, n, out)
}

/// p4nd1 encode, 256-element blocks, 32-bit elements. Needs the wide extension.
pub fn p4nd1enc256v32<E: Element<Word = u32>>(input: &[E], out: &mut [u8]) -> Result<usize, PforError> {
    preset(BlockWidth::W256)?.encode(input, out)
}

/// p4nd1 decode, 256-element blocks, 32-bit elements. Needs the wide extension.
pub fn p4nd1dec256v32<E: Element<Word = u32>>(
    input: &[u8],
    n: usize,
    out: &mut [E],
) -> Result<usize, PforError> {
    preset(BlockWidth::W256)?.decode(input, n, out)
}

/// p4nd1 encode, 128-element blocks, 64-bit elements.
pub fn p4nd1enc64<E: Element<Word = u64>>(input: &[E], out: &mut [u8]) -> Result<usize, PforError> {
    preset(BlockWidth::W128)?.encode(input, out)
}

/// p4nd1 decode, 128-element blocks, 64-bit elements.
pub fn p4nd1dec64<E: Element<Word = u64>>(
    input: &[u8],
    n: usize,
    out: &mut [E],
) -> Result<usize, PforError> {
    preset(BlockWidth::W128)?.decode(input, n, out)
}

//==================================================================================
// 2. Byte-Level Dispatchers
//==================================================================================

/// Encodes a raw native-endian element buffer of type `ty`.
pub fn dispatch_encode(
    codec: &Codec,
    ty: ElementType,
    input_bytes: &[u8],
    out: &mut [u8],
) -> Result<usize, PforError> {
    match ty {
        ElementType::Int32 => codec.encode(safe_bytes_to_typed_slice::<i32>(input_bytes)?, out),
        ElementType::UInt32 => codec.encode(safe_bytes_to_typed_slice::<u32>(input_bytes)?, out),
        ElementType::Int64 => codec.encode(safe_bytes_to_typed_slice::<i64>(input_bytes)?, out),
        ElementType::UInt64 => codec.encode(safe_bytes_to_typed_slice::<u64>(input_bytes)?, out),
    }
}

/// Decodes `n` elements of type `ty` into a raw native-endian element buffer.
pub fn dispatch_decode(
    codec: &Codec,
    ty: ElementType,
    input: &[u8],
    n: usize,
    out_bytes: &mut [u8],
) -> Result<usize, PforError> {
    match ty {
        ElementType::Int32 => codec.decode(input, n, safe_bytes_to_typed_slice_mut::<i32>(out_bytes)?),
        ElementType::UInt32 => codec.decode(input, n, safe_bytes_to_typed_slice_mut::<u32>(out_bytes)?),
        ElementType::Int64 => codec.decode(input, n, safe_bytes_to_typed_slice_mut::<i64>(out_bytes)?),
        ElementType::UInt64 => codec.decode(input, n, safe_bytes_to_typed_slice_mut::<u64>(out_bytes)?),
    }
}

//==================================================================================
// 3. Analysis
//==================================================================================

/// Walks a compressed stream of `n` elements of type `ty` and reports how each
/// block was encoded. The stream is fully decoded, so corruption is detected.
pub fn analyze(
    codec: &Codec,
    ty: ElementType,
    bytes: &[u8],
    n: usize,
) -> Result<CompressionStats, PforError> {
    match ty {
        ElementType::Int32 => analyze_typed::<i32>(codec, bytes, n),
        ElementType::UInt32 => analyze_typed::<u32>(codec, bytes, n),
        ElementType::Int64 => analyze_typed::<i64>(codec, bytes, n),
        ElementType::UInt64 => analyze_typed::<u64>(codec, bytes, n),
    }
}

fn analyze_typed<E: Element>(
    codec: &Codec,
    bytes: &[u8],
    n: usize,
) -> Result<CompressionStats, PforError> {
    // Every block costs at least two header bytes.
    let max_elements = (bytes.len() / 2).saturating_mul(codec.config().block_size());
    if n > max_elements {
        return Err(PforError::CorruptStream(format!(
            "{} bytes cannot hold {} elements",
            bytes.len(),
            n
        )));
    }
    let mut scratch: Vec<E> = vec![E::zeroed(); n];
    let mut blocks: Vec<BlockStats> = Vec::new();
    let total_size = stream::decode_with(codec.config(), bytes, n, &mut scratch, |stats| {
        blocks.push(stats.clone())
    })?;
    let block_bytes: usize = blocks.iter().map(|b| b.encoded_len).sum();
    debug_assert!(total_size - block_bytes <= MAX_BASELINE_LEN);

    Ok(CompressionStats {
        element_type: E::TYPE,
        block_width: codec.config().block_width,
        num_elements: n,
        original_size: n * std::mem::size_of::<E>(),
        baseline_size: total_size - block_bytes,
        total_size,
        blocks,
    })
}
