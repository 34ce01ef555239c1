//! Whole-stream assembly: the baseline preamble followed by every block.

use std::io::Cursor;

use crate::config::CodecConfig;
use crate::error::PforError;
use crate::kernels::{delta, leb128};
use crate::pipeline::block;
use crate::pipeline::format::{self, BlockStats};
use crate::traits::Element;

/// Worst-case encoded length of `n` elements of type `E` under `config`.
pub fn max_compressed_len<E: Element>(config: &CodecConfig, n: usize) -> usize {
    format::max_compressed_len(n, std::mem::size_of::<E>(), config.block_size())
}

/// Encodes `input` into `out` and returns the exact number of bytes written.
///
/// Fails with `BufferTooSmall` before writing anything if `out` is shorter than
/// `max_compressed_len`.
pub fn encode<E: Element>(
    config: &CodecConfig,
    input: &[E],
    out: &mut [u8],
) -> Result<usize, PforError> {
    let required = max_compressed_len::<E>(config, input.len());
    if out.len() < required {
        return Err(PforError::BufferTooSmall {
            required,
            actual: out.len(),
        });
    }
    let Some(&first) = input.first() else {
        return Ok(0);
    };

    let mut offset = leb128::encode_one(first.baseline_key(), out)?;
    let mut prev = delta::seed(first.to_word(), config.direction, config.delta_base);
    for chunk in input.chunks(config.block_size()) {
        let (written, last) = block::encode_block(chunk, prev, config, &mut out[offset..])?;
        offset += written;
        prev = last;
    }

    log::debug!(
        "encoded {} x {:?} into {} bytes ({} variant)",
        input.len(),
        E::TYPE,
        offset,
        config.block_width
    );
    Ok(offset)
}

/// Decodes `n` elements from `input` into `out[..n]` and returns the bytes consumed.
pub fn decode<E: Element>(
    config: &CodecConfig,
    input: &[u8],
    n: usize,
    out: &mut [E],
) -> Result<usize, PforError> {
    decode_with(config, input, n, out, |_| {})
}

/// Like `decode`, calling `on_block` with the statistics of every block in order.
///
/// `out[n..]` is never written, and neither is anything when the call fails
/// before the first block.
pub fn decode_with<E, F>(
    config: &CodecConfig,
    input: &[u8],
    n: usize,
    out: &mut [E],
    mut on_block: F,
) -> Result<usize, PforError>
where
    E: Element,
    F: FnMut(&BlockStats),
{
    if out.len() < n {
        return Err(PforError::BufferTooSmall {
            required: n,
            actual: out.len(),
        });
    }
    if n == 0 {
        return Ok(0);
    }

    let mut cursor = Cursor::new(input);
    let key: u64 = leb128::decode_one(&mut cursor)
        .map_err(|e| PforError::CorruptStream(format!("baseline: {}", e)))?;
    let first = E::from_baseline_key(key);
    if first.baseline_key() != key {
        return Err(PforError::CorruptStream(format!(
            "baseline key {} out of range for {:?}",
            key,
            E::TYPE
        )));
    }

    let mut offset = cursor.position() as usize;
    let mut prev = delta::seed(first.to_word(), config.direction, config.delta_base);
    for (index, chunk) in out[..n].chunks_mut(config.block_size()).enumerate() {
        let (mut stats, last) = block::decode_block(&input[offset..], prev, config, chunk)?;
        if index == 0 && chunk[0] != first {
            return Err(PforError::CorruptStream(
                "first element disagrees with the baseline".to_string(),
            ));
        }
        stats.index = index;
        on_block(&stats);
        offset += stats.encoded_len;
        prev = last;
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockWidth, Direction};

    #[test]
    fn test_empty_stream() {
        let config = CodecConfig::default();
        let mut out = [0u8; 4];
        assert_eq!(encode::<i32>(&config, &[], &mut out).unwrap(), 0);
        let mut decoded: [i32; 0] = [];
        assert_eq!(decode(&config, &[], 0, &mut decoded).unwrap(), 0);
    }

    #[test]
    fn test_single_zero_element() {
        let config = CodecConfig::default();
        let mut out = vec![0u8; max_compressed_len::<i32>(&config, 1)];
        let written = encode(&config, &[0i32], &mut out).unwrap();
        // Baseline, count, width; a zero-width payload takes no bytes.
        assert_eq!(&out[..written], &[0, 1, 0]);

        let mut decoded = [99i32];
        assert_eq!(decode(&config, &out[..written], 1, &mut decoded).unwrap(), written);
        assert_eq!(decoded, [0]);
    }

    #[test]
    fn test_multi_block_roundtrip_reports_blocks() {
        let config = CodecConfig::p4nd1(BlockWidth::W128).with_direction(Direction::Decreasing);
        let input: Vec<i64> = (0..300).map(|i| 1_000_000 - 3 * i).collect();
        let mut out = vec![0u8; max_compressed_len::<i64>(&config, input.len())];
        let written = encode(&config, &input, &mut out).unwrap();

        let mut decoded = vec![0i64; input.len()];
        let mut seen = Vec::new();
        let consumed = decode_with(&config, &out[..written], input.len(), &mut decoded, |s| {
            seen.push(s.clone())
        })
        .unwrap();
        assert_eq!(consumed, written);
        assert_eq!(decoded, input);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].index, 2);
        assert_eq!(seen[2].count, 44);
    }

    #[test]
    fn test_encode_refuses_short_buffer_without_writing() {
        let config = CodecConfig::default();
        let input: Vec<u32> = (0..10).collect();
        let mut out = vec![0xAAu8; max_compressed_len::<u32>(&config, 10) - 1];
        let result = encode(&config, &input, &mut out);
        assert!(matches!(result, Err(PforError::BufferTooSmall { .. })));
        assert!(out.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_decode_refuses_short_output() {
        let config = CodecConfig::default();
        let mut decoded = [0u32; 3];
        let result = decode(&config, &[0, 4, 0], 4, &mut decoded);
        assert!(matches!(
            result,
            Err(PforError::BufferTooSmall { required: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_out_of_range_baseline_is_corrupt() {
        let config = CodecConfig::default();
        let mut stream = [0u8; 16];
        let written = leb128::encode_one(1u64 << 40, &mut stream).unwrap();
        let mut decoded = [0u32; 1];
        let result = decode(&config, &stream[..written], 1, &mut decoded);
        assert!(matches!(result, Err(PforError::CorruptStream(_))));
    }
}
