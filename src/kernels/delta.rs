//! This module contains the pure, stateless kernels for the delta transform and
//! its inverse.
//!
//! The transform runs in the unsigned word domain of the element type with
//! wrapping arithmetic, so every input maps losslessly onto a delta stream, even
//! when it moves against the assumed direction. Only the compression ratio
//! suffers in that case.
//!
//! Direction and delta base come from the codec variant; nothing here inspects
//! the data to guess them.

use num_traits::{WrappingAdd, WrappingSub};

use crate::config::{DeltaBase, Direction};
use crate::traits::{Element, Word};

//==================================================================================
// 1. Public API
//==================================================================================

/// The virtual predecessor of the first element of a stream: the word whose
/// delta to `first` is zero, so slot 0 of block 0 always packs as `0`.
pub fn seed<W: Word>(first: W, direction: Direction, base: DeltaBase) -> W {
    let base = W::narrow(base.offset());
    match direction {
        Direction::Increasing => first.wrapping_sub(&base),
        Direction::Decreasing => first.wrapping_add(&base),
    }
}

/// Writes the delta of every element of `block` against its predecessor into
/// `out`. `prev` is the word of the element preceding `block[0]`.
///
/// Returns the word of the last element, i.e. the predecessor of the next block.
pub fn encode_block<E: Element>(
    block: &[E],
    mut prev: E::Word,
    direction: Direction,
    base: DeltaBase,
    out: &mut [E::Word],
) -> E::Word {
    let base = E::Word::narrow(base.offset());
    for (slot, &value) in out.iter_mut().zip(block) {
        let x = value.to_word();
        let step = match direction {
            Direction::Increasing => x.wrapping_sub(&prev),
            Direction::Decreasing => prev.wrapping_sub(&x),
        };
        *slot = step.wrapping_sub(&base);
        prev = x;
    }
    prev
}

/// Prefix-sums `deltas` starting from `prev` and writes the reconstructed
/// elements into `out`. Exactly `min(deltas.len(), out.len())` slots are written.
///
/// Returns the word of the last reconstructed element.
pub fn decode_block<E: Element>(
    deltas: &[E::Word],
    mut prev: E::Word,
    direction: Direction,
    base: DeltaBase,
    out: &mut [E],
) -> E::Word {
    let base = E::Word::narrow(base.offset());
    for (slot, &delta) in out.iter_mut().zip(deltas) {
        let step = delta.wrapping_add(&base);
        prev = match direction {
            Direction::Increasing => prev.wrapping_add(&step),
            Direction::Decreasing => prev.wrapping_sub(&step),
        };
        *slot = E::from_word(prev);
    }
    prev
}

//==================================================================================
// 2. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_d1_increasing_known_values() {
        let block: Vec<i32> = vec![11, 12, 15, 15];
        let mut deltas = [0u32; 4];
        let last = encode_block(&block, 10u32, Direction::Increasing, DeltaBase::One, &mut deltas);
        assert_eq!(deltas, [0, 0, 2, u32::MAX]);
        assert_eq!(last, 15);

        let mut decoded = [0i32; 4];
        decode_block(&deltas, 10u32, Direction::Increasing, DeltaBase::One, &mut decoded);
        assert_eq!(decoded.to_vec(), block);
    }

    #[test]
    fn test_decreasing_plain_delta() {
        let block: Vec<u64> = vec![95, 90, 90, 0];
        let mut deltas = [0u64; 4];
        encode_block(&block, 100u64, Direction::Decreasing, DeltaBase::Zero, &mut deltas);
        assert_eq!(deltas, [5, 5, 0, 90]);

        let mut decoded = [0u64; 4];
        decode_block(&deltas, 100u64, Direction::Decreasing, DeltaBase::Zero, &mut decoded);
        assert_eq!(decoded.to_vec(), block);
    }

    #[test]
    fn test_wrong_direction_still_roundtrips() {
        let block: Vec<i64> = vec![i64::MIN, i64::MAX, -1, 0, i64::MIN];
        let mut deltas = [0u64; 5];
        encode_block(&block, 0u64, Direction::Decreasing, DeltaBase::One, &mut deltas);

        let mut decoded = [0i64; 5];
        decode_block(&deltas, 0u64, Direction::Decreasing, DeltaBase::One, &mut decoded);
        assert_eq!(decoded.to_vec(), block);
    }

    #[test]
    fn test_decode_writes_only_delta_count() {
        let deltas = [0u32, 0];
        let mut out = [-1i32; 4];
        decode_block(&deltas, 5u32, Direction::Increasing, DeltaBase::One, &mut out);
        assert_eq!(out, [6, 7, -1, -1]);
    }

    #[test]
    fn test_seed_gives_zero_first_delta() {
        for direction in [Direction::Increasing, Direction::Decreasing] {
            for base in [DeltaBase::Zero, DeltaBase::One] {
                let block = [i32::MIN, 3];
                let prev = seed((i32::MIN).to_word(), direction, base);
                let mut deltas = [7u32; 2];
                encode_block(&block, prev, direction, base, &mut deltas);
                assert_eq!(deltas[0], 0);

                let mut decoded = [0i32; 2];
                decode_block(&deltas, prev, direction, base, &mut decoded);
                assert_eq!(decoded, block);
            }
        }
    }

    fn roundtrip_through_element<E: Element>(values: &[E], direction: Direction) {
        let prev = seed(values[0].to_word(), direction, DeltaBase::One);
        let mut deltas = vec![E::Word::zero(); values.len()];
        let last = encode_block(values, prev, direction, DeltaBase::One, &mut deltas);
        assert_eq!(deltas[0], E::Word::zero());
        assert_eq!(last, values[values.len() - 1].to_word());

        let mut decoded = vec![E::from_word(E::Word::zero()); values.len()];
        decode_block(&deltas, prev, direction, DeltaBase::One, &mut decoded);
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_every_element_type_roundtrips() {
        for direction in [Direction::Increasing, Direction::Decreasing] {
            roundtrip_through_element(&[i32::MIN, -1, 0, i32::MAX], direction);
            roundtrip_through_element(&[0u32, 7, 7, u32::MAX], direction);
            roundtrip_through_element(&[i64::MAX, i64::MIN, 3], direction);
            roundtrip_through_element(&[u64::MAX, 0, 1 << 40], direction);
        }
    }

    #[test]
    fn test_empty_block() {
        let mut deltas: [u32; 0] = [];
        let last = encode_block::<u32>(&[], 42, Direction::Increasing, DeltaBase::One, &mut deltas);
        assert_eq!(last, 42);
    }
}
