//! This module contains the pure, stateless kernels for performing Zig-zag
//! encoding and decoding.
//!
//! The codec uses it for exactly one value per stream: the absolute baseline of a
//! signed sequence. Zig-zag keeps small negative baselines (common after negating
//! an increasing run) down to one or two varint bytes.

use crate::traits::{HasSigned, HasUnsigned};

/// Signed integers that can be zig-zag mapped onto their unsigned counterpart.
pub trait ZigZag: HasUnsigned + Sized {
    fn zigzag(self) -> Self::Unsigned;
    fn unzigzag(n: Self::Unsigned) -> Self;
}

macro_rules! impl_zigzag {
    ($S:ty, $U:ty) => {
        impl ZigZag for $S {
            #[inline(always)]
            fn zigzag(self) -> $U {
                // The right shift must be arithmetic.
                ((self << 1) ^ (self >> (<$S>::BITS - 1))) as $U
            }

            #[inline(always)]
            fn unzigzag(n: $U) -> $S {
                ((n >> 1) as $S) ^ -((n & 1) as $S)
            }
        }
    };
}

impl_zigzag!(i32, u32);
impl_zigzag!(i64, u64);

/// Encodes a single signed integer using the Zig-zag algorithm.
#[inline]
pub fn encode_val<T: ZigZag>(n: T) -> T::Unsigned {
    n.zigzag()
}

/// Decodes a single unsigned integer back to its signed representation.
#[inline]
pub fn decode_val<U>(n: U) -> U::Signed
where
    U: HasSigned,
    U::Signed: ZigZag<Unsigned = U>,
{
    <U::Signed as ZigZag>::unzigzag(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_known_values() {
        assert_eq!(encode_val(0i32), 0u32);
        assert_eq!(encode_val(-1i32), 1u32);
        assert_eq!(encode_val(1i32), 2u32);
        assert_eq!(encode_val(-2i32), 3u32);
        assert_eq!(encode_val(i32::MAX), u32::MAX - 1);
        assert_eq!(encode_val(i32::MIN), u32::MAX);
    }

    #[test]
    fn test_zigzag_roundtrip_extremes() {
        for v in [0i64, 1, -1, 42, -42, i64::MAX, i64::MIN, i64::MIN + 1] {
            assert_eq!(decode_val(encode_val(v)), v);
        }
        for v in [0i32, 7, -7, i32::MAX, i32::MIN] {
            assert_eq!(decode_val(encode_val(v)), v);
        }
    }
}
