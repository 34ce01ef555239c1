//! This module defines the shared numeric traits used across the codec.
//!
//! `Element` is the closed set of integer types the codec accepts. Every element
//! maps bit-for-bit onto an unsigned `Word` of the same width, which is the domain
//! all deltas, packed values and exceptions live in.

use num_traits::{PrimInt, Unsigned, WrappingAdd, WrappingSub};
use std::fmt::Debug;

use crate::kernels::zigzag;
use crate::types::ElementType;

/// A trait that maps a signed integer type to its unsigned counterpart.
pub trait HasUnsigned {
    type Unsigned;
}

/// A trait that maps an unsigned integer type to its signed counterpart.
pub trait HasSigned {
    type Signed;
}

// Implement the traits for the primitive integer types the codec handles.
macro_rules! impl_signed_unsigned_pair {
    ($S:ty, $U:ty) => {
        impl HasUnsigned for $S {
            type Unsigned = $U;
        }
        impl HasSigned for $U {
            type Signed = $S;
        }
    };
}

impl_signed_unsigned_pair!(i32, u32);
impl_signed_unsigned_pair!(i64, u64);

//==================================================================================
// 1. Word: the unsigned delta domain
//==================================================================================

/// An unsigned machine word that packed values are stored in.
pub trait Word:
    PrimInt + Unsigned + WrappingAdd + WrappingSub + bytemuck::Pod + Debug + Default + Send + Sync + 'static
{
    const BITS: u32;
    const BYTES: usize;

    /// Zero-extends the word to 64 bits.
    fn widen(self) -> u64;

    /// Keeps the low `Self::BITS` bits of `value`.
    fn narrow(value: u64) -> Self;

    /// Number of significant bits, i.e. `ceil(log2(self + 1))`.
    #[inline(always)]
    fn bit_len(self) -> u8 {
        (<Self as Word>::BITS - self.leading_zeros()) as u8
    }

    /// Mask with the low `bits` bits set. `bits` may equal `Self::BITS`.
    #[inline(always)]
    fn low_mask(bits: u8) -> Self {
        if bits as u32 >= <Self as Word>::BITS {
            Self::max_value()
        } else {
            (Self::one() << bits as usize) - Self::one()
        }
    }

    /// Writes the word little-endian into `out[..Self::BYTES]`.
    fn write_le(self, out: &mut [u8]);

    /// Reads a little-endian word from `bytes[..Self::BYTES]`.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_word {
    ($U:ty) => {
        impl Word for $U {
            const BITS: u32 = <$U>::BITS;
            const BYTES: usize = std::mem::size_of::<$U>();

            #[inline(always)]
            fn widen(self) -> u64 {
                self as u64
            }

            #[inline(always)]
            fn narrow(value: u64) -> Self {
                value as $U
            }

            #[inline(always)]
            fn write_le(self, out: &mut [u8]) {
                out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
            }

            #[inline(always)]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$U>()];
                buf.copy_from_slice(&bytes[..Self::BYTES]);
                <$U>::from_le_bytes(buf)
            }
        }
    };
}

impl_word!(u32);
impl_word!(u64);

//==================================================================================
// 2. Element: the closed set of accepted integer types
//==================================================================================

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
}

/// An integer type the codec can compress.
///
/// Sealed: the set is `i32`, `u32`, `i64` and `u64`.
pub trait Element: Copy + PartialEq + Debug + bytemuck::Pod + Send + Sync + sealed::Sealed + 'static {
    type Word: Word;
    const TYPE: ElementType;

    /// Reinterprets the bit pattern in the unsigned word domain.
    fn to_word(self) -> Self::Word;

    /// Inverse of `to_word`.
    fn from_word(word: Self::Word) -> Self;

    /// Maps the element to a varint-friendly key. Signed types are zig-zag
    /// mapped so small negative baselines stay short.
    fn baseline_key(self) -> u64;

    /// Inverse of `baseline_key`. Excess high bits are discarded.
    fn from_baseline_key(key: u64) -> Self;
}

macro_rules! impl_signed_element {
    ($S:ty, $U:ty, $tag:expr) => {
        impl Element for $S {
            type Word = $U;
            const TYPE: ElementType = $tag;

            #[inline(always)]
            fn to_word(self) -> $U {
                self as $U
            }

            #[inline(always)]
            fn from_word(word: $U) -> Self {
                word as $S
            }

            #[inline]
            fn baseline_key(self) -> u64 {
                zigzag::encode_val(self) as u64
            }

            #[inline]
            fn from_baseline_key(key: u64) -> Self {
                zigzag::decode_val(key as $U)
            }
        }
    };
}

macro_rules! impl_unsigned_element {
    ($U:ty, $tag:expr) => {
        impl Element for $U {
            type Word = $U;
            const TYPE: ElementType = $tag;

            #[inline(always)]
            fn to_word(self) -> $U {
                self
            }

            #[inline(always)]
            fn from_word(word: $U) -> Self {
                word
            }

            #[inline]
            fn baseline_key(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_baseline_key(key: u64) -> Self {
                key as $U
            }
        }
    };
}

impl_signed_element!(i32, u32, ElementType::Int32);
impl_signed_element!(i64, u64, ElementType::Int64);
impl_unsigned_element!(u32, ElementType::UInt32);
impl_unsigned_element!(u64, ElementType::UInt64);
