//! This module defines the canonical, type-safe tag for the element types the
//! codec accepts.

use crate::error::PforError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The element width and signedness of a sequence handed to the codec.
///
/// Byte-level entry points take this tag instead of a generic parameter; the
/// typed API derives it from `Element::TYPE`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementType {
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl ElementType {
    /// Size in bytes of one element.
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Int32 | Self::UInt32 => 4,
            Self::Int64 | Self::UInt64 => 8,
        }
    }

    /// Size in bits of one element.
    pub fn bit_width(&self) -> u32 {
        self.byte_width() as u32 * 8
    }

    /// Returns `true` if the element type is a signed integer.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

/// Provides the canonical string representation for an `ElementType`.
impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for ElementType {
    type Err = PforError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Int32" => Ok(Self::Int32),
            "UInt32" => Ok(Self::UInt32),
            "Int64" => Ok(Self::Int64),
            "UInt64" => Ok(Self::UInt64),
            other => Err(PforError::UnsupportedType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_width_all_types() {
        assert_eq!(ElementType::Int32.byte_width(), 4);
        assert_eq!(ElementType::UInt32.byte_width(), 4);
        assert_eq!(ElementType::Int64.byte_width(), 8);
        assert_eq!(ElementType::UInt64.bit_width(), 64);
    }

    #[test]
    fn test_display_and_parse_agree() {
        for ty in [ElementType::Int32, ElementType::UInt32, ElementType::Int64, ElementType::UInt64] {
            assert_eq!(ty.to_string().parse::<ElementType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_parse_unsupported() {
        let result = "Float32".parse::<ElementType>();
        if let Err(PforError::UnsupportedType(s)) = result {
            assert_eq!(s, "Float32");
        } else {
            panic!("Expected UnsupportedType error");
        }
    }
}
