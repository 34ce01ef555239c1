// In: src/error.rs

//! This module defines the single, unified error type for the entire pfor codec.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

use crate::config::BlockWidth;

#[derive(Error, Debug)]
pub enum PforError {
    // =========================================================================
    // === Precondition Failures (detected before any byte is written)
    // =========================================================================
    #[error("The {variant} variant requires a vector extension this CPU does not support")]
    CapabilityMismatch { variant: BlockWidth },

    #[error("Output buffer too small: required {required}, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === Decode-Side Errors
    // =========================================================================
    #[error("Compressed stream is truncated or malformed: {0}")]
    CorruptStream(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error from the Serde JSON library, typically during config/stats serialization.
    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Buffer length mismatch: expected {0}, got {1}")]
    BufferMismatch(usize, usize),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    #[error("Bitpack decoding failed due to truncated buffer or data corruption")]
    BitpackDecodeError,

    #[error("Bitpack encoding error: value {0} exceeds bit width {1}")]
    BitpackEncodeError(u64, u8),
}

impl From<bytemuck::PodCastError> for PforError {
    fn from(err: bytemuck::PodCastError) -> Self {
        PforError::PodCast(err.to_string())
    }
}
