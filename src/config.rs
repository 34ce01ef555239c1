// In: src/config.rs

//! The single source of truth for codec configuration.
//!
//! A `CodecConfig` fixes everything that must agree between the encoder and the
//! decoder of one stream: the block width (and therefore the lane layout), the
//! assumed direction of the sequence, the delta base and the exception budget.
//! None of it is stored in the stream itself, so the same config has to be used
//! on both sides.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PforError;

//==================================================================================
// I. Variant Enums
//==================================================================================

/// The SIMD lane group a variant is laid out for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockWidth {
    /// **Default:** 128-element blocks, 128-bit lane group. Runs everywhere.
    #[default]
    W128,

    /// 256-element blocks, 256-bit lane group. Requires the wide vector
    /// extension (see `capability::supports_wide_variant`).
    W256,
}

impl BlockWidth {
    /// Number of elements in a full block.
    pub const fn block_size(self) -> usize {
        match self {
            Self::W128 => 128,
            Self::W256 => 256,
        }
    }

    /// Width in bits of the vector register the layout targets.
    pub const fn vector_bits(self) -> u32 {
        match self {
            Self::W128 => 128,
            Self::W256 => 256,
        }
    }

    /// Number of parallel lanes for elements of `element_bits` bits.
    pub const fn lanes(self, element_bits: u32) -> usize {
        (self.vector_bits() / element_bits) as usize
    }

    pub const fn is_wide(self) -> bool {
        matches!(self, Self::W256)
    }
}

impl fmt::Display for BlockWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v", self.vector_bits())
    }
}

/// The direction the sequence is assumed to move in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Increasing,
    Decreasing,
}

/// The minimum step the variant assumes between consecutive elements.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeltaBase {
    /// Plain deltas, suited to non-strictly monotonic runs.
    Zero,

    /// **Default:** "d1" deltas (step minus one), suited to strictly monotonic runs.
    #[default]
    One,
}

impl DeltaBase {
    pub const fn offset(self) -> u64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

/// Configuration of one codec variant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    #[serde(default)]
    pub block_width: BlockWidth,

    #[serde(default)]
    pub direction: Direction,

    #[serde(default)]
    pub delta_base: DeltaBase,

    /// Maximum number of patched values per block. `None` selects
    /// `block_size / 16`. `Some(0)` disables patching.
    #[serde(default)]
    pub exception_budget: Option<usize>,
}

impl CodecConfig {
    /// The p4nd1 layout: increasing, d1 deltas, default budget.
    pub const fn p4nd1(block_width: BlockWidth) -> Self {
        Self {
            block_width,
            direction: Direction::Increasing,
            delta_base: DeltaBase::One,
            exception_budget: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_delta_base(mut self, delta_base: DeltaBase) -> Self {
        self.delta_base = delta_base;
        self
    }

    pub fn with_exception_budget(mut self, budget: usize) -> Self {
        self.exception_budget = Some(budget);
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_width.block_size()
    }

    /// The effective exception budget for one block.
    pub fn effective_exception_budget(&self) -> usize {
        self.exception_budget
            .unwrap_or_else(|| default_exception_budget(self.block_size()))
    }

    /// Rejects settings that cannot describe a valid stream.
    pub fn validate(&self) -> Result<(), PforError> {
        let budget = self.effective_exception_budget();
        if budget > self.block_size() {
            return Err(PforError::InvalidConfig(format!(
                "exception budget {} exceeds block size {}",
                budget,
                self.block_size()
            )));
        }
        Ok(())
    }

    /// Parses and validates a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, PforError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, PforError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Helper providing the default per-block exception budget.
fn default_exception_budget(block_size: usize) -> usize {
    block_size / 16
}
