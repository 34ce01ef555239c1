// In: src/bridge/format.rs

//! Public-facing result structures of the bridge layer.
//!
//! The stream layout itself lives in `pipeline::format`; this module only
//! describes what `analyze` reports about a finished stream.

use serde::{Deserialize, Serialize};

use crate::config::BlockWidth;
use crate::error::PforError;
use crate::pipeline::BlockStats;
use crate::types::ElementType;

/// The public-facing struct for compression analysis results, returned by `analyze`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompressionStats {
    pub element_type: ElementType,
    pub block_width: BlockWidth,
    pub num_elements: usize,
    /// Size of the uncompressed input in bytes.
    pub original_size: usize,
    /// Bytes of the baseline preamble.
    pub baseline_size: usize,
    /// Bytes of the whole stream, preamble included.
    pub total_size: usize,
    pub blocks: Vec<BlockStats>,
}

impl CompressionStats {
    /// Compressed size as a fraction of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.total_size as f64 / self.original_size as f64
    }

    pub fn total_exceptions(&self) -> usize {
        self.blocks.iter().map(|b| b.exceptions).sum()
    }

    pub fn to_json(&self) -> Result<String, PforError> {
        Ok(serde_json::to_string(self)?)
    }
}
