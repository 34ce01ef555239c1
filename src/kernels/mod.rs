//! This module declares the collection of pure, stateless kernels the block
//! pipeline is assembled from.
//!
//! Every kernel works on caller-owned slices and fixed-size stack scratch; none
//! of them allocates. Kernels know nothing about stream layout beyond their own
//! section of it.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Layer 1: Value Reduction
pub mod delta;

/// Layer 2: Width Selection
pub mod bitwidth;

/// Layer 3: Bit-Width Reduction
pub mod bitpack;
pub mod lanepack;

/// Layer 4: Outlier Handling
pub mod patch;

/// Scalar Encodings
pub mod leb128;
pub mod zigzag;
