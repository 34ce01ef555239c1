//! This file is the root of the `pfor_codec` Rust crate.
//!
//! A patched frame-of-reference delta codec ("p4nd1" family) for sequences of
//! 32- and 64-bit integers, with 128- and 256-element lane-aligned blocks.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`pipeline`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface: `Codec`, its configuration, the named
//!     presets and the capability probe.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod capability;
pub mod config;
pub mod kernels;
pub mod pipeline;

mod error;
mod traits;
mod types;
mod utils;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    analyze, dispatch_decode, dispatch_encode, p4nd1dec128v32, p4nd1dec256v32, p4nd1dec64,
    p4nd1enc128v32, p4nd1enc256v32, p4nd1enc64, Codec, CompressionStats,
};
pub use capability::{supports_wide_variant, Capabilities};
pub use config::{BlockWidth, CodecConfig, DeltaBase, Direction};
pub use error::PforError;
pub use observability::enable_verbose_logging;
pub use pipeline::{BlockLayout, BlockStats};
pub use traits::{Element, Word};
pub use types::ElementType;
