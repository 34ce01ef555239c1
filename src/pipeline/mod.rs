//! The pure block-pipeline engine.
//!
//! `stream` assembles and parses whole streams, `block` handles one block at a
//! time, and `format` owns the byte layout both agree on. Nothing here checks
//! CPU capabilities; that is the job of the `bridge::Codec` that calls in.

pub mod block;
pub mod format;
pub mod stream;

pub use format::{BlockLayout, BlockStats};
