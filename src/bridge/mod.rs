// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the sole public-facing API of the pfor library. It validates the
// configuration and the CPU once, then hands caller buffers straight to the pure
// `pipeline` engine.
//
// Data Flow (Compression):
//
//   1. [Codec::new / with_capabilities]  -> CodecConfig validated, capability checked
//         |
//   2. [Codec::encode<E>]                -> Receives `&[E]` and `&mut [u8]`
//         |
//         `-> pipeline::stream::encode   -> baseline, then per block:
//               delta -> bitwidth -> patch -> lanepack | bitpack
//
// Data Flow (Decompression):
//
//   1. [Codec::decode<E>]                -> Receives `&[u8]`, `n` and `&mut [E]`
//         |
//         `-> pipeline::stream::decode   -> baseline, then per block:
//               lanepack | bitpack -> patch -> inverse delta into out[..n]
//
// The byte-level dispatchers and `analyze` wrap the same two calls, selecting the
// element type from an `ElementType` tag.
//
// ====================================================================================
pub mod codec;
pub mod format;
pub mod stateless_api;

// --- Typed API ---
pub use codec::Codec;

// --- Stateless API (presets, byte-level dispatch and analysis) ---
pub use stateless_api::{
    analyze, dispatch_decode, dispatch_encode, p4nd1dec128v32, p4nd1dec256v32, p4nd1dec64,
    p4nd1enc128v32, p4nd1enc256v32, p4nd1enc64,
};

// --- Result Structs ---
pub use format::CompressionStats;
