//! This module defines the core, strongly-typed data representations shared by
//! the typed API and the byte-level dispatchers.
//!
//! It currently holds the canonical `ElementType` tag, which selects one of the
//! closed set of element implementations when data arrives as raw bytes.

pub mod element_type;

// Re-export the main type(s) for easier access.
pub use element_type::ElementType;
