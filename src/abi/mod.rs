//! ABI encoding for the Safe contract interfaces
//!
//! Covers the subset of Solidity types the proxy factory and singleton use:
//! - static words (uint8, uint256, address, bytes32)
//! - dynamic `bytes` and `T[]`
//! - function selectors and single-word result decoding

pub mod decoder;
pub mod encoder;
pub mod selector;
pub mod types;

pub use decoder::*;
pub use encoder::*;
pub use selector::*;
pub use types::*;
