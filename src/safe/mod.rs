//! Safe Multisig Core
//!
//! Address derivation, canonical transaction hashing, signature
//! aggregation and the end-to-end execution workflow for Safe (Gnosis
//! Safe v1.3.0) wallets.
//!
//! # Example
//! ```rust,ignore
//! use safe_relay::safe::{AccountConfig, AddressDeriver};
//!
//! let config = AccountConfig::new(owners, 2, salt_nonce.into());
//! let address = AddressDeriver::derive_checksummed(&config)?;
//! ```

pub mod address;
pub mod assembler;
pub mod calls;
pub mod hasher;
pub mod signatures;
pub mod types;

pub use address::*;
pub use assembler::*;
pub use calls::*;
pub use hasher::*;
pub use signatures::*;
pub use types::*;
