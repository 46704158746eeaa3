//! EIP-712 Typed Data Hashing
//!
//! Structured-data hashing and secp256k1 signing used for Safe transaction
//! digests.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use safe_relay::eip712::{Eip712Domain, Eip712PreImage};
//!
//! let domain = Eip712Domain::for_contract(chain_id, wallet);
//! let pre = Eip712PreImage::compute(&domain, "SafeTx", &fields, &values)?;
//! ```

pub mod encoder;
pub mod hasher;
pub mod signer;
pub mod types;

pub use encoder::*;
pub use hasher::*;
pub use signer::*;
pub use types::*;
