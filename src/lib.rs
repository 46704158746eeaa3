//! Safe Relay Core Library
//!
//! Coordination core for Safe (Gnosis Safe) multisig wallets.
//!
//! # Architecture
//!
//! This crate provides:
//! - **safe**: Address derivation, SafeTx hashing, signature aggregation
//!   and the execution workflow
//! - **tx**: Async capabilities (nonce query, digest signing, broadcast),
//!   a local key signer and a JSON-RPC adapter
//! - **eip712**: Typed-data hashing and secp256k1 signing
//! - **abi**: The static ABI layouts the Safe contracts need
//! - **utils**: Byte codec, hashing, logging and configuration
//!
//! # Security
//!
//! Private keys are held in `secrecy`/`zeroize` wrappers and are never
//! written to logs; log fields named like keys are masked.
//!
//! # Example
//!
//! ```rust,ignore
//! use safe_relay::safe::{AccountConfig, AddressDeriver};
//!
//! let config = AccountConfig::new(owners, 2, 7u64.into());
//! println!("Safe address: {}", AddressDeriver::derive_checksummed(&config)?);
//! ```

pub mod abi;
pub mod eip712;
pub mod error;
pub mod safe;
pub mod serde_hex;
pub mod tx;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use error::{ErrorCode, SafeError, SafeResult};
pub use types::ApiResponse;

pub use safe::{
    AccountConfig, AddressDeriver, CanonicalHasher, CreateOptions, ExecutionReceipt,
    PendingAction, SafeDeployment, SafeSignature, SignatureAggregator, SignatureSet,
    TransactionAssembler, TransactionIntent,
};
pub use tx::{Broadcaster, ChainClient, DigestSigner, JsonRpcClient, LocalKeySigner};

// Re-export crypto utilities for binaries
pub use utils::crypto::{keccak256, to_checksum_address};
