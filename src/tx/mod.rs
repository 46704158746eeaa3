//! Transaction Capabilities
//!
//! The network and key custody seams the Safe workflow depends on, plus the
//! concrete in-memory signer and JSON-RPC adapter.

mod broadcaster;
mod signer;

pub use broadcaster::*;
pub use signer::*;

use crate::eip712::Eip712Signature;
use crate::error::SafeResult;
use crate::safe::{ExecutionRequest, TxId};
use async_trait::async_trait;
use ethers_core::types::{Address, U256};

/// Raw `r || s || v` output of a signer, before Safe normalization
pub type RawSignature = Eip712Signature;

/// Read access to wallet state
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current `nonce()` of a deployed wallet
    async fn query_nonce(&self, wallet: Address) -> SafeResult<U256>;
}

/// Something that signs 32-byte digests on behalf of one address
#[async_trait]
pub trait DigestSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_digest(&self, digest: &[u8; 32]) -> SafeResult<RawSignature>;
}

/// Submits outer transactions
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Account that pays for and sends the transaction
    fn sender(&self) -> Address;

    async fn broadcast(&self, request: &ExecutionRequest) -> SafeResult<TxId>;
}
