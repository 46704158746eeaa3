//! In-memory secp256k1 signer

use super::{DigestSigner, RawSignature};
use crate::eip712::{eth_signed_message_hash, secret_key_to_address, sign_hash};
use crate::error::{SafeError, SafeResult};
use crate::utils::codec::remove_hex_prefix;
use async_trait::async_trait;
use ethers_core::types::Address;
use secp256k1::SecretKey;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Signs digests with a key held in process memory
///
/// Signatures are over the `eth_sign` form of the digest, so the returned
/// `v` is 27/28 and Safe sees them as 31/32 after normalization.
pub struct LocalKeySigner {
    key: SecretKey,
    address: Address,
}

impl LocalKeySigner {
    pub fn new(key: SecretKey) -> Self {
        let address = secret_key_to_address(&key);
        Self { key, address }
    }

    /// Parse a 32-byte hex key, with or without `0x`
    pub fn from_hex(key_hex: &str) -> SafeResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(remove_hex_prefix(key_hex.trim()))
                .map_err(|_| SafeError::signing_error("private key is not valid hex"))?,
        );
        let key = SecretKey::from_slice(&bytes)
            .map_err(|_| SafeError::signing_error("private key is not a valid secp256k1 scalar"))?;
        Ok(Self::new(key))
    }

    pub fn from_secret(secret: &SecretString) -> SafeResult<Self> {
        Self::from_hex(secret.expose_secret())
    }

    /// Fresh random key, for tests and throwaway relayers
    pub fn random() -> Self {
        let secp = secp256k1::Secp256k1::new();
        let (key, _) = secp.generate_keypair(&mut rand::thread_rng());
        Self::new(key)
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DigestSigner for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_digest(&self, digest: &[u8; 32]) -> SafeResult<RawSignature> {
        Ok(sign_hash(&eth_signed_message_hash(digest), &self.key))
    }
}
