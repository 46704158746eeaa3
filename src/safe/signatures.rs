//! Signature Aggregator
//!
//! Turns signer output into Safe's signature encoding and packs a set of
//! signatures into the byte string `execTransaction` expects.
//!
//! Safe distinguishes signature kinds by the final `v` byte:
//!
//! | v       | meaning                                               |
//! |---------|-------------------------------------------------------|
//! | 1       | approved on chain via `approveHash` (r = owner)       |
//! | 27, 28  | ECDSA over the raw digest                             |
//! | 31, 32  | ECDSA over the `eth_sign` prefixed digest (v + 4)     |
//!
//! Signers here sign the prefixed digest, so direct signatures are always
//! shifted into the 31/32 range.

use super::types::SafeSignature;
use crate::eip712::{eth_signed_message_hash, recover_address, Eip712Signature};
use crate::error::{SafeError, SafeResult};
use crate::utils::codec::bytes_to_hex;
use ethers_core::types::Address;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Length of one encoded signature
pub const SIGNATURE_LENGTH: usize = 65;

/// `v` of an on-chain approval placeholder
pub const APPROVED_HASH_V: u8 = 1;

/// Offset added to `v` for signatures over the `eth_sign` prefixed digest
pub const ETH_SIGN_V_OFFSET: u8 = 4;

/// Stateless signature helpers
pub struct SignatureAggregator;

impl SignatureAggregator {
    /// Rewrite a trailing `v` of 27/28 to Safe's eth_sign marker 31/32.
    /// Values already in Safe form pass through.
    pub fn normalize(data: &[u8]) -> SafeResult<Vec<u8>> {
        if data.len() != SIGNATURE_LENGTH {
            return Err(SafeError::invalid_signature(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                data.len()
            )));
        }

        let mut normalized = data.to_vec();
        let v = normalized[SIGNATURE_LENGTH - 1];
        normalized[SIGNATURE_LENGTH - 1] = match v {
            27 | 28 => v + ETH_SIGN_V_OFFSET,
            31 | 32 | APPROVED_HASH_V => v,
            other => {
                return Err(SafeError::invalid_signature(format!(
                    "unsupported signature type v={}",
                    other
                )))
            }
        };

        Ok(normalized)
    }

    /// Wrap raw signer output for `signer`.
    ///
    /// Only ECDSA output is accepted: `v` of 27/28, or a bare 0/1 recovery
    /// id. Safe markers (1 as approval, 31/32) never come from a signer and
    /// are rejected here; `normalize` handles those for presupplied data.
    pub fn direct(signer: Address, raw: &Eip712Signature) -> SafeResult<SafeSignature> {
        let mut data = raw.to_bytes().to_vec();
        data[SIGNATURE_LENGTH - 1] = match raw.v {
            0 | 1 => raw.v + 27 + ETH_SIGN_V_OFFSET,
            27 | 28 => raw.v + ETH_SIGN_V_OFFSET,
            other => {
                return Err(SafeError::invalid_signature(format!(
                    "signer returned unexpected v={}",
                    other
                )))
            }
        };

        let signature = SafeSignature { signer, data };
        Self::validate(&signature)?;
        Ok(signature)
    }

    /// Placeholder for an owner who approved the digest on chain:
    /// `r = leftpad32(owner)`, `s = 0`, `v = 1`
    pub fn approval(signer: Address) -> SafeSignature {
        let mut data = vec![0u8; SIGNATURE_LENGTH];
        data[12..32].copy_from_slice(signer.as_bytes());
        data[SIGNATURE_LENGTH - 1] = APPROVED_HASH_V;
        SafeSignature { signer, data }
    }

    /// Reject zero signers and malformed data
    pub fn validate(signature: &SafeSignature) -> SafeResult<()> {
        if signature.signer.is_zero() {
            return Err(SafeError::invalid_signature("signer cannot be the zero address"));
        }
        if signature.data.is_empty() {
            return Err(SafeError::invalid_signature("signature data is empty")
                .with_details(bytes_to_hex(signature.signer.as_bytes())));
        }
        if signature.data.len() != SIGNATURE_LENGTH {
            return Err(SafeError::invalid_signature(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                signature.data.len()
            ))
            .with_details(bytes_to_hex(signature.signer.as_bytes())));
        }
        Ok(())
    }

    /// Sort by signer and concatenate
    pub fn finalize(signatures: &[SafeSignature]) -> SafeResult<SignatureBundle> {
        let mut set = SignatureSet::new();
        set.extend(signatures.iter().cloned())?;
        Ok(set.finalize())
    }

    /// Address that produced `signature` over `digest`
    pub fn recover_signer(digest: &[u8; 32], signature: &SafeSignature) -> SafeResult<Address> {
        Self::validate(signature)?;
        let v = signature.data[SIGNATURE_LENGTH - 1];

        match v {
            APPROVED_HASH_V => Ok(Address::from_slice(&signature.data[12..32])),
            27 | 28 => {
                let raw = Eip712Signature::from_bytes(&signature.data)?;
                Ok(recover_address(digest, &raw)?)
            }
            31 | 32 => {
                let mut raw = Eip712Signature::from_bytes(&signature.data)?;
                raw.v -= ETH_SIGN_V_OFFSET;
                Ok(recover_address(&eth_signed_message_hash(digest), &raw)?)
            }
            other => Err(SafeError::invalid_signature(format!(
                "unsupported signature type v={}",
                other
            ))),
        }
    }
}

/// Signatures keyed by signer, kept in ascending signer order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet {
    entries: BTreeMap<Address, SafeSignature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature; a second entry for the same signer is rejected
    pub fn insert(&mut self, signature: SafeSignature) -> SafeResult<()> {
        SignatureAggregator::validate(&signature)?;

        if self.entries.contains_key(&signature.signer) {
            return Err(SafeError::duplicate_signer("signer already present in the set")
                .with_details(bytes_to_hex(signature.signer.as_bytes())));
        }
        self.entries.insert(signature.signer, signature);
        Ok(())
    }

    pub fn extend(&mut self, signatures: impl IntoIterator<Item = SafeSignature>) -> SafeResult<()> {
        for signature in signatures {
            self.insert(signature)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, signer: &Address) -> bool {
        self.entries.contains_key(signer)
    }

    /// Signatures in ascending signer order
    pub fn signatures(&self) -> Vec<SafeSignature> {
        self.entries.values().cloned().collect()
    }

    /// Concatenated signature data in ascending signer order
    pub fn finalize(&self) -> SignatureBundle {
        let mut bytes = Vec::with_capacity(self.entries.len() * SIGNATURE_LENGTH);
        for signature in self.entries.values() {
            bytes.extend_from_slice(&signature.data);
        }
        SignatureBundle(bytes)
    }
}

/// The packed `signatures` argument of `execTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBundle(Vec<u8>);

impl SignatureBundle {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

impl Serialize for SignatureBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::sign_hash;
    use crate::utils::crypto::keccak256;
    use secp256k1::SecretKey;

    fn signer(byte: u64) -> Address {
        Address::from_low_u64_be(byte)
    }

    fn sig_with_v(signer_byte: u64, v: u8) -> SafeSignature {
        let mut data = vec![signer_byte as u8; SIGNATURE_LENGTH];
        data[SIGNATURE_LENGTH - 1] = v;
        SafeSignature { signer: signer(signer_byte), data }
    }

    #[test]
    fn test_normalize_rewrites_v() {
        let mut raw = vec![0x11; SIGNATURE_LENGTH];
        raw[64] = 27;
        assert_eq!(SignatureAggregator::normalize(&raw).unwrap()[64], 31);
        raw[64] = 28;
        assert_eq!(SignatureAggregator::normalize(&raw).unwrap()[64], 32);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for v in [27u8, 28, 31, 32, 1] {
            let mut raw = vec![0x22; SIGNATURE_LENGTH];
            raw[64] = v;
            let once = SignatureAggregator::normalize(&raw).unwrap();
            let twice = SignatureAggregator::normalize(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_rejects_unknown_v_and_length() {
        let mut raw = vec![0x33; SIGNATURE_LENGTH];
        raw[64] = 0;
        assert!(SignatureAggregator::normalize(&raw).is_err());
        assert!(SignatureAggregator::normalize(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_approval_layout() {
        let owner = signer(0xabcdef);
        let sig = SignatureAggregator::approval(owner);

        assert_eq!(sig.data.len(), 65);
        assert!(sig.data[..12].iter().all(|&b| b == 0));
        assert_eq!(&sig.data[12..32], owner.as_bytes());
        assert!(sig.data[32..64].iter().all(|&b| b == 0));
        assert_eq!(sig.data[64], 1);
    }

    #[test]
    fn test_finalize_sorts_by_signer() {
        let a = sig_with_v(0x0a, 31);
        let b = sig_with_v(0x0b, 32);
        let c = SignatureAggregator::approval(signer(0x0c));

        let bundle = SignatureAggregator::finalize(&[c.clone(), a.clone(), b.clone()]).unwrap();
        let expected: Vec<u8> = [a.data, b.data, c.data].concat();
        assert_eq!(bundle.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_finalize_is_pure() {
        let sigs = vec![sig_with_v(2, 31), sig_with_v(1, 32)];
        assert_eq!(
            SignatureAggregator::finalize(&sigs).unwrap(),
            SignatureAggregator::finalize(&sigs).unwrap()
        );
    }

    #[test]
    fn test_duplicate_signer_rejected() {
        let mut set = SignatureSet::new();
        set.insert(sig_with_v(1, 31)).unwrap();
        let err = set.insert(sig_with_v(1, 32)).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DuplicateSigner);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_invalid_signatures_rejected() {
        let zero_signer = SafeSignature {
            signer: Address::zero(),
            data: vec![0u8; 65],
        };
        let empty = SafeSignature {
            signer: signer(1),
            data: vec![],
        };
        for sig in [zero_signer, empty] {
            let err = SignatureSet::new().insert(sig).unwrap_err();
            assert_eq!(err.code, crate::error::ErrorCode::InvalidSignature);
        }
    }

    #[test]
    fn test_recover_signer_for_each_kind() {
        let key = SecretKey::from_slice(&[0x01; 32]).unwrap();
        let owner = crate::eip712::secret_key_to_address(&key);
        let digest = keccak256(b"pending action");

        // eth_sign flavour, as produced by the local key signer
        let raw = sign_hash(&eth_signed_message_hash(&digest), &key);
        let sig = SignatureAggregator::direct(owner, &raw).unwrap();
        assert!(sig.data[64] == 31 || sig.data[64] == 32);
        assert_eq!(SignatureAggregator::recover_signer(&digest, &sig).unwrap(), owner);

        // plain ECDSA over the digest
        let raw = sign_hash(&digest, &key);
        let sig = SafeSignature { signer: owner, data: raw.to_bytes().to_vec() };
        assert_eq!(SignatureAggregator::recover_signer(&digest, &sig).unwrap(), owner);

        // approval placeholder
        let sig = SignatureAggregator::approval(owner);
        assert_eq!(SignatureAggregator::recover_signer(&digest, &sig).unwrap(), owner);
    }

    #[test]
    fn test_direct_maps_recovery_id() {
        let key = SecretKey::from_slice(&[0x02; 32]).unwrap();
        let owner = crate::eip712::secret_key_to_address(&key);

        // signers that report a 0/1 recovery id, over several digests so
        // both parities show up
        for i in 0u8..8 {
            let digest = keccak256(&[i]);
            let mut raw = sign_hash(&eth_signed_message_hash(&digest), &key);
            raw.v -= 27;

            let sig = SignatureAggregator::direct(owner, &raw).unwrap();
            assert!(sig.data[64] == 31 || sig.data[64] == 32);
            assert_eq!(SignatureAggregator::recover_signer(&digest, &sig).unwrap(), owner);
        }
    }

    #[test]
    fn test_direct_rejects_safe_markers() {
        let key = SecretKey::from_slice(&[0x03; 32]).unwrap();
        let owner = crate::eip712::secret_key_to_address(&key);
        let mut raw = sign_hash(&keccak256(b"digest"), &key);

        for v in [31u8, 32, 2, 26, 29] {
            raw.v = v;
            let err = SignatureAggregator::direct(owner, &raw).unwrap_err();
            assert_eq!(err.code, crate::error::ErrorCode::InvalidSignature);
        }
    }

    #[test]
    fn test_bundle_serializes_as_hex() {
        let bundle = SignatureBundle::from_bytes(vec![0xab, 0xcd]);
        assert_eq!(serde_json::to_string(&bundle).unwrap(), "\"0xabcd\"");
    }
}
