//! ECDSA signing and recovery over 32-byte digests

use super::types::*;
use crate::utils::crypto::{keccak256, keccak256_concat};
use ethers_core::types::Address;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Prefix applied by `eth_sign` / `personal_sign` to a 32-byte payload
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// keccak256("\x19Ethereum Signed Message:\n32" || digest)
pub fn eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[ETH_SIGNED_MESSAGE_PREFIX, digest])
}

/// Sign a pre-computed hash; `v` is 27 or 28
pub fn sign_hash(hash: &[u8; 32], secret_key: &SecretKey) -> Eip712Signature {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(*hash);

    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[0..32]);
    s.copy_from_slice(&compact[32..64]);

    Eip712Signature::new(r, s, recovery_id.to_i32() as u8 + 27)
}

/// Recover the signer's address from a signature over `hash`
///
/// Accepts `v` as 0/1 or 27/28.
pub fn recover_address(hash: &[u8; 32], signature: &Eip712Signature) -> Result<Address, Eip712Error> {
    let recovery = match signature.v {
        0 | 1 => signature.v,
        27 | 28 => signature.v - 27,
        other => {
            return Err(Eip712Error::InvalidSignature(format!(
                "unsupported recovery byte {}",
                other
            )))
        }
    };

    let recovery_id = RecoveryId::from_i32(i32::from(recovery))
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[0..32].copy_from_slice(&signature.r);
    compact[32..64].copy_from_slice(&signature.s);

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let secp = Secp256k1::verification_only();
    let public_key = secp
        .recover_ecdsa(&Message::from_digest(*hash), &recoverable)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    Ok(public_key_to_address(&public_key))
}

/// Ethereum address of a secp256k1 public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // uncompressed key without the 0x04 tag
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Address controlled by a secret key
pub fn secret_key_to_address(secret_key: &SecretKey) -> Address {
    let secp = Secp256k1::signing_only();
    public_key_to_address(&PublicKey::from_secret_key(&secp, secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::checksum;

    // Well-known development key, never use with real funds
    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    fn test_key() -> SecretKey {
        SecretKey::from_slice(&hex::decode(TEST_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_secret_key_to_address() {
        assert_eq!(checksum(&secret_key_to_address(&test_key())), TEST_ADDRESS);
    }

    #[test]
    fn test_sign_and_recover() {
        let hash = keccak256(b"safe transaction");
        let signature = sign_hash(&hash, &test_key());

        assert!(signature.v == 27 || signature.v == 28);
        let recovered = recover_address(&hash, &signature).unwrap();
        assert_eq!(checksum(&recovered), TEST_ADDRESS);
    }

    #[test]
    fn test_recover_accepts_zero_based_v() {
        let hash = keccak256(b"zero based");
        let mut signature = sign_hash(&hash, &test_key());
        let expected = recover_address(&hash, &signature).unwrap();

        signature.v -= 27;
        assert_eq!(recover_address(&hash, &signature).unwrap(), expected);
    }

    #[test]
    fn test_recover_rejects_unknown_v() {
        let hash = keccak256(b"bad v");
        let mut signature = sign_hash(&hash, &test_key());
        signature.v = 31;
        assert!(matches!(
            recover_address(&hash, &signature),
            Err(Eip712Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_eth_signed_message_hash() {
        let digest = [0xab; 32];
        let mut buf = b"\x19Ethereum Signed Message:\n32".to_vec();
        buf.extend_from_slice(&digest);
        assert_eq!(eth_signed_message_hash(&digest), keccak256(&buf));
    }
}
