//! EIP-712 Hashing
//!
//! Domain separator, struct hashing and the final `0x1901` digest.

use super::encoder::encode_data;
use super::types::*;
use crate::utils::crypto::{keccak256, keccak256_concat};

/// Magic prefix for EIP-712 encoding
pub const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// domainSeparator = hashStruct(eip712Domain)
pub fn domain_separator(domain: &Eip712Domain) -> Result<[u8; 32], Eip712Error> {
    hash_struct("EIP712Domain", &domain.fields(), &domain.values())
}

/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    fields: &[TypedDataField],
    values: &[Eip712Value],
) -> Result<[u8; 32], Eip712Error> {
    Ok(keccak256(&encode_data(type_name, fields, values)?))
}

/// keccak256("\x19\x01" || domainSeparator || structHash)
pub fn typed_data_hash(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[EIP712_PREFIX, domain_separator, struct_hash])
}

/// The three hashes behind a signed digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub digest: [u8; 32],
}

impl Eip712PreImage {
    pub fn compute(
        domain: &Eip712Domain,
        type_name: &str,
        fields: &[TypedDataField],
        values: &[Eip712Value],
    ) -> Result<Self, Eip712Error> {
        let domain_separator = domain_separator(domain)?;
        let struct_hash = hash_struct(type_name, fields, values)?;
        Ok(Self {
            domain_separator,
            struct_hash,
            digest: typed_data_hash(&domain_separator, &struct_hash),
        })
    }
}
