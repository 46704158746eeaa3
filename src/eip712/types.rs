//! EIP-712 Type Definitions
//!
//! Typed values, domains and signatures for structured-data hashing.

use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "bytes")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// The EIP-712 domain
///
/// Only the members that are present take part in the domain type, so a
/// domain carrying just `chainId` and `verifyingContract` hashes as
/// `EIP712Domain(uint256 chainId,address verifyingContract)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U256>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<[u8; 32]>,
}

impl Eip712Domain {
    /// Domain bound to a chain and a verifying contract only
    pub fn for_contract(chain_id: U256, verifying_contract: Address) -> Self {
        Self {
            chain_id: Some(chain_id),
            verifying_contract: Some(verifying_contract),
            ..Default::default()
        }
    }

    /// Field list of the `EIP712Domain` type, in canonical order
    pub fn fields(&self) -> Vec<TypedDataField> {
        let mut fields = Vec::new();

        if self.name.is_some() {
            fields.push(TypedDataField::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(TypedDataField::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(TypedDataField::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            fields.push(TypedDataField::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            fields.push(TypedDataField::new("salt", "bytes32"));
        }

        fields
    }

    /// Values matching [`Eip712Domain::fields`]
    pub fn values(&self) -> Vec<Eip712Value> {
        let mut values = Vec::new();

        if let Some(ref name) = self.name {
            values.push(Eip712Value::String(name.clone()));
        }
        if let Some(ref version) = self.version {
            values.push(Eip712Value::String(version.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            values.push(Eip712Value::Uint(chain_id));
        }
        if let Some(contract) = self.verifying_contract {
            values.push(Eip712Value::Address(contract));
        }
        if let Some(salt) = self.salt {
            values.push(Eip712Value::FixedBytes(salt));
        }

        values
    }
}

/// A typed member value of an EIP-712 struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eip712Value {
    Address(Address),
    Uint(U256),
    FixedBytes([u8; 32]),
    /// Dynamic bytes, encoded as their keccak256
    Bytes(Vec<u8>),
    /// Dynamic string, encoded as keccak256 of its UTF-8 bytes
    String(String),
}

/// Raw signature components
#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct Eip712Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// recovery id, typically 27 or 28
    pub v: u8,
}

impl Eip712Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Create from 65-byte signature (r || s || v)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Eip712Error> {
        if bytes.len() != 65 {
            return Err(Eip712Error::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s, v: bytes[64] })
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// Errors that can occur during EIP-712 operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Eip712Error {
    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing error: {0}")]
    SigningError(String),
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    if type_name == "address" || type_name == "bool" {
        return true;
    }

    if let Some(bits) = type_name.strip_prefix("uint") {
        if let Ok(n) = bits.parse::<u32>() {
            return n > 0 && n <= 256 && n % 8 == 0;
        }
    }

    if let Some(size) = type_name.strip_prefix("bytes") {
        if let Ok(n) = size.parse::<u32>() {
            return n > 0 && n <= 32;
        }
    }

    false
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}
