//! ABI type definitions for the Safe contract calls

use ethers_core::types::{Address, U256};
use std::fmt;

/// Solidity types used by the Safe factory and singleton interfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Uint8,
    Uint256,
    Address,
    Bytes32,
    // Dynamic bytes
    Bytes,
    // Dynamic array T[]
    Array(Box<AbiType>),
}

impl AbiType {
    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::Bytes | AbiType::Array(_))
    }

    /// Every supported type occupies one word in the head
    pub fn head_size(&self) -> usize {
        32
    }

    /// Parse a type from its canonical name
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();

        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(Self::parse(inner)?)));
        }

        match s {
            "uint8" => Ok(AbiType::Uint8),
            "uint256" | "uint" => Ok(AbiType::Uint256),
            "address" => Ok(AbiType::Address),
            "bytes32" => Ok(AbiType::Bytes32),
            "bytes" => Ok(AbiType::Bytes),
            _ => Err(AbiError::InvalidType(format!("Unsupported type: {}", s))),
        }
    }

    /// Canonical name as it appears in a function signature
    pub fn canonical_type(&self) -> String {
        match self {
            AbiType::Uint8 => "uint8".to_string(),
            AbiType::Uint256 => "uint256".to_string(),
            AbiType::Address => "address".to_string(),
            AbiType::Bytes32 => "bytes32".to_string(),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_type()),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_type())
    }
}

/// A value to be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address(Address),
    FixedBytes([u8; 32]),
    Bytes(Vec<u8>),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Short description used in mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "bytes32",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Array(_) => "array",
        }
    }

    pub fn uint(value: impl Into<U256>) -> Self {
        AbiValue::Uint(value.into())
    }

    pub fn address_array(addresses: &[Address]) -> Self {
        AbiValue::Array(addresses.iter().copied().map(AbiValue::Address).collect())
    }
}

/// ABI encoding and decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Value out of range for {type_name}: {value}")]
    ValueOutOfRange { type_name: String, value: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}
