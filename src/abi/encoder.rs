//! ABI encoder for contract call data

use super::selector::AbiSelector;
use super::types::*;
use crate::utils::codec::u256_to_bytes32;
use ethers_core::types::U256;

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a single value according to its type
    pub fn encode_value(value: &AbiValue, abi_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        match (value, abi_type) {
            (AbiValue::Uint(u), AbiType::Uint256) => Ok(u256_to_bytes32(u).to_vec()),

            (AbiValue::Uint(u), AbiType::Uint8) => {
                if *u > U256::from(u8::MAX) {
                    return Err(AbiError::ValueOutOfRange {
                        type_name: "uint8".to_string(),
                        value: u.to_string(),
                    });
                }
                Ok(u256_to_bytes32(u).to_vec())
            }

            (AbiValue::Address(addr), AbiType::Address) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(addr.as_bytes());
                Ok(word.to_vec())
            }

            (AbiValue::FixedBytes(bytes), AbiType::Bytes32) => Ok(bytes.to_vec()),

            (AbiValue::Bytes(bytes), AbiType::Bytes) => Ok(Self::encode_dynamic_bytes(bytes)),

            (AbiValue::Array(values), AbiType::Array(inner_type)) => {
                Self::encode_dynamic_array(values, inner_type)
            }

            _ => Err(AbiError::TypeMismatch {
                expected: abi_type.canonical_type(),
                got: value.kind().to_string(),
            }),
        }
    }

    /// Encode multiple values as a tuple (function parameters)
    pub fn encode(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        if values.len() != types.len() {
            return Err(AbiError::EncodingError(format!(
                "Value count {} doesn't match type count {}",
                values.len(),
                types.len()
            )));
        }

        Self::encode_tuple(values, types)
    }

    fn encode_tuple(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        let head_size: usize = types.iter().map(|t| t.head_size()).sum();

        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for (value, abi_type) in values.iter().zip(types.iter()) {
            let encoded = Self::encode_value(value, abi_type)?;
            if abi_type.is_dynamic() {
                // head holds the offset of the tail entry
                let offset = U256::from(head_size + tail.len());
                head.extend_from_slice(&u256_to_bytes32(&offset));
                tail.extend_from_slice(&encoded);
            } else {
                head.extend_from_slice(&encoded);
            }
        }

        head.extend_from_slice(&tail);
        Ok(head)
    }

    /// Length word followed by the data right-padded to a word boundary
    fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
        let padded_len = bytes.len().div_ceil(32) * 32;

        let mut result = Vec::with_capacity(32 + padded_len);
        result.extend_from_slice(&u256_to_bytes32(&U256::from(bytes.len())));
        result.extend_from_slice(bytes);
        result.resize(32 + padded_len, 0);
        result
    }

    fn encode_dynamic_array(
        values: &[AbiValue],
        inner_type: &AbiType,
    ) -> Result<Vec<u8>, AbiError> {
        let mut result = u256_to_bytes32(&U256::from(values.len())).to_vec();

        let types: Vec<AbiType> = vec![inner_type.clone(); values.len()];
        result.extend_from_slice(&Self::encode_tuple(values, &types)?);

        Ok(result)
    }

    /// Encode a function call by signature string
    /// e.g. `"approveHash(bytes32)"` with values
    pub fn encode_function_call_by_signature(
        signature: &str,
        values: &[AbiValue],
    ) -> Result<Vec<u8>, AbiError> {
        let selector = AbiSelector::selector_from_signature(signature);
        let types = Self::parse_types_from_signature(signature)?;

        if types.len() != values.len() {
            return Err(AbiError::EncodingError(format!(
                "Expected {} values for signature '{}', got {}",
                types.len(),
                signature,
                values.len()
            )));
        }

        let params = Self::encode(values, &types)?;

        let mut result = Vec::with_capacity(4 + params.len());
        result.extend_from_slice(&selector);
        result.extend_from_slice(&params);
        Ok(result)
    }

    /// Parameter types of a flat signature such as `"f(address,bytes)"`
    pub fn parse_types_from_signature(signature: &str) -> Result<Vec<AbiType>, AbiError> {
        let start = signature
            .find('(')
            .ok_or_else(|| AbiError::InvalidSignature(format!("Missing '(' in {}", signature)))?;
        let end = signature
            .rfind(')')
            .ok_or_else(|| AbiError::InvalidSignature(format!("Missing ')' in {}", signature)))?;
        if end < start {
            return Err(AbiError::InvalidSignature(signature.to_string()));
        }

        let params = &signature[start + 1..end];
        if params.trim().is_empty() {
            return Ok(vec![]);
        }

        params.split(',').map(AbiType::parse).collect()
    }
}
