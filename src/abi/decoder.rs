//! Decoding of single-word call results

use super::types::AbiError;
use ethers_core::types::U256;

/// ABI decoder for static return values
pub struct AbiDecoder;

impl AbiDecoder {
    /// Decode the first word of `data` as a uint256
    pub fn decode_uint256(data: &[u8]) -> Result<U256, AbiError> {
        let word = Self::first_word(data)?;
        Ok(U256::from_big_endian(word))
    }

    fn first_word(data: &[u8]) -> Result<&[u8], AbiError> {
        if data.len() < 32 {
            return Err(AbiError::DecodingError(format!(
                "expected at least 32 bytes, got {}",
                data.len()
            )));
        }
        Ok(&data[..32])
    }
}
