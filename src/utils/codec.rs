//! Byte Codec
//!
//! Conversions between hex strings, byte buffers and unsigned integers.
//! The wire form is lowercase, `0x`-prefixed hex.
//!
//! [`to_bytes`] is deliberately lenient: anything that does not look like hex
//! is treated as UTF-8 text. Callers that require hex must check
//! [`is_hex_string`] first or use the strict [`hex_to_bytes`].

use crate::error::{SafeError, SafeResult};
use ethers_core::types::{Address, U256};

/// Whether `value` matches `^(0x)?[0-9a-f]+$`, case-insensitive
pub fn is_hex_string(value: &str) -> bool {
    let digits = strip_prefix(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether `value` starts with a lowercase `0x`
pub fn has_hex_prefix(value: &str) -> bool {
    value.starts_with("0x")
}

/// Remove a leading `0x` if present
pub fn remove_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Prefix with `0x` and lowercase the digits
pub fn ensure_hex_prefix(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let lower = value.to_lowercase();
    if lower.starts_with("0x") {
        lower
    } else {
        format!("0x{}", lower)
    }
}

/// Encode bytes in the canonical wire form
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Convert a hex or UTF-8 string into bytes. Never fails.
///
/// Odd-length hex is left-padded with a single zero nibble.
pub fn to_bytes(hex_or_utf8: &str) -> Vec<u8> {
    if is_hex_string(hex_or_utf8) {
        // is_hex_string guarantees the digits decode
        decode_hex_digits(strip_prefix(hex_or_utf8)).unwrap_or_default()
    } else {
        hex_or_utf8.as_bytes().to_vec()
    }
}

/// Strictly decode a hex string (prefix optional). `""` and `"0x"` are empty.
pub fn hex_to_bytes(value: &str) -> SafeResult<Vec<u8>> {
    let digits = strip_prefix(value.trim());
    if digits.is_empty() {
        return Ok(Vec::new());
    }
    decode_hex_digits(digits)
}

/// Convert a decimal string of any length into big-endian bytes without
/// leading zeros (zero is a single `0x00` byte).
pub fn decimal_to_bytes(value: &str) -> SafeResult<Vec<u8>> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SafeError::invalid_input(format!(
            "Not a decimal number: '{}'",
            value
        )));
    }

    let mut bytes: Vec<u8> = vec![0];
    for digit in digits.bytes() {
        let mut carry = u32::from(digit - b'0');
        for byte in bytes.iter_mut().rev() {
            let acc = u32::from(*byte) * 10 + carry;
            *byte = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    Ok(trim_leading_zeros(&bytes).to_vec())
}

/// Convert a decimal string of any length to a minimal `0x` hex string.
///
/// e.g. `"16"` -> `"0x10"`, `"0"` -> `"0x0"`
pub fn decimal_to_hex_string(value: &str) -> SafeResult<String> {
    let bytes = decimal_to_bytes(value)?;
    let encoded = hex::encode(bytes);
    let trimmed = encoded.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0x0".to_string())
    } else {
        Ok(format!("0x{}", trimmed))
    }
}

/// Convert a decimal string to hex; values already `0x`-prefixed pass through
pub fn to_hex_string_if_needed(value: &str) -> SafeResult<String> {
    if has_hex_prefix(value) {
        Ok(value.to_string())
    } else {
        decimal_to_hex_string(value)
    }
}

/// Parse a uint256 from a decimal or `0x` hex string.
pub fn parse_u256(value: &str) -> SafeResult<U256> {
    let value = value.trim();
    let bytes = if value.starts_with("0x") || value.starts_with("0X") {
        let digits = &value[2..];
        if digits.is_empty() {
            return Err(SafeError::invalid_input("Empty hex number"));
        }
        decode_hex_digits(digits)?
    } else {
        decimal_to_bytes(value)?
    };

    let significant = trim_leading_zeros(&bytes);
    if significant.len() > 32 {
        return Err(SafeError::invalid_input(format!(
            "Number exceeds 256 bits: '{}'",
            value
        )));
    }
    Ok(U256::from_big_endian(significant))
}

/// Big-endian 32-byte word for a uint256
pub fn u256_to_bytes32(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Parse a 20-byte address; checksum casing is not enforced
pub fn parse_address(value: &str) -> SafeResult<Address> {
    let digits = strip_prefix(value.trim());
    if digits.len() != 40 {
        return Err(SafeError::invalid_input(format!(
            "Invalid address length: expected 40 hex chars, got {}",
            digits.len()
        )));
    }
    let bytes = hex::decode(digits)
        .map_err(|e| SafeError::invalid_input(format!("Invalid address '{}': {}", value, e)))?;
    Ok(Address::from_slice(&bytes))
}

fn strip_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn decode_hex_digits(digits: &str) -> SafeResult<Vec<u8>> {
    if digits.len() % 2 == 1 {
        Ok(hex::decode(format!("0{}", digits))?)
    } else {
        Ok(hex::decode(digits)?)
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b != 0) {
        Some(start) => &bytes[start..],
        None => &bytes[bytes.len().saturating_sub(1)..],
    }
}
