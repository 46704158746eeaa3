//! Serde helpers for hex-encoded values
//!
//! Field attributes for the JSON forms used by the request and response
//! bodies: bytes as `0x` hex, 32-byte hashes, and uint256 values that may be
//! given as a JSON number, a decimal string or a `0x` hex string.

use crate::utils::codec;
use ethers_core::types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

fn lenient_bytes(s: &str) -> Vec<u8> {
    // "" and a bare "0x" mean empty call data
    if s.is_empty() || s == "0x" || s == "0X" {
        Vec::new()
    } else {
        codec::to_bytes(s)
    }
}

/// `Vec<u8>` as `0x` hex; accepts hex or plain UTF-8 text on input
pub mod bytes {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::bytes_to_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(lenient_bytes(&s))
    }
}

/// `Option<Vec<u8>>`, same encoding as [`bytes`]
pub mod opt_bytes {
    use super::*;

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&codec::bytes_to_hex(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        Ok(opt.map(|s| lenient_bytes(&s)))
    }
}

/// `Vec<u8>` as `0x` hex; input must be hex, text is rejected
pub mod strict_bytes {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::bytes_to_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        codec::hex_to_bytes(&s)
            .map_err(|e| de::Error::custom(format!("expected hex bytes: {}", e.message)))
    }
}

/// `[u8; 32]` as `0x` hex (prefix optional on input)
pub mod hex32 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::bytes_to_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = codec::hex_to_bytes(&s).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| de::Error::custom("expected 32 bytes"))
    }
}

struct U256Visitor;

impl<'de> Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer, decimal string or 0x hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative value {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        codec::parse_u256(v).map_err(E::custom)
    }
}

/// `U256` as a decimal string; accepts number, decimal or hex on input
pub mod u256 {
    use super::*;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(U256Visitor)
    }
}

/// `Option<U256>`, same encoding as [`u256`]
pub mod opt_u256 {
    use super::*;

    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::u256")] U256);

        let opt: Option<Wrapped> = Option::deserialize(deserializer)?;
        Ok(opt.map(|Wrapped(v)| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        #[serde(with = "bytes")]
        data: Vec<u8>,
        #[serde(with = "u256")]
        value: U256,
        #[serde(default, with = "opt_u256", skip_serializing_if = "Option::is_none")]
        nonce: Option<U256>,
        #[serde(default, with = "opt_bytes", skip_serializing_if = "Option::is_none")]
        extra: Option<Vec<u8>>,
    }

    #[test]
    fn test_u256_accepts_number_decimal_and_hex() {
        for input in [
            r#"{"data":"0x","value":1000}"#,
            r#"{"data":"0x","value":"1000"}"#,
            r#"{"data":"0x","value":"0x3e8"}"#,
        ] {
            let sample: Sample = serde_json::from_str(input).unwrap();
            assert_eq!(sample.value, U256::from(1000u64), "{}", input);
        }
    }

    #[test]
    fn test_u256_rejects_negative() {
        assert!(serde_json::from_str::<Sample>(r#"{"data":"","value":-1}"#).is_err());
    }

    #[test]
    fn test_u256_serializes_as_decimal() {
        let sample = Sample {
            data: vec![0xde, 0xad],
            value: U256::from(31u64),
            nonce: None,
            extra: None,
        };
        assert_eq!(
            serde_json::to_string(&sample).unwrap(),
            r#"{"data":"0xdead","value":"31"}"#
        );
    }

    #[test]
    fn test_bytes_hex_text_and_empty() {
        let sample: Sample = serde_json::from_str(r#"{"data":"hello","value":0}"#).unwrap();
        assert_eq!(sample.data, b"hello".to_vec());

        let sample: Sample = serde_json::from_str(r#"{"data":"0x","value":0}"#).unwrap();
        assert!(sample.data.is_empty());

        let sample: Sample =
            serde_json::from_str(r#"{"data":"0xAB","value":0,"nonce":"7","extra":"0x01"}"#)
                .unwrap();
        assert_eq!(sample.data, vec![0xab]);
        assert_eq!(sample.nonce, Some(U256::from(7u64)));
        assert_eq!(sample.extra, Some(vec![1]));
    }

    #[test]
    fn test_strict_bytes_rejects_text() {
        #[derive(Serialize, Deserialize)]
        struct Sig(#[serde(with = "strict_bytes")] Vec<u8>);

        let sig: Sig = serde_json::from_str("\"0xab01\"").unwrap();
        assert_eq!(sig.0, vec![0xab, 0x01]);
        assert!(serde_json::from_str::<Sig>("\"0xzz01\"").is_err());
        assert!(serde_json::from_str::<Sig>("\"hello\"").is_err());
    }

    #[test]
    fn test_hex32_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Digest(#[serde(with = "hex32")] [u8; 32]);

        let json = serde_json::to_string(&Digest([0x11; 32])).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "11".repeat(32)));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, [0x11; 32]);

        assert!(serde_json::from_str::<Digest>("\"0x1111\"").is_err());
    }
}
