//! Unified error types for the Safe relay core
//!
//! Every operation returns a typed [`SafeError`] whose [`ErrorCode`] tells the
//! caller which class of failure occurred. The core never logs or swallows a
//! failure; the shell decides how to present it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all relay operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SafeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn nonce_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NonceUnavailable, msg)
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignature, msg)
    }

    pub fn duplicate_signer(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateSigner, msg)
    }

    pub fn signing_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningError, msg)
    }

    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Only external read/write failures qualify; the core itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, ErrorCode::NonceUnavailable | ErrorCode::RpcError)
    }
}

impl fmt::Display for SafeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SafeError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Caller errors, never retried
    InvalidConfig,
    InvalidSignature,
    DuplicateSigner,
    InvalidInput,

    // External read/write failures
    NonceUnavailable,
    RpcError,

    // Key handling
    SigningError,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for relay operations
pub type SafeResult<T> = Result<T, SafeError>;

// Conversions from common error types

impl From<serde_json::Error> for SafeError {
    fn from(e: serde_json::Error) -> Self {
        SafeError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SafeError {
    fn from(e: hex::FromHexError) -> Self {
        SafeError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for SafeError {
    fn from(e: std::io::Error) -> Self {
        SafeError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for SafeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SafeError::new(ErrorCode::RpcError, "Request timed out")
        } else if e.is_connect() {
            SafeError::new(ErrorCode::RpcError, "Connection failed")
        } else {
            SafeError::new(ErrorCode::RpcError, e.to_string())
        }
    }
}

impl From<secp256k1::Error> for SafeError {
    fn from(e: secp256k1::Error) -> Self {
        SafeError::new(ErrorCode::SigningError, format!("Secp256k1 error: {}", e))
    }
}

impl From<crate::abi::AbiError> for SafeError {
    fn from(e: crate::abi::AbiError) -> Self {
        SafeError::new(ErrorCode::InvalidInput, format!("ABI encoding failed: {}", e))
    }
}

impl From<crate::eip712::Eip712Error> for SafeError {
    fn from(e: crate::eip712::Eip712Error) -> Self {
        use crate::eip712::Eip712Error;
        let code = match e {
            Eip712Error::InvalidSignature(_) => ErrorCode::InvalidSignature,
            Eip712Error::SigningError(_) => ErrorCode::SigningError,
            _ => ErrorCode::InvalidInput,
        };
        SafeError::new(code, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = SafeError::duplicate_signer("signer appears twice")
            .with_details("0x00000000000000000000000000000000000000aa");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("duplicate_signer"));
        assert!(json.contains("signer appears twice"));
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let json = serde_json::to_string(&SafeError::invalid_config("no owners")).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_retryable_codes() {
        assert!(SafeError::rpc_error("down").is_retryable());
        assert!(SafeError::nonce_unavailable("down").is_retryable());
        assert!(!SafeError::signing_error("revoked").is_retryable());
        assert!(!SafeError::invalid_config("bad").is_retryable());
    }

    #[test]
    fn test_display_includes_details() {
        let err = SafeError::rpc_error("broadcast rejected").with_details("nonce too low");
        assert_eq!(err.to_string(), "[RpcError] broadcast rejected (nonce too low)");
    }
}
