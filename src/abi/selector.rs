//! Function selector calculation

use crate::utils::crypto::keccak256;

/// ABI selector calculator
pub struct AbiSelector;

impl AbiSelector {
    /// First 4 bytes of keccak256(signature)
    pub fn selector_from_signature(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Selector as hex string (with 0x prefix)
    pub fn selector_hex(signature: &str) -> String {
        format!("0x{}", hex::encode(Self::selector_from_signature(signature)))
    }
}

/// Signatures of the Safe v1.3.0 entry points this crate calls
pub mod signatures {
    pub const SETUP: &str =
        "setup(address[],uint256,address,bytes,address,address,uint256,address)";
    pub const EXEC_TRANSACTION: &str = "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";
    pub const NONCE: &str = "nonce()";
    pub const APPROVE_HASH: &str = "approveHash(bytes32)";
    pub const CREATE_PROXY_WITH_NONCE: &str = "createProxyWithNonce(address,bytes,uint256)";
}

/// Well-known Safe function selectors
pub struct KnownSelectors;

impl KnownSelectors {
    // GnosisSafe singleton
    pub const SETUP: [u8; 4] = [0xb6, 0x3e, 0x80, 0x0d];
    pub const EXEC_TRANSACTION: [u8; 4] = [0x6a, 0x76, 0x12, 0x02];
    pub const NONCE: [u8; 4] = [0xaf, 0xfe, 0xd0, 0xe0];
    pub const APPROVE_HASH: [u8; 4] = [0xd4, 0xd9, 0xbd, 0xcd];

    // GnosisSafeProxyFactory
    pub const CREATE_PROXY_WITH_NONCE: [u8; 4] = [0x16, 0x88, 0xf0, 0xb9];
}
