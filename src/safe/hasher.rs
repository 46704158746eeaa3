//! Canonical SafeTx digest
//!
//! The digest every owner signs:
//!
//! ```text
//! domainSeparator = hashStruct(EIP712Domain(uint256 chainId,address verifyingContract))
//! structHash      = hashStruct(SafeTx(...))
//! digest          = keccak256(0x19 || 0x01 || domainSeparator || structHash)
//! ```

use super::types::{ActionDraft, PendingAction};
use crate::eip712::{
    domain_separator, hash_struct, type_hash, Eip712Domain, Eip712PreImage, Eip712Value,
    TypedDataField,
};
use crate::error::{SafeError, SafeResult};
use crate::tx::ChainClient;
use ethers_core::types::{Address, U256};

/// Primary type name of a Safe transaction
pub const SAFE_TX_TYPE: &str = "SafeTx";

/// Hashing of Safe transactions
pub struct CanonicalHasher;

impl CanonicalHasher {
    /// Members of `SafeTx`, in contract order
    pub fn safe_tx_fields() -> Vec<TypedDataField> {
        vec![
            TypedDataField::new("to", "address"),
            TypedDataField::new("value", "uint256"),
            TypedDataField::new("data", "bytes"),
            TypedDataField::new("operation", "uint8"),
            TypedDataField::new("safeTxGas", "uint256"),
            TypedDataField::new("baseGas", "uint256"),
            TypedDataField::new("gasPrice", "uint256"),
            TypedDataField::new("gasToken", "address"),
            TypedDataField::new("refundReceiver", "address"),
            TypedDataField::new("nonce", "uint256"),
        ]
    }

    /// keccak256 of the `SafeTx(...)` type string
    pub fn type_hash() -> [u8; 32] {
        type_hash(SAFE_TX_TYPE, &Self::safe_tx_fields())
    }

    pub fn domain(wallet: Address, chain_id: u64) -> Eip712Domain {
        Eip712Domain::for_contract(U256::from(chain_id), wallet)
    }

    pub fn domain_separator(wallet: Address, chain_id: u64) -> SafeResult<[u8; 32]> {
        Ok(domain_separator(&Self::domain(wallet, chain_id))?)
    }

    fn values(action: &PendingAction) -> Vec<Eip712Value> {
        vec![
            Eip712Value::Address(action.to()),
            Eip712Value::Uint(action.value()),
            Eip712Value::Bytes(action.data().to_vec()),
            Eip712Value::Uint(U256::from(u8::from(action.operation()))),
            Eip712Value::Uint(action.safe_tx_gas()),
            Eip712Value::Uint(action.base_gas()),
            Eip712Value::Uint(action.gas_price()),
            Eip712Value::Address(action.gas_token()),
            Eip712Value::Address(action.refund_receiver()),
            Eip712Value::Uint(action.nonce()),
        ]
    }

    pub fn struct_hash(action: &PendingAction) -> SafeResult<[u8; 32]> {
        Ok(hash_struct(SAFE_TX_TYPE, &Self::safe_tx_fields(), &Self::values(action))?)
    }

    /// Domain separator, struct hash and digest together
    pub fn pre_image(wallet: Address, action: &PendingAction, chain_id: u64) -> SafeResult<Eip712PreImage> {
        Ok(Eip712PreImage::compute(
            &Self::domain(wallet, chain_id),
            SAFE_TX_TYPE,
            &Self::safe_tx_fields(),
            &Self::values(action),
        )?)
    }

    /// The digest owners sign; equals `getTransactionHash` on the wallet
    pub fn transaction_hash(wallet: Address, action: &PendingAction, chain_id: u64) -> SafeResult<[u8; 32]> {
        Ok(Self::pre_image(wallet, action, chain_id)?.digest)
    }

    /// Fix the draft's nonce, asking the chain when the caller gave none
    pub async fn resolve_nonce(
        chain: &dyn ChainClient,
        wallet: Address,
        draft: ActionDraft,
    ) -> SafeResult<PendingAction> {
        let nonce = match draft.nonce {
            Some(nonce) => nonce,
            None => chain.query_nonce(wallet).await.map_err(|e| {
                SafeError::nonce_unavailable(format!("could not read wallet nonce: {}", e.message))
            })?,
        };
        Ok(draft.resolve(nonce))
    }
}
