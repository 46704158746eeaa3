//! Call data for the Safe singleton and proxy factory

use super::signatures::SignatureBundle;
use super::types::{AccountConfig, ExecutionRequest, PendingAction};
use crate::abi::{signatures, AbiEncoder, AbiValue, KnownSelectors};
use crate::error::SafeResult;
use ethers_core::types::{Address, U256};

/// Encoders for the handful of Safe entry points the relay calls
pub struct SafeCalls;

impl SafeCalls {
    /// `setup(owners, threshold, to, data, fallbackHandler, paymentToken, payment, paymentReceiver)`
    ///
    /// Owners are encoded in ascending order so the result does not depend
    /// on the order the caller listed them in. Absent initializer addresses
    /// become the deployment's sentinel.
    pub fn setup(config: &AccountConfig) -> SafeResult<Vec<u8>> {
        let init = &config.initializer;
        let sentinel = config.deployment.sentinel_address;
        let data = AbiEncoder::encode_function_call_by_signature(
            signatures::SETUP,
            &[
                AbiValue::address_array(&config.sorted_owners()),
                AbiValue::uint(config.threshold),
                AbiValue::Address(init.to.unwrap_or(sentinel)),
                AbiValue::Bytes(init.data.clone().unwrap_or_default()),
                AbiValue::Address(config.deployment.fallback_handler),
                AbiValue::Address(init.payment_token.unwrap_or(sentinel)),
                AbiValue::Uint(init.payment_amount.unwrap_or_default()),
                AbiValue::Address(init.payment_receiver.unwrap_or(sentinel)),
            ],
        )?;
        Ok(data)
    }

    /// `createProxyWithNonce(singleton, initializer, saltNonce)` on the factory
    pub fn create_proxy_with_nonce(
        master: Address,
        initializer: &[u8],
        salt_nonce: U256,
    ) -> SafeResult<Vec<u8>> {
        let data = AbiEncoder::encode_function_call_by_signature(
            signatures::CREATE_PROXY_WITH_NONCE,
            &[
                AbiValue::Address(master),
                AbiValue::Bytes(initializer.to_vec()),
                AbiValue::Uint(salt_nonce),
            ],
        )?;
        Ok(data)
    }

    /// `execTransaction(...)` carrying the finalized signature bundle
    pub fn exec_transaction(action: &PendingAction, bundle: &SignatureBundle) -> SafeResult<Vec<u8>> {
        let data = AbiEncoder::encode_function_call_by_signature(
            signatures::EXEC_TRANSACTION,
            &[
                AbiValue::Address(action.to()),
                AbiValue::Uint(action.value()),
                AbiValue::Bytes(action.data().to_vec()),
                AbiValue::uint(u8::from(action.operation())),
                AbiValue::Uint(action.safe_tx_gas()),
                AbiValue::Uint(action.base_gas()),
                AbiValue::Uint(action.gas_price()),
                AbiValue::Address(action.gas_token()),
                AbiValue::Address(action.refund_receiver()),
                AbiValue::Bytes(bundle.as_bytes().to_vec()),
            ],
        )?;
        Ok(data)
    }

    /// `approveHash(bytes32)`
    pub fn approve_hash(digest: &[u8; 32]) -> SafeResult<Vec<u8>> {
        let data = AbiEncoder::encode_function_call_by_signature(
            signatures::APPROVE_HASH,
            &[AbiValue::FixedBytes(*digest)],
        )?;
        Ok(data)
    }

    /// `nonce()`
    pub fn nonce() -> Vec<u8> {
        KnownSelectors::NONCE.to_vec()
    }

    /// Outer call deploying the wallet described by `config`
    pub fn deployment_request(config: &AccountConfig) -> SafeResult<ExecutionRequest> {
        let initializer = Self::setup(config)?;
        let data = Self::create_proxy_with_nonce(
            config.deployment.master_address,
            &initializer,
            config.salt_nonce,
        )?;
        Ok(ExecutionRequest {
            to: config.deployment.proxy_factory_address,
            value: U256::zero(),
            data,
        })
    }
}
