//! JSON-RPC adapter
//!
//! Reads wallet nonces with `eth_call` and submits outer transactions as
//! legacy EIP-155 transactions signed by the relayer key.

use super::{Broadcaster, ChainClient};
use crate::abi::AbiDecoder;
use crate::error::{SafeError, SafeResult};
use crate::safe::{ExecutionRequest, SafeCalls, TxId};
use crate::utils::codec::{bytes_to_hex, hex_to_bytes, parse_u256};
use crate::utils::crypto::checksum;
use async_trait::async_trait;
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, TransactionRequest, U256};
use ethers_signers::{LocalWallet, Signer};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Gas limit of every outer transaction
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: serde_json::Value,
    id: u32,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: Option<i64>,
    message: String,
}

/// Node connection plus the relayer key that pays for outer transactions
pub struct JsonRpcClient {
    client: Client,
    endpoint: Url,
    chain_id: u64,
    relayer: LocalWallet,
}

impl JsonRpcClient {
    pub fn new(endpoint: Url, chain_id: u64, relayer_key: &SecretString) -> SafeResult<Self> {
        let relayer = LocalWallet::from_str(relayer_key.expose_secret())
            .map_err(|_| SafeError::signing_error("relayer key is not a valid private key"))?
            .with_chain_id(chain_id);

        Ok(Self {
            client: create_client()?,
            endpoint,
            chain_id,
            relayer,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> SafeResult<T> {
        crate::log_debug!("rpc", "request", method = method);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id: 1,
            })
            .send()
            .await
            .map_err(|e| SafeError::rpc_error(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(SafeError::rpc_error(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SafeError::parse_error(format!("invalid {} response: {}", method, e)))?;

        if let Some(error) = body.error {
            let err = SafeError::rpc_error(format!("{}: {}", method, error.message));
            return Err(match error.code {
                Some(code) => err.with_details(format!("rpc code {}", code)),
                None => err,
            });
        }

        body.result
            .ok_or_else(|| SafeError::rpc_error(format!("{} returned no result", method)))
    }

    async fn quantity(&self, method: &'static str, params: serde_json::Value) -> SafeResult<U256> {
        let hex: String = self.call(method, params).await?;
        parse_u256(&hex)
    }

    async fn sign_outer(&self, request: &ExecutionRequest) -> SafeResult<Vec<u8>> {
        let sender = self.relayer.address();
        let nonce = self
            .quantity(
                "eth_getTransactionCount",
                serde_json::json!([checksum(&sender), "pending"]),
            )
            .await?;
        let gas_price = self.quantity("eth_gasPrice", serde_json::json!([])).await?;

        let tx = TransactionRequest::new()
            .to(request.to)
            .value(request.value)
            .gas(DEFAULT_GAS_LIMIT)
            .gas_price(gas_price)
            .chain_id(self.chain_id)
            .nonce(nonce)
            .data(request.data.clone());

        let typed_tx: TypedTransaction = tx.into();
        let signature = self
            .relayer
            .sign_transaction(&typed_tx)
            .await
            .map_err(|e| SafeError::signing_error(format!("relayer signing failed: {}", e)))?;

        Ok(typed_tx.rlp_signed(&signature).to_vec())
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn query_nonce(&self, wallet: Address) -> SafeResult<U256> {
        let result: String = self
            .call(
                "eth_call",
                serde_json::json!([
                    { "to": checksum(&wallet), "data": bytes_to_hex(&SafeCalls::nonce()) },
                    "latest"
                ]),
            )
            .await?;

        let bytes = hex_to_bytes(&result)?;
        AbiDecoder::decode_uint256(&bytes)
            .map_err(|_| SafeError::rpc_error("wallet returned no nonce; is it deployed?"))
    }
}

#[async_trait]
impl Broadcaster for JsonRpcClient {
    fn sender(&self) -> Address {
        self.relayer.address()
    }

    async fn broadcast(&self, request: &ExecutionRequest) -> SafeResult<TxId> {
        let raw = self.sign_outer(request).await?;
        let tx_id: String = self
            .call("eth_sendRawTransaction", serde_json::json!([bytes_to_hex(&raw)]))
            .await?;

        crate::log_debug!("rpc", "transaction submitted", tx_id = tx_id);
        Ok(tx_id)
    }
}

fn create_client() -> SafeResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| SafeError::internal(format!("Failed to create HTTP client: {}", e)))
}
