//! Safe value objects
//!
//! Everything here is plain data: wallet configuration, transaction intents
//! and their resolved form, signatures and the outer call handed to a
//! broadcaster. JSON field names follow the Safe service conventions
//! (camelCase).

use crate::error::{SafeError, SafeResult};
use crate::serde_hex;
use crate::utils::codec;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Safe v1.3.0 singleton (`GnosisSafe`)
pub const SAFE_V1_3_0_MASTER: &str = "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552";

/// Safe v1.3.0 `GnosisSafeProxyFactory`
pub const SAFE_V1_3_0_PROXY_FACTORY: &str = "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2";

/// Safe v1.3.0 `CompatibilityFallbackHandler`
pub const SAFE_V1_3_0_FALLBACK_HANDLER: &str = "0xf48f2B2d2a534e402487b3ee7C18c33Aec0Fe5e4";

/// Safe's linked-list sentinel, used as the "nothing here" address in `setup`
pub const SENTINEL_ADDRESS: &str = "0x0000000000000000000000000000000000000001";

/// `GnosisSafeProxy` creation code as emitted by the v1.3.0 factory's
/// `proxyCreationCode()`. The constructor argument (singleton address) is
/// appended as one ABI word at deployment.
pub const PROXY_CREATION_CODE: &str = concat!(
    "608060405234801561001057600080fd5b506040516101e63803806101e6833981810160405260208110156100335760",
    "0080fd5b8101908080519060200190929190505050600073ffffffffffffffffffffffffffffffffffffffff168173ff",
    "ffffffffffffffffffffffffffffffffffffff1614156100ca576040517f08c379a00000000000000000000000000000",
    "000000000000000000000000000081526004018080602001828103825260228152602001806101c46022913960400191",
    "505060405180910390fd5b806000806101000a81548173ffffffffffffffffffffffffffffffffffffffff0219169083",
    "73ffffffffffffffffffffffffffffffffffffffff1602179055505060ab806101196000396000f3fe608060405273ff",
    "ffffffffffffffffffffffffffffffffffffff600054167fa619486e0000000000000000000000000000000000000000",
    "000000000000000060003514156050578060005260206000f35b3660008037600080366000845af43d6000803e600081",
    "14156070573d6000fd5b3d6000f3fea2646970667358221220d1429297349653a4918076d650332de1a1068c5f3e07c5",
    "c82360c277770b955264736f6c63430007060033496e76616c69642073696e676c65746f6e2061646472657373207072",
    "6f7669646564",
);

fn known_address(hex: &str) -> Address {
    Address::from_slice(&codec::to_bytes(hex))
}

/// Contract addresses and proxy code of one Safe release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDeployment {
    pub master_address: Address,
    pub proxy_factory_address: Address,
    pub fallback_handler: Address,
    #[serde(with = "serde_hex::bytes")]
    pub proxy_creation_code: Vec<u8>,
    /// Stands in for absent initializer addresses
    #[serde(default = "sentinel_address")]
    pub sentinel_address: Address,
}

fn sentinel_address() -> Address {
    known_address(SENTINEL_ADDRESS)
}

impl SafeDeployment {
    /// The canonical v1.3.0 deployment, identical on every supported chain
    pub fn v1_3_0() -> Self {
        Self {
            master_address: known_address(SAFE_V1_3_0_MASTER),
            proxy_factory_address: known_address(SAFE_V1_3_0_PROXY_FACTORY),
            fallback_handler: known_address(SAFE_V1_3_0_FALLBACK_HANDLER),
            proxy_creation_code: codec::to_bytes(PROXY_CREATION_CODE),
            sentinel_address: sentinel_address(),
        }
    }
}

impl Default for SafeDeployment {
    fn default() -> Self {
        Self::v1_3_0()
    }
}

/// Values used for every SafeTx field the caller leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeDefaults {
    pub operation: Operation,
    pub value: U256,
    pub data: Vec<u8>,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
}

impl Default for SafeDefaults {
    fn default() -> Self {
        Self {
            operation: Operation::Call,
            value: U256::zero(),
            data: Vec::new(),
            safe_tx_gas: U256::zero(),
            base_gas: U256::zero(),
            gas_price: U256::zero(),
            gas_token: Address::zero(),
            refund_receiver: Address::zero(),
        }
    }
}

/// SafeTx operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl TryFrom<u8> for Operation {
    type Error = SafeError;

    fn try_from(value: u8) -> SafeResult<Self> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(SafeError::invalid_input(format!(
                "operation must be 0 (call) or 1 (delegatecall), got {}",
                other
            ))),
        }
    }
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> u8 {
        op as u8
    }
}

/// Call executed by the new wallet during `setup`; every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializerAction {
    #[serde(default, alias = "initializerTo", skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(
        default,
        alias = "initializerData",
        with = "serde_hex::opt_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_token: Option<Address>,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_receiver: Option<Address>,
}

/// Everything that determines a wallet's address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    pub owners: Vec<Address>,
    pub threshold: u64,
    #[serde(with = "serde_hex::u256")]
    pub salt_nonce: U256,
    #[serde(default)]
    pub deployment: SafeDeployment,
    #[serde(default)]
    pub initializer: InitializerAction,
}

impl AccountConfig {
    pub fn new(owners: Vec<Address>, threshold: u64, salt_nonce: U256) -> Self {
        Self {
            owners,
            threshold,
            salt_nonce,
            deployment: SafeDeployment::default(),
            initializer: InitializerAction::default(),
        }
    }

    /// Check owner, threshold and deployment constraints
    pub fn validate(&self) -> SafeResult<()> {
        if self.owners.is_empty() {
            return Err(SafeError::invalid_config("at least one owner is required"));
        }

        let mut seen = std::collections::HashSet::new();
        for owner in &self.owners {
            if owner.is_zero() {
                return Err(SafeError::invalid_config("owner cannot be the zero address"));
            }
            if !seen.insert(*owner) {
                return Err(SafeError::invalid_config("duplicate owner")
                    .with_details(codec::bytes_to_hex(owner.as_bytes())));
            }
        }

        if self.threshold == 0 || self.threshold > self.owners.len() as u64 {
            return Err(SafeError::invalid_config(format!(
                "threshold must be between 1 and {}, got {}",
                self.owners.len(),
                self.threshold
            )));
        }

        let deployment = &self.deployment;
        let unset = |address: Address| address.is_zero() || address == deployment.sentinel_address;
        if unset(deployment.master_address) {
            return Err(SafeError::invalid_config("master address is required"));
        }
        if unset(deployment.proxy_factory_address) {
            return Err(SafeError::invalid_config("proxy factory address is required"));
        }
        if self.deployment.proxy_creation_code.is_empty() {
            return Err(SafeError::invalid_config("proxy creation code is required"));
        }

        Ok(())
    }

    /// Owners in ascending byte order
    pub fn sorted_owners(&self) -> Vec<Address> {
        let mut owners = self.owners.clone();
        owners.sort();
        owners
    }
}

/// Caller-facing wallet creation request
///
/// Contract addresses fall back to the configured deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    pub owners: Vec<Address>,
    pub threshold: u64,
    #[serde(with = "serde_hex::u256")]
    pub salt_nonce: U256,
    #[serde(default, alias = "safeMaster", skip_serializing_if = "Option::is_none")]
    pub master_address: Option<Address>,
    #[serde(default, alias = "proxyFactory", skip_serializing_if = "Option::is_none")]
    pub proxy_factory_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_handler: Option<Address>,
    #[serde(default, alias = "initializerAction", skip_serializing_if = "Option::is_none")]
    pub initializer: Option<InitializerAction>,
}

impl CreateOptions {
    /// Fill in deployment defaults and append `extra_owner` when it is not
    /// already an owner.
    pub fn resolve(&self, defaults: &SafeDeployment, extra_owner: Option<Address>) -> AccountConfig {
        let mut owners = self.owners.clone();
        if let Some(extra) = extra_owner {
            if !owners.contains(&extra) {
                owners.push(extra);
            }
        }

        AccountConfig {
            owners,
            threshold: self.threshold,
            salt_nonce: self.salt_nonce,
            deployment: SafeDeployment {
                master_address: self.master_address.unwrap_or(defaults.master_address),
                proxy_factory_address: self
                    .proxy_factory_address
                    .unwrap_or(defaults.proxy_factory_address),
                fallback_handler: self.fallback_handler.unwrap_or(defaults.fallback_handler),
                proxy_creation_code: defaults.proxy_creation_code.clone(),
                sentinel_address: defaults.sentinel_address,
            },
            initializer: self.initializer.clone().unwrap_or_default(),
        }
    }
}

/// A plain transfer or contract call with no Safe-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIntent {
    pub to: Address,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, with = "serde_hex::opt_bytes", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
}

/// A SafeTx with any subset of its fields given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeIntent {
    pub to: Address,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, with = "serde_hex::opt_bytes", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub safe_tx_gas: Option<U256>,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<U256>,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<Address>,
    #[serde(default, with = "serde_hex::opt_u256", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

/// What the caller wants the wallet to do, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionIntent {
    Raw(RawIntent),
    Safe(SafeIntent),
}

/// A SafeTx whose nonce may still be unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDraft {
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: Option<U256>,
}

impl ActionDraft {
    /// Normalize an intent, taking absent fields from `defaults`
    pub fn from_intent(intent: TransactionIntent, defaults: &SafeDefaults) -> Self {
        match intent {
            TransactionIntent::Raw(raw) => Self {
                to: raw.to,
                value: raw.value.unwrap_or(defaults.value),
                data: raw.data.unwrap_or_else(|| defaults.data.clone()),
                operation: defaults.operation,
                safe_tx_gas: defaults.safe_tx_gas,
                base_gas: defaults.base_gas,
                gas_price: defaults.gas_price,
                gas_token: defaults.gas_token,
                refund_receiver: defaults.refund_receiver,
                nonce: None,
            },
            TransactionIntent::Safe(safe) => Self {
                to: safe.to,
                value: safe.value.unwrap_or(defaults.value),
                data: safe.data.unwrap_or_else(|| defaults.data.clone()),
                operation: safe.operation.unwrap_or(defaults.operation),
                safe_tx_gas: safe.safe_tx_gas.unwrap_or(defaults.safe_tx_gas),
                base_gas: safe.base_gas.unwrap_or(defaults.base_gas),
                gas_price: safe.gas_price.unwrap_or(defaults.gas_price),
                gas_token: safe.gas_token.unwrap_or(defaults.gas_token),
                refund_receiver: safe.refund_receiver.unwrap_or(defaults.refund_receiver),
                nonce: safe.nonce,
            },
        }
    }

    /// Fix the nonce; the result can no longer change
    pub fn resolve(self, nonce: U256) -> PendingAction {
        PendingAction {
            to: self.to,
            value: self.value,
            data: self.data,
            operation: self.operation,
            safe_tx_gas: self.safe_tx_gas,
            base_gas: self.base_gas,
            gas_price: self.gas_price,
            gas_token: self.gas_token,
            refund_receiver: self.refund_receiver,
            nonce,
        }
    }
}

/// A fully specified SafeTx
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    to: Address,
    #[serde(with = "serde_hex::u256")]
    value: U256,
    #[serde(with = "serde_hex::bytes")]
    data: Vec<u8>,
    operation: Operation,
    #[serde(with = "serde_hex::u256")]
    safe_tx_gas: U256,
    #[serde(with = "serde_hex::u256")]
    base_gas: U256,
    #[serde(with = "serde_hex::u256")]
    gas_price: U256,
    gas_token: Address,
    refund_receiver: Address,
    #[serde(with = "serde_hex::u256")]
    nonce: U256,
}

impl PendingAction {
    pub fn to(&self) -> Address {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn safe_tx_gas(&self) -> U256 {
        self.safe_tx_gas
    }

    pub fn base_gas(&self) -> U256 {
        self.base_gas
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn gas_token(&self) -> Address {
        self.gas_token
    }

    pub fn refund_receiver(&self) -> Address {
        self.refund_receiver
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }
}

/// One owner's authorization, `r(32) || s(32) || v(1)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSignature {
    pub signer: Address,
    #[serde(with = "serde_hex::strict_bytes")]
    pub data: Vec<u8>,
}

/// The outer call a broadcaster submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub to: Address,
    #[serde(with = "serde_hex::u256")]
    pub value: U256,
    #[serde(with = "serde_hex::bytes")]
    pub data: Vec<u8>,
}

/// Identifier returned by the broadcaster, usually the transaction hash
pub type TxId = String;

/// Result of a successful `build_and_execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub tx_id: TxId,
    pub action: PendingAction,
    #[serde(with = "serde_hex::hex32")]
    pub digest: [u8; 32],
    pub signatures: Vec<SafeSignature>,
}

/// An action with one signature over its digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAction {
    pub action: PendingAction,
    #[serde(with = "serde_hex::hex32")]
    pub digest: [u8; 32],
    pub signature: SafeSignature,
}

/// Result of broadcasting a wallet deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    pub address: String,
    pub tx_id: TxId,
}
