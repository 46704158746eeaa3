//! Counterfactual wallet addresses
//!
//! Mirrors `GnosisSafeProxyFactory.createProxyWithNonce` (v1.3.0): the
//! proxy is created with CREATE2, so its address follows from the factory,
//! the setup call and the caller's salt nonce alone.

use super::calls::SafeCalls;
use super::types::{AccountConfig, ExecutionRequest};
use crate::error::SafeResult;
use crate::utils::codec::u256_to_bytes32;
use crate::utils::crypto::{checksum, keccak256, keccak256_concat};
use ethers_core::types::{Address, U256};

/// CREATE2 address computation for Safe proxies
pub struct AddressDeriver;

impl AddressDeriver {
    /// `setup(...)` call data executed by the new proxy
    pub fn initializer(config: &AccountConfig) -> SafeResult<Vec<u8>> {
        SafeCalls::setup(config)
    }

    /// salt = keccak256(keccak256(initializer) || uint256(saltNonce))
    pub fn salt(initializer: &[u8], salt_nonce: U256) -> [u8; 32] {
        let initializer_hash = keccak256(initializer);
        keccak256_concat(&[&initializer_hash, &u256_to_bytes32(&salt_nonce)])
    }

    /// initCodeHash = keccak256(proxyCreationCode || uint256(master))
    pub fn init_code_hash(proxy_creation_code: &[u8], master: Address) -> [u8; 32] {
        let mut master_word = [0u8; 32];
        master_word[12..].copy_from_slice(master.as_bytes());
        keccak256_concat(&[proxy_creation_code, &master_word])
    }

    /// address = keccak256(0xff || factory || salt || initCodeHash)[12..]
    pub fn create2_address(factory: Address, salt: &[u8; 32], init_code_hash: &[u8; 32]) -> Address {
        let hash = keccak256_concat(&[&[0xff], factory.as_bytes(), salt, init_code_hash]);
        Address::from_slice(&hash[12..])
    }

    /// Address the factory will assign to the wallet described by `config`
    pub fn derive(config: &AccountConfig) -> SafeResult<Address> {
        config.validate()?;

        let initializer = Self::initializer(config)?;
        let salt = Self::salt(&initializer, config.salt_nonce);
        let init_code_hash = Self::init_code_hash(
            &config.deployment.proxy_creation_code,
            config.deployment.master_address,
        );

        Ok(Self::create2_address(
            config.deployment.proxy_factory_address,
            &salt,
            &init_code_hash,
        ))
    }

    /// [`derive`](Self::derive) rendered with the EIP-55 checksum
    pub fn derive_checksummed(config: &AccountConfig) -> SafeResult<String> {
        Ok(checksum(&Self::derive(config)?))
    }

    /// The factory call that deploys the wallet
    pub fn deployment_request(config: &AccountConfig) -> SafeResult<ExecutionRequest> {
        config.validate()?;
        SafeCalls::deployment_request(config)
    }
}
