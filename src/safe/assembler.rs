//! Transaction Assembler
//!
//! Drives one Safe action from intent to broadcast:
//!
//! 1. normalize the intent into a draft
//! 2. resolve the nonce
//! 3. compute the digest
//! 4. collect signatures (recovery signer + owners, concurrently)
//! 5. finalize the signature set
//! 6. encode `execTransaction`
//! 7. broadcast
//!
//! Any failure aborts the run before step 7.

use super::address::AddressDeriver;
use super::calls::SafeCalls;
use super::hasher::CanonicalHasher;
use super::signatures::{SignatureAggregator, SignatureSet};
use super::types::*;
use crate::error::{SafeError, SafeResult};
use crate::log_debug;
use crate::tx::{Broadcaster, ChainClient, DigestSigner};
use crate::utils::crypto::checksum;
use ethers_core::types::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;

const MODULE: &str = "assembler";

/// Stateless coordinator over the chain, recovery signer and broadcaster
pub struct TransactionAssembler {
    chain: Arc<dyn ChainClient>,
    recovery: Arc<dyn DigestSigner>,
    broadcaster: Arc<dyn Broadcaster>,
    defaults: SafeDefaults,
    deployment: SafeDeployment,
}

impl TransactionAssembler {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        recovery: Arc<dyn DigestSigner>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            chain,
            recovery,
            broadcaster,
            defaults: SafeDefaults::default(),
            deployment: SafeDeployment::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: SafeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_deployment(mut self, deployment: SafeDeployment) -> Self {
        self.deployment = deployment;
        self
    }

    /// Address of the signer that co-signs every action
    pub fn recovery_address(&self) -> Address {
        self.recovery.address()
    }

    pub fn deployment(&self) -> &SafeDeployment {
        &self.deployment
    }

    /// Steps 1 and 2: intent to immutable action
    pub async fn prepare(&self, wallet: Address, intent: TransactionIntent) -> SafeResult<PendingAction> {
        let draft = ActionDraft::from_intent(intent, &self.defaults);
        let action = CanonicalHasher::resolve_nonce(self.chain.as_ref(), wallet, draft).await?;

        log_debug!(
            MODULE,
            "action prepared",
            wallet = checksum(&wallet),
            nonce = action.nonce()
        );
        Ok(action)
    }

    /// Full pipeline; returns the broadcast receipt
    ///
    /// `presupplied` signatures are normalized and merged with the ones
    /// collected here. A signer appearing twice is rejected.
    pub async fn build_and_execute(
        &self,
        wallet: Address,
        intent: TransactionIntent,
        chain_id: u64,
        owners: &[Arc<dyn DigestSigner>],
        presupplied: Vec<SafeSignature>,
    ) -> SafeResult<ExecutionReceipt> {
        let action = self.prepare(wallet, intent).await?;
        let digest = CanonicalHasher::transaction_hash(wallet, &action, chain_id)?;

        let mut signers: Vec<&dyn DigestSigner> = Vec::with_capacity(owners.len() + 1);
        signers.push(self.recovery.as_ref());
        signers.extend(owners.iter().map(|signer| signer.as_ref()));
        let collected = collect_signatures(&digest, &signers).await?;

        let mut set = SignatureSet::new();
        set.extend(collected)?;
        for signature in presupplied {
            set.insert(normalized(signature)?)?;
        }
        log_debug!(MODULE, "signatures collected", digest = hex::encode(digest), count = set.len());

        let bundle = set.finalize();
        let request = ExecutionRequest {
            to: wallet,
            value: U256::zero(),
            data: SafeCalls::exec_transaction(&action, &bundle)?,
        };

        let tx_id = self.broadcaster.broadcast(&request).await?;
        log_debug!(MODULE, "execTransaction broadcast", tx_id = tx_id);

        Ok(ExecutionReceipt {
            tx_id,
            action,
            digest,
            signatures: set.signatures(),
        })
    }

    /// Prepare and sign with one signer, without broadcasting
    pub async fn sign_only(
        &self,
        wallet: Address,
        intent: TransactionIntent,
        chain_id: u64,
        signer: &dyn DigestSigner,
    ) -> SafeResult<SignedAction> {
        let action = self.prepare(wallet, intent).await?;
        let digest = CanonicalHasher::transaction_hash(wallet, &action, chain_id)?;

        let mut collected = collect_signatures(&digest, &[signer]).await?;
        let signature = collected
            .pop()
            .ok_or_else(|| SafeError::internal("signer produced no signature"))?;

        Ok(SignedAction {
            action,
            digest,
            signature,
        })
    }

    /// [`sign_only`](Self::sign_only) with the recovery signer
    pub async fn sign_with_recovery(
        &self,
        wallet: Address,
        intent: TransactionIntent,
        chain_id: u64,
    ) -> SafeResult<SignedAction> {
        self.sign_only(wallet, intent, chain_id, self.recovery.as_ref()).await
    }

    /// Resolve caller options; the recovery signer becomes an owner
    pub fn account_config(&self, options: &CreateOptions) -> AccountConfig {
        options.resolve(&self.deployment, Some(self.recovery.address()))
    }

    pub fn derive_address(&self, options: &CreateOptions) -> SafeResult<Address> {
        AddressDeriver::derive(&self.account_config(options))
    }

    /// Broadcast `createProxyWithNonce` for the wallet `options` describe
    pub async fn deploy_account(&self, options: &CreateOptions) -> SafeResult<DeploymentReceipt> {
        let config = self.account_config(options);
        let address = AddressDeriver::derive(&config)?;
        let request = AddressDeriver::deployment_request(&config)?;

        log_debug!(
            MODULE,
            "deploying wallet",
            wallet = checksum(&address),
            factory = checksum(&request.to)
        );
        let tx_id = self.broadcaster.broadcast(&request).await?;

        Ok(DeploymentReceipt {
            address: checksum(&address),
            tx_id,
        })
    }

    /// Approve `action` on chain from an owner's own account
    ///
    /// Returns the transaction id and the placeholder signature standing in
    /// for that owner at execution time.
    pub async fn approve(
        &self,
        wallet: Address,
        action: &PendingAction,
        chain_id: u64,
        owner: &dyn Broadcaster,
    ) -> SafeResult<(TxId, SafeSignature)> {
        let digest = CanonicalHasher::transaction_hash(wallet, action, chain_id)?;
        let request = ExecutionRequest {
            to: wallet,
            value: U256::zero(),
            data: SafeCalls::approve_hash(&digest)?,
        };

        let tx_id = owner.broadcast(&request).await?;
        log_debug!(MODULE, "approveHash broadcast", owner = checksum(&owner.sender()), tx_id = tx_id);

        Ok((tx_id, SignatureAggregator::approval(owner.sender())))
    }
}

fn normalized(signature: SafeSignature) -> SafeResult<SafeSignature> {
    let data = SignatureAggregator::normalize(&signature.data)
        .map_err(|e| e.with_details(checksum(&signature.signer)))?;
    Ok(SafeSignature {
        signer: signature.signer,
        data,
    })
}

/// Run every signer concurrently; all failures are reported together, in
/// signer order
async fn collect_signatures(
    digest: &[u8; 32],
    signers: &[&dyn DigestSigner],
) -> SafeResult<Vec<SafeSignature>> {
    let results = join_all(signers.iter().map(|signer| async move {
        let raw = signer.sign_digest(digest).await?;
        SignatureAggregator::direct(signer.address(), &raw)
    }))
    .await;

    let mut signatures = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (signer, result) in signers.iter().zip(results) {
        match result {
            Ok(signature) => signatures.push(signature),
            Err(e) => failures.push(format!("{}: {}", checksum(&signer.address()), e.message)),
        }
    }

    if !failures.is_empty() {
        return Err(SafeError::signing_error(format!(
            "{} of {} signers failed",
            failures.len(),
            signers.len()
        ))
        .with_details(failures.join("; ")));
    }

    Ok(signatures)
}
