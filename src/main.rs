//! safe-relay CLI
//!
//! Thin shell over the library: each command reads a JSON body from a file
//! or stdin and prints an `ApiResponse` document.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ethers_core::types::Address;
use safe_relay::safe::{
    ActionDraft, AddressDeriver, CanonicalHasher, CreateOptions, SafeDefaults, SafeDeployment,
    SafeSignature, TransactionAssembler, TransactionIntent,
};
use safe_relay::tx::{DigestSigner, JsonRpcClient, LocalKeySigner};
use safe_relay::utils::codec::{bytes_to_hex, parse_address};
use safe_relay::utils::crypto::checksum;
use safe_relay::utils::logging;
use safe_relay::utils::network_config::{self as config, RelayConfig};
use safe_relay::{log_debug, log_info, ApiResponse, SafeError, SafeResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use zeroize::Zeroize;

#[derive(Parser)]
#[command(name = "safe-relay")]
#[command(version)]
#[command(about = "Derive, hash, sign and execute Safe multisig transactions", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOpts {
    /// Print debug progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON-RPC endpoint of the chain
    #[arg(long, env = config::ENV_CHAIN_URL, global = true)]
    chain_url: Option<String>,

    /// EIP-155 chain id
    #[arg(long, env = config::ENV_CHAIN_ID, default_value_t = config::DEFAULT_CHAIN_ID, global = true)]
    chain_id: u64,

    /// Key of the recovery signer, which also relays transactions
    #[arg(long, env = config::ENV_RECOVERY_KEY, hide_env_values = true, global = true)]
    recovery_key: Option<String>,

    /// Safe singleton address
    #[arg(long, env = config::ENV_MASTER, global = true)]
    master: Option<String>,

    /// Proxy factory address
    #[arg(long, env = config::ENV_FACTORY, global = true)]
    factory: Option<String>,

    /// Fallback handler passed to `setup`
    #[arg(long, env = config::ENV_FALLBACK_HANDLER, global = true)]
    fallback_handler: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the address of a wallet before it is deployed
    DeriveAddress {
        /// CreateOptions JSON file (stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Deploy a wallet through the proxy factory
    Deploy {
        /// CreateOptions JSON file (stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Compute the SafeTx digest of an action
    Hash {
        /// Action request JSON file (stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Sign an action with the recovery key or an owner key
    Sign {
        /// Action request JSON file (stdin when omitted)
        input: Option<PathBuf>,

        /// Sign with this owner key instead of the recovery key
        #[arg(long)]
        owner_key: Option<String>,
    },

    /// Sign with the recovery key and any owner keys, then execute
    Execute {
        /// Action request JSON file (stdin when omitted)
        input: Option<PathBuf>,
    },
}

/// Body of `hash`, `sign` and `execute`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionRequest {
    #[serde(alias = "multisig_address")]
    multisig_address: Address,
    transaction: TransactionIntent,
    #[serde(default)]
    signatures: Vec<SafeSignature>,
    #[serde(default, alias = "owners_private_keys")]
    owners_private_keys: Vec<String>,
}

impl GlobalOpts {
    fn relay_config(&self) -> SafeResult<RelayConfig> {
        RelayConfig::from_lookup(|key| match key {
            config::ENV_CHAIN_URL => self.chain_url.clone(),
            config::ENV_CHAIN_ID => Some(self.chain_id.to_string()),
            config::ENV_RECOVERY_KEY => self.recovery_key.clone(),
            config::ENV_MASTER => self.master.clone(),
            config::ENV_FACTORY => self.factory.clone(),
            config::ENV_FALLBACK_HANDLER => self.fallback_handler.clone(),
            _ => None,
        })
    }

    /// Deployment addresses without requiring a node
    fn deployment(&self) -> SafeResult<SafeDeployment> {
        let mut deployment = SafeDeployment::default();
        if let Some(master) = &self.master {
            deployment.master_address = parse_address(master)?;
        }
        if let Some(factory) = &self.factory {
            deployment.proxy_factory_address = parse_address(factory)?;
        }
        if let Some(handler) = &self.fallback_handler {
            deployment.fallback_handler = parse_address(handler)?;
        }
        Ok(deployment)
    }

    fn assembler(&self) -> SafeResult<(TransactionAssembler, u64)> {
        let config = self.relay_config()?;
        let client = Arc::new(JsonRpcClient::new(
            config.chain_url.clone(),
            config.chain_id,
            &config.recovery_key,
        )?);
        let recovery = Arc::new(LocalKeySigner::from_secret(&config.recovery_key)?);

        let assembler = TransactionAssembler::new(client.clone(), recovery, client)
            .with_deployment(config.deployment);
        Ok((assembler, config.chain_id))
    }
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}

fn parse_body<T: DeserializeOwned>(path: Option<&PathBuf>) -> SafeResult<T> {
    let raw = read_input(path).map_err(|e| SafeError::invalid_input(format!("{:#}", e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| SafeError::invalid_input(format!("invalid request body: {}", e)))
}

fn owner_signers(keys: &mut [String]) -> SafeResult<Vec<Arc<dyn DigestSigner>>> {
    let signers = keys
        .iter()
        .map(|key| LocalKeySigner::from_hex(key).map(|s| Arc::new(s) as Arc<dyn DigestSigner>))
        .collect();
    keys.iter_mut().for_each(|key| key.zeroize());
    signers
}

async fn run(cli: Cli) -> SafeResult<Value> {
    let global = cli.global;

    match cli.command {
        Commands::DeriveAddress { input } => {
            let options: CreateOptions = parse_body(input.as_ref())?;
            let recovery = match &global.recovery_key {
                Some(key) => Some(LocalKeySigner::from_hex(key)?.address()),
                None => None,
            };
            let account = options.resolve(&global.deployment()?, recovery);
            let address = AddressDeriver::derive_checksummed(&account)?;

            log_debug!("cli", "address derived", wallet = address);
            Ok(json!({ "address": address, "owners": account.sorted_owners() }))
        }

        Commands::Deploy { input } => {
            let options: CreateOptions = parse_body(input.as_ref())?;
            let (assembler, _) = global.assembler()?;
            let receipt = assembler.deploy_account(&options).await?;

            log_info!("cli", "wallet deployment submitted", wallet = receipt.address);
            Ok(serde_json::to_value(receipt)?)
        }

        Commands::Hash { input } => {
            let request: ActionRequest = parse_body(input.as_ref())?;
            let wallet = request.multisig_address;
            let draft = ActionDraft::from_intent(request.transaction, &SafeDefaults::default());

            let (action, chain_id) = match draft.nonce {
                Some(nonce) => (draft.resolve(nonce), global.chain_id),
                None => {
                    let config = global.relay_config()?;
                    let client =
                        JsonRpcClient::new(config.chain_url, config.chain_id, &config.recovery_key)?;
                    let action = CanonicalHasher::resolve_nonce(&client, wallet, draft).await?;
                    (action, config.chain_id)
                }
            };

            let pre = CanonicalHasher::pre_image(wallet, &action, chain_id)?;
            Ok(json!({
                "wallet": checksum(&wallet),
                "chainId": chain_id,
                "action": action,
                "domainSeparator": bytes_to_hex(&pre.domain_separator),
                "structHash": bytes_to_hex(&pre.struct_hash),
                "digest": bytes_to_hex(&pre.digest),
            }))
        }

        Commands::Sign { input, mut owner_key } => {
            let request: ActionRequest = parse_body(input.as_ref())?;
            let (assembler, chain_id) = global.assembler()?;

            let signed = match owner_key.as_mut() {
                Some(key) => {
                    let signer = LocalKeySigner::from_hex(key);
                    key.zeroize();
                    assembler
                        .sign_only(request.multisig_address, request.transaction, chain_id, &signer?)
                        .await?
                }
                None => {
                    assembler
                        .sign_with_recovery(request.multisig_address, request.transaction, chain_id)
                        .await?
                }
            };
            Ok(serde_json::to_value(signed)?)
        }

        Commands::Execute { input } => {
            let mut request: ActionRequest = parse_body(input.as_ref())?;
            let owners = owner_signers(&mut request.owners_private_keys)?;
            let (assembler, chain_id) = global.assembler()?;

            let receipt = assembler
                .build_and_execute(
                    request.multisig_address,
                    request.transaction,
                    chain_id,
                    &owners,
                    request.signatures,
                )
                .await?;

            log_info!("cli", "execTransaction submitted", tx_id = receipt.tx_id);
            Ok(serde_json::to_value(receipt)?)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.global.verbose {
        logging::enable_debug();
    }

    match run(cli).await {
        Ok(result) => {
            println!("{}", ApiResponse::ok(result).to_json());
            ExitCode::SUCCESS
        }
        Err(error) => {
            println!("{}", ApiResponse::<()>::err(error).to_json());
            ExitCode::FAILURE
        }
    }
}
