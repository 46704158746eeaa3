//! Relay Configuration
//!
//! Loads the node endpoint, chain id, recovery key and Safe deployment
//! addresses from the environment, with:
//! - URL format validation
//! - TLS requirement enforcement (plain HTTP only for local nodes)
//! - secret handling for the recovery key

use crate::error::{SafeError, SafeResult};
use crate::safe::SafeDeployment;
use crate::utils::codec::parse_address;
use secrecy::SecretString;
use url::Url;

pub const ENV_CHAIN_URL: &str = "SAFE_RELAY_CHAIN_URL";
pub const ENV_CHAIN_ID: &str = "SAFE_RELAY_CHAIN_ID";
pub const ENV_RECOVERY_KEY: &str = "SAFE_RELAY_RECOVERY_KEY";
pub const ENV_MASTER: &str = "SAFE_RELAY_MASTER";
pub const ENV_FACTORY: &str = "SAFE_RELAY_FACTORY";
pub const ENV_FALLBACK_HANDLER: &str = "SAFE_RELAY_FALLBACK_HANDLER";

/// Chain used when no chain id is configured
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Everything the relay needs to talk to one chain
#[derive(Debug)]
pub struct RelayConfig {
    pub chain_url: Url,
    pub chain_id: u64,
    pub recovery_key: SecretString,
    pub deployment: SafeDeployment,
}

/// Validation result for an RPC endpoint
#[derive(Debug, Clone)]
pub struct EndpointValidation {
    pub is_valid: bool,
    pub url: Option<Url>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl RelayConfig {
    pub fn new(chain_url: &str, chain_id: u64, recovery_key: SecretString) -> SafeResult<Self> {
        Ok(Self {
            chain_url: parse_endpoint(chain_url)?,
            chain_id,
            recovery_key,
            deployment: SafeDeployment::default(),
        })
    }

    /// Read the `SAFE_RELAY_*` environment variables
    pub fn from_env() -> SafeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset deployment addresses keep
    /// the v1.3.0 defaults
    pub fn from_lookup<F>(lookup: F) -> SafeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chain_url = get(ENV_CHAIN_URL)
            .ok_or_else(|| SafeError::invalid_config(format!("{} is not set", ENV_CHAIN_URL)))?;
        let recovery_key = get(ENV_RECOVERY_KEY)
            .ok_or_else(|| SafeError::invalid_config(format!("{} is not set", ENV_RECOVERY_KEY)))?;
        let chain_id = match get(ENV_CHAIN_ID) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                SafeError::invalid_config(format!("{} must be an integer, got '{}'", ENV_CHAIN_ID, raw))
            })?,
            None => DEFAULT_CHAIN_ID,
        };

        let mut config = Self::new(&chain_url, chain_id, SecretString::from(recovery_key))?;

        if let Some(master) = get(ENV_MASTER) {
            config.deployment.master_address = config_address(ENV_MASTER, &master)?;
        }
        if let Some(factory) = get(ENV_FACTORY) {
            config.deployment.proxy_factory_address = config_address(ENV_FACTORY, &factory)?;
        }
        if let Some(handler) = get(ENV_FALLBACK_HANDLER) {
            config.deployment.fallback_handler = config_address(ENV_FALLBACK_HANDLER, &handler)?;
        }

        Ok(config)
    }
}

fn config_address(key: &str, value: &str) -> SafeResult<ethers_core::types::Address> {
    parse_address(value).map_err(|e| SafeError::invalid_config(format!("{}: {}", key, e.message)))
}

/// Parse and validate an endpoint, failing on the first error
pub fn parse_endpoint(url: &str) -> SafeResult<Url> {
    let validation = validate_endpoint(url);
    for warning in &validation.warnings {
        crate::log_warn!("config", "endpoint warning", detail = warning);
    }
    match validation.url {
        Some(url) if validation.is_valid => Ok(url),
        _ => Err(SafeError::invalid_config(format!("invalid chain URL '{}'", url))
            .with_details(validation.errors.join("; "))),
    }
}

/// Validate a JSON-RPC endpoint URL
pub fn validate_endpoint(url: &str) -> EndpointValidation {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            errors.push(format!("Invalid URL format: {}", e));
            return EndpointValidation {
                is_valid: false,
                url: None,
                warnings,
                errors,
            };
        }
    };

    match parsed.scheme() {
        "https" => {}
        "http" => {
            // plain HTTP only for a node on this machine
            match parsed.host_str() {
                Some("localhost") | Some("127.0.0.1") => {
                    warnings.push("HTTP allowed for local development only".to_string());
                }
                _ => errors.push("HTTPS required for remote endpoints".to_string()),
            }
        }
        other => errors.push(format!("Unsupported URL scheme: {}", other)),
    }

    if parsed.host_str().is_none() {
        errors.push("URL has no host".to_string());
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        warnings.push("Credentials in URL - consider using headers for authentication".to_string());
    }

    if let Some(query) = parsed.query() {
        let query = query.to_lowercase();
        if query.contains("apikey") || query.contains("api_key") {
            warnings.push("API key in URL query string - ensure URL is not logged".to_string());
        }
    }

    let is_valid = errors.is_empty();
    EndpointValidation {
        is_valid,
        url: if is_valid { Some(parsed) } else { None },
        warnings,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("https://rpc.example.org").is_valid);
        assert!(validate_endpoint("http://localhost:8545").is_valid);
        assert!(validate_endpoint("http://127.0.0.1:8545").is_valid);
        assert!(!validate_endpoint("http://rpc.example.org").is_valid);
        assert!(!validate_endpoint("ftp://rpc.example.org").is_valid);
        assert!(!validate_endpoint("not a url").is_valid);

        let validation = validate_endpoint("https://rpc.example.org/?apikey=abc");
        assert!(validation.is_valid);
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[
            (ENV_CHAIN_URL, "https://rpc.example.org"),
            (ENV_RECOVERY_KEY, "0xabc"),
        ]))
        .unwrap();

        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.recovery_key.expose_secret(), "0xabc");
        assert_eq!(config.deployment, SafeDeployment::v1_3_0());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = RelayConfig::from_lookup(lookup(&[
            (ENV_CHAIN_URL, "http://localhost:8545"),
            (ENV_CHAIN_ID, "5"),
            (ENV_RECOVERY_KEY, "0xabc"),
            (ENV_FACTORY, "0x00000000000000000000000000000000000000f1"),
        ]))
        .unwrap();

        assert_eq!(config.chain_id, 5);
        assert_eq!(
            config.deployment.proxy_factory_address,
            ethers_core::types::Address::from_low_u64_be(0xf1)
        );
        assert_eq!(config.deployment.master_address, SafeDeployment::v1_3_0().master_address);
    }

    #[test]
    fn test_from_lookup_errors() {
        use crate::error::ErrorCode;

        let missing = RelayConfig::from_lookup(lookup(&[(ENV_RECOVERY_KEY, "0xabc")])).unwrap_err();
        assert_eq!(missing.code, ErrorCode::InvalidConfig);

        let bad_id = RelayConfig::from_lookup(lookup(&[
            (ENV_CHAIN_URL, "https://rpc.example.org"),
            (ENV_CHAIN_ID, "mainnet"),
            (ENV_RECOVERY_KEY, "0xabc"),
        ]))
        .unwrap_err();
        assert_eq!(bad_id.code, ErrorCode::InvalidConfig);

        let remote_http = RelayConfig::from_lookup(lookup(&[
            (ENV_CHAIN_URL, "http://rpc.example.org"),
            (ENV_RECOVERY_KEY, "0xabc"),
        ]))
        .unwrap_err();
        assert_eq!(remote_http.code, ErrorCode::InvalidConfig);
    }
}
