//! Configuration schema definitions.
//!
//! This module defines the persisted configuration for the co-signer.
//! All types derive Serde traits for (de)serialization from TOML files.

use std::path::PathBuf;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::account::key::{HashAlgorithm, SignatureAlgorithm};

/// Name of the account used when `--signer` is not given.
pub const DEFAULT_ACCOUNT_NAME: &str = "emulator-account";

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "cosign.toml";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CosignConfig {
    /// Relay transport settings (timeouts, redirects).
    pub relay: RelayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Named signing accounts.
    pub accounts: Vec<AccountConfig>,
}

/// Relay transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// Total time allowed for one request/response in seconds (0 = no limit).
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// How redirects on the fetch step are followed.
    pub redirect_policy: RedirectPolicy,

    /// Maximum redirect hops on the fetch step.
    pub max_redirects: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            redirect_policy: RedirectPolicy::default(),
            max_redirects: 10,
        }
    }
}

/// Redirect handling for envelope retrieval.
///
/// `PreserveRawPath` reproduces a historical client behaviour: every redirect
/// target has its path percent-decoded before the next hop, so escaped
/// separators like `%2F` reach the server as `/`. Whether relays rely on this
/// is unconfirmed, so it stays the default and can be switched off.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectPolicy {
    #[default]
    PreserveRawPath,
    Standard,
    None,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

/// Persisted form of an account.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AccountConfig {
    /// Unique account name referenced by `--signer`.
    pub name: String,

    /// On-chain address.
    pub address: Address,

    /// Signing key.
    pub key: KeyConfig,
}

/// Persisted form of an account key.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct KeyConfig {
    /// Slot of this key in the account's on-chain key list.
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Where the private key lives.
    #[serde(flatten)]
    pub material: KeyMaterialConfig,
}

/// Key material reference, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyMaterialConfig {
    /// Hex-encoded private key stored inline.
    Hex { private_key: String },
    /// Path to a file containing the hex-encoded private key.
    File { location: PathBuf },
    /// Environment variable containing the hex-encoded private key.
    Env { variable: String },
    /// External signer reached over HTTP.
    Remote { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relay_config() {
        let config = RelayConfig::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.redirect_policy, RedirectPolicy::PreserveRawPath);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: CosignConfig = toml::from_str(
            r#"
            [[accounts]]
            name = "alice"
            address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"

            [accounts.key]
            type = "env"
            variable = "ALICE_KEY"
            "#,
        )
        .unwrap();

        assert_eq!(config.relay, RelayConfig::default());
        assert_eq!(config.accounts.len(), 1);
        let key = &config.accounts[0].key;
        assert_eq!(key.index, 0);
        assert_eq!(key.signature_algorithm, SignatureAlgorithm::EcdsaSecp256k1);
        assert_eq!(key.hash_algorithm, HashAlgorithm::Sha2_256);
        assert_eq!(
            key.material,
            KeyMaterialConfig::Env {
                variable: "ALICE_KEY".into()
            }
        );
    }

    #[test]
    fn test_parse_redirect_policy() {
        let config: CosignConfig = toml::from_str(
            r#"
            [relay]
            redirect_policy = "standard"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.redirect_policy, RedirectPolicy::Standard);
        assert_eq!(config.relay.request_timeout_secs, 5);
        assert_eq!(config.relay.max_redirects, 10);
    }
}
