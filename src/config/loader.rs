//! Configuration loading from and saving to disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::CosignConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("invalid key for account [{account}]: {reason}")]
    InvalidKey { account: String, reason: String },

    #[error("signer account: [{0}] doesn't exists in configuration")]
    UnknownAccount(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CosignConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CosignConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %path.display(),
        accounts = config.accounts.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Validate and write configuration to a TOML file.
pub fn save_config(path: &Path, config: &CosignConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;

    tracing::debug!(path = %path.display(), "Configuration saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::key::{HashAlgorithm, SignatureAlgorithm};
    use crate::config::schema::{AccountConfig, KeyConfig, KeyMaterialConfig};

    fn sample_config() -> CosignConfig {
        let mut config = CosignConfig::default();
        config.accounts.push(AccountConfig {
            name: "alice".into(),
            address: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
            key: KeyConfig {
                index: 2,
                signature_algorithm: SignatureAlgorithm::Ed25519,
                hash_algorithm: HashAlgorithm::Sha2_512,
                material: KeyMaterialConfig::Hex {
                    private_key: "07".repeat(32),
                },
            },
        });
        config
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cosign.toml");

        let config = sample_config();
        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cosign.toml");

        let mut config = sample_config();
        config.accounts.push(config.accounts[0].clone());
        fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate account name"));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cosign.toml");
        fs::write(&path, "accounts = 5").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
