//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Account names are unique
//! - Value ranges (connect timeout > 0, bounded redirect hops)
//! - Remote signer URLs are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CosignConfig → Result<(), Vec<ValidationError>>
//! - Algorithm pairs are checked when keys are built, not here

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{CosignConfig, KeyMaterialConfig};

/// Upper bound accepted for `relay.max_redirects`.
pub const MAX_REDIRECT_LIMIT: usize = 30;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateAccount(String),
    ZeroConnectTimeout,
    TooManyRedirects(usize),
    InvalidRemoteUrl { account: String, url: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateAccount(name) => {
                write!(f, "duplicate account name [{}]", name)
            }
            ValidationError::ZeroConnectTimeout => {
                write!(f, "relay.connect_timeout_secs must be greater than 0")
            }
            ValidationError::TooManyRedirects(n) => write!(
                f,
                "relay.max_redirects {} exceeds limit {}",
                n, MAX_REDIRECT_LIMIT
            ),
            ValidationError::InvalidRemoteUrl { account, url } => write!(
                f,
                "account [{}] remote signer url '{}' is not an http(s) url",
                account, url
            ),
        }
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &CosignConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.relay.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.relay.max_redirects > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::TooManyRedirects(config.relay.max_redirects));
    }

    let mut seen = HashSet::new();
    for account in &config.accounts {
        if !seen.insert(account.name.as_str()) {
            errors.push(ValidationError::DuplicateAccount(account.name.clone()));
        }

        if let KeyMaterialConfig::Remote { url } = &account.key.material {
            let usable = url::Url::parse(url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !usable {
                errors.push(ValidationError::InvalidRemoteUrl {
                    account: account.name.clone(),
                    url: url.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AccountConfig, KeyConfig};

    fn remote_account(name: &str, url: &str) -> AccountConfig {
        AccountConfig {
            name: name.into(),
            address: Default::default(),
            key: KeyConfig {
                index: 0,
                signature_algorithm: Default::default(),
                hash_algorithm: Default::default(),
                material: KeyMaterialConfig::Remote { url: url.into() },
            },
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CosignConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = CosignConfig::default();
        config.relay.connect_timeout_secs = 0;
        config.relay.max_redirects = 99;
        config.accounts.push(remote_account("a", "http://signer.local/sign"));
        config.accounts.push(remote_account("a", "ftp://signer.local"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroConnectTimeout));
        assert!(errors.contains(&ValidationError::TooManyRedirects(99)));
        assert!(errors.contains(&ValidationError::DuplicateAccount("a".into())));
    }
}
