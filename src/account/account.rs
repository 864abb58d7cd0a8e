//! Named accounts and the read-only registry built from configuration.

use alloy::primitives::Address;

use crate::account::key::{AccountKey, HashAlgorithm, KeyError, SignatureAlgorithm};
use crate::config::loader::ConfigError;
use crate::config::schema::{AccountConfig, CosignConfig, DEFAULT_ACCOUNT_NAME};

/// An identity binding an on-chain address to a signing key.
#[derive(Debug, Clone)]
pub struct Account {
    name: String,
    address: Address,
    key: AccountKey,
}

impl Account {
    pub fn new(name: impl Into<String>, address: Address, key: AccountKey) -> Self {
        Self {
            name: name.into(),
            address,
            key,
        }
    }

    /// Ad hoc, unnamed account using key index 0 and `SHA2_256`.
    pub fn from_address_and_key(
        address: Address,
        signature_algorithm: SignatureAlgorithm,
        private_key: &[u8],
    ) -> Result<Self, KeyError> {
        let key = AccountKey::from_private_key(
            signature_algorithm,
            HashAlgorithm::Sha2_256,
            0,
            private_key,
        )?;
        Ok(Self::new("", address, key))
    }

    /// Freshly generated default account, as written by `cosign init`.
    pub fn generate_default(
        address: Address,
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
    ) -> Result<Self, KeyError> {
        let key = AccountKey::generate(signature_algorithm, hash_algorithm)?;
        Ok(Self::new(DEFAULT_ACCOUNT_NAME, address, key))
    }

    pub fn from_config(config: &AccountConfig) -> Result<Self, ConfigError> {
        let key = AccountKey::from_config(&config.key).map_err(|e| ConfigError::InvalidKey {
            account: config.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(config.name.clone(), config.address, key))
    }

    pub fn to_config(&self) -> AccountConfig {
        AccountConfig {
            name: self.name.clone(),
            address: self.address,
            key: self.key.to_config(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn key(&self) -> &AccountKey {
        &self.key
    }
}

/// Accounts known to this invocation, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    accounts: Vec<Account>,
}

impl Accounts {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn from_config(config: &CosignConfig) -> Result<Self, ConfigError> {
        config
            .accounts
            .iter()
            .map(Account::from_config)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn to_config(&self) -> Vec<AccountConfig> {
        self.accounts.iter().map(Account::to_config).collect()
    }

    pub fn by_name(&self, name: &str) -> Result<&Account, ConfigError> {
        self.accounts
            .iter()
            .find(|account| account.name == name)
            .ok_or_else(|| ConfigError::UnknownAccount(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{KeyConfig, KeyMaterialConfig};

    fn config_with(names: &[&str]) -> CosignConfig {
        let mut config = CosignConfig::default();
        for (i, name) in names.iter().enumerate() {
            config.accounts.push(AccountConfig {
                name: name.to_string(),
                address: Address::repeat_byte(i as u8 + 1),
                key: KeyConfig {
                    index: i as u32,
                    signature_algorithm: SignatureAlgorithm::Ed25519,
                    hash_algorithm: HashAlgorithm::Sha2_256,
                    material: KeyMaterialConfig::Env {
                        variable: format!("KEY_{}", i),
                    },
                },
            });
        }
        config
    }

    #[test]
    fn test_lookup_by_name() {
        let accounts = Accounts::from_config(&config_with(&["alice", "bob"])).unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(!accounts.is_empty());
        assert!(Accounts::default().is_empty());

        let bob = accounts.by_name("bob").unwrap();
        assert_eq!(bob.address(), Address::repeat_byte(2));
        assert_eq!(bob.key().index(), 1);
    }

    #[test]
    fn test_unknown_signer() {
        let accounts = Accounts::from_config(&config_with(&["alice"])).unwrap();
        let err = accounts.by_name("carol").unwrap_err();
        assert_eq!(
            err.to_string(),
            "signer account: [carol] doesn't exists in configuration"
        );
    }

    #[test]
    fn test_config_round_trip() {
        let config = config_with(&["alice", "bob"]);
        let accounts = Accounts::from_config(&config).unwrap();
        assert_eq!(accounts.to_config(), config.accounts);
    }

    #[test]
    fn test_invalid_pair_names_account() {
        let mut config = config_with(&["alice"]);
        config.accounts[0].key.signature_algorithm = SignatureAlgorithm::EcdsaSecp256k1;
        config.accounts[0].key.hash_algorithm = HashAlgorithm::Sha2_512;

        let err = Accounts::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("[alice]"));
        assert!(err.to_string().contains("unsupported algorithm pair"));
    }

    #[test]
    fn test_ad_hoc_account() {
        let account = Account::from_address_and_key(
            Address::ZERO,
            SignatureAlgorithm::Ed25519,
            &[9u8; 32],
        )
        .unwrap();
        assert_eq!(account.name(), "");
        assert_eq!(account.key().index(), 0);
        assert_eq!(account.key().hash_algorithm(), HashAlgorithm::Sha2_256);
    }
}
