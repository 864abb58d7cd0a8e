//! Account keys: algorithm pair, key index and a lazily resolved key source.
//!
//! # Security
//! - Private key bytes are held in `Zeroizing` buffers
//! - File, environment and remote keys are only touched inside `resolve`
//! - Key material is never logged or printed by `Debug`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use alloy::primitives::{hex, keccak256};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::account::signer::{LocalSigner, RemoteSigner, Signer};
use crate::config::schema::{KeyConfig, KeyMaterialConfig};

/// Errors raised while building or resolving a key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unsupported algorithm pair {signature}/{hash}")]
    UnsupportedPair {
        signature: SignatureAlgorithm,
        hash: HashAlgorithm,
    },

    #[error("unknown {kind} algorithm '{name}'")]
    UnknownAlgorithm { kind: &'static str, name: String },

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("key material unavailable: {0}")]
    Unavailable(String),

    #[error("remote signer error: {0}")]
    Remote(String),
}

/// Signature algorithms a key can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[default]
    #[serde(rename = "ECDSA_secp256k1")]
    EcdsaSecp256k1,
    #[serde(rename = "ED25519")]
    Ed25519,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 2] =
        [SignatureAlgorithm::EcdsaSecp256k1, SignatureAlgorithm::Ed25519];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::EcdsaSecp256k1 => "ECDSA_secp256k1",
            SignatureAlgorithm::Ed25519 => "ED25519",
        }
    }

    /// Length of a produced signature in bytes.
    pub fn signature_len(&self) -> usize {
        64
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| KeyError::UnknownAlgorithm {
                kind: "signature",
                name: s.to_string(),
            })
    }
}

/// Hash algorithms applied to the signing message before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "SHA2_256")]
    Sha2_256,
    #[serde(rename = "SHA2_512")]
    Sha2_512,
    #[serde(rename = "KECCAK_256")]
    Keccak256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha2_256,
        HashAlgorithm::Sha2_512,
        HashAlgorithm::Keccak256,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha2_256 => "SHA2_256",
            HashAlgorithm::Sha2_512 => "SHA2_512",
            HashAlgorithm::Keccak256 => "KECCAK_256",
        }
    }

    /// Digest size in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha2_512 => 64,
            HashAlgorithm::Sha2_256 | HashAlgorithm::Keccak256 => 32,
        }
    }

    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha2_256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha2_512 => Sha512::digest(message).to_vec(),
            HashAlgorithm::Keccak256 => keccak256(message).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| KeyError::UnknownAlgorithm {
                kind: "hash",
                name: s.to_string(),
            })
    }
}

/// Whether `signature` can sign digests produced by `hash`.
///
/// ECDSA over secp256k1 signs exactly 32-byte digests.
pub fn is_supported_pair(signature: SignatureAlgorithm, hash: HashAlgorithm) -> bool {
    match signature {
        SignatureAlgorithm::EcdsaSecp256k1 => hash.output_len() == 32,
        SignatureAlgorithm::Ed25519 => true,
    }
}

/// Where a key's private material comes from.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Raw private key bytes.
    Hex(Zeroizing<Vec<u8>>),
    /// File holding the hex-encoded private key, read at sign time.
    File(PathBuf),
    /// Environment variable holding the hex-encoded private key, read at sign time.
    Env(String),
    /// External signer endpoint.
    Remote(url::Url),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Hex(_) => f.write_str("Hex([REDACTED])"),
            KeyMaterial::File(path) => f.debug_tuple("File").field(path).finish(),
            KeyMaterial::Env(var) => f.debug_tuple("Env").field(var).finish(),
            KeyMaterial::Remote(url) => f.debug_tuple("Remote").field(&url.as_str()).finish(),
        }
    }
}

/// One signing key of an account.
#[derive(Debug, Clone)]
pub struct AccountKey {
    signature_algorithm: SignatureAlgorithm,
    hash_algorithm: HashAlgorithm,
    index: u32,
    material: KeyMaterial,
}

impl AccountKey {
    /// Build a key, rejecting unsupported algorithm pairs.
    pub fn new(
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
        index: u32,
        material: KeyMaterial,
    ) -> Result<Self, KeyError> {
        if !is_supported_pair(signature_algorithm, hash_algorithm) {
            return Err(KeyError::UnsupportedPair {
                signature: signature_algorithm,
                hash: hash_algorithm,
            });
        }

        Ok(Self {
            signature_algorithm,
            hash_algorithm,
            index,
            material,
        })
    }

    /// Inline private key at the given index.
    pub fn from_private_key(
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
        index: u32,
        private_key: &[u8],
    ) -> Result<Self, KeyError> {
        Self::new(
            signature_algorithm,
            hash_algorithm,
            index,
            KeyMaterial::Hex(Zeroizing::new(private_key.to_vec())),
        )
    }

    /// Fresh random inline key at index 0.
    pub fn generate(
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
    ) -> Result<Self, KeyError> {
        if !is_supported_pair(signature_algorithm, hash_algorithm) {
            return Err(KeyError::UnsupportedPair {
                signature: signature_algorithm,
                hash: hash_algorithm,
            });
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        loop {
            rand::rngs::OsRng.fill_bytes(&mut seed[..]);
            // A secp256k1 scalar must be below the curve order.
            if LocalSigner::from_bytes(signature_algorithm, hash_algorithm, &seed[..]).is_ok() {
                break;
            }
        }
        Self::from_private_key(signature_algorithm, hash_algorithm, 0, &seed[..])
    }

    /// Build a key from its persisted form.
    pub fn from_config(config: &KeyConfig) -> Result<Self, KeyError> {
        let material = match &config.material {
            KeyMaterialConfig::Hex { private_key } => KeyMaterial::Hex(decode_secret(private_key)?),
            KeyMaterialConfig::File { location } => KeyMaterial::File(location.clone()),
            KeyMaterialConfig::Env { variable } => KeyMaterial::Env(variable.clone()),
            KeyMaterialConfig::Remote { url } => KeyMaterial::Remote(
                url.parse()
                    .map_err(|e| KeyError::InvalidKey(format!("remote url '{}': {}", url, e)))?,
            ),
        };

        Self::new(
            config.signature_algorithm,
            config.hash_algorithm,
            config.index,
            material,
        )
    }

    /// Persisted form of this key.
    pub fn to_config(&self) -> KeyConfig {
        let material = match &self.material {
            KeyMaterial::Hex(bytes) => KeyMaterialConfig::Hex {
                private_key: hex::encode(bytes.as_slice()),
            },
            KeyMaterial::File(path) => KeyMaterialConfig::File {
                location: path.clone(),
            },
            KeyMaterial::Env(var) => KeyMaterialConfig::Env {
                variable: var.clone(),
            },
            KeyMaterial::Remote(url) => KeyMaterialConfig::Remote {
                url: url.to_string(),
            },
        };

        KeyConfig {
            index: self.index,
            signature_algorithm: self.signature_algorithm,
            hash_algorithm: self.hash_algorithm,
            material,
        }
    }

    /// Turn the key reference into a signer.
    ///
    /// Called once per sign operation; the returned signer (and any secret
    /// it holds) should be dropped as soon as the signature is produced.
    pub fn resolve(&self) -> Result<Signer, KeyError> {
        let secret = match &self.material {
            KeyMaterial::Hex(bytes) => bytes.clone(),
            KeyMaterial::File(path) => {
                let content = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
                    KeyError::Unavailable(format!("cannot read key file {}: {}", path.display(), e))
                })?);
                decode_secret(&content)?
            }
            KeyMaterial::Env(var) => {
                let content = Zeroizing::new(std::env::var(var).map_err(|_| {
                    KeyError::Unavailable(format!("environment variable {} not set", var))
                })?);
                decode_secret(&content)?
            }
            KeyMaterial::Remote(url) => {
                return Ok(Signer::Remote(RemoteSigner::new(
                    url.clone(),
                    self.signature_algorithm,
                    self.hash_algorithm,
                    self.index,
                )?));
            }
        };

        LocalSigner::from_bytes(self.signature_algorithm, self.hash_algorithm, &secret)
            .map(Signer::Local)
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Decode a hex private key (optional `0x`, surrounding whitespace ignored).
fn decode_secret(text: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(trimmed)
        .map(Zeroizing::new)
        .map_err(|e| KeyError::InvalidKey(format!("Invalid private key format: {}", e)))
}
