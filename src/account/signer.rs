//! Signing capability produced by resolving an [`AccountKey`].
//!
//! A [`Signer`] is either a local key held in memory for one sign operation
//! or a remote signer reached over HTTP. Both hash the message with the
//! key's hash algorithm and sign the digest.
//!
//! [`AccountKey`]: crate::account::key::AccountKey

use std::fmt;
use std::time::Duration;

use alloy::primitives::{hex, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use ed25519_dalek::Signer as _;
use serde::{Deserialize, Serialize};

use crate::account::key::{is_supported_pair, HashAlgorithm, KeyError, SignatureAlgorithm};

/// Time allowed for a remote signer round-trip.
pub const REMOTE_SIGNER_TIMEOUT: Duration = Duration::from_secs(30);

/// A resolved key able to sign messages.
#[derive(Debug)]
pub enum Signer {
    Local(LocalSigner),
    Remote(RemoteSigner),
}

impl Signer {
    /// Hash `message` and sign the digest.
    pub async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Signer::Local(signer) => signer.sign(message),
            Signer::Remote(signer) => signer.sign(message).await,
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Signer::Local(signer) => signer.algorithm(),
            Signer::Remote(signer) => signer.signature_algorithm,
        }
    }
}

enum LocalKey {
    Secp256k1(PrivateKeySigner),
    Ed25519(ed25519_dalek::SigningKey),
}

/// In-memory private key.
pub struct LocalSigner {
    key: LocalKey,
    hash_algorithm: HashAlgorithm,
}

impl LocalSigner {
    /// Build a signer from raw private key bytes.
    pub fn from_bytes(
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
        private_key: &[u8],
    ) -> Result<Self, KeyError> {
        if !is_supported_pair(signature_algorithm, hash_algorithm) {
            return Err(KeyError::UnsupportedPair {
                signature: signature_algorithm,
                hash: hash_algorithm,
            });
        }

        let key = match signature_algorithm {
            SignatureAlgorithm::EcdsaSecp256k1 => {
                let signer = PrivateKeySigner::from_slice(private_key)
                    .map_err(|e| KeyError::InvalidKey(format!("secp256k1: {}", e)))?;
                LocalKey::Secp256k1(signer)
            }
            SignatureAlgorithm::Ed25519 => {
                let bytes: &[u8; 32] = private_key.try_into().map_err(|_| {
                    KeyError::InvalidKey(format!(
                        "ed25519 key must be 32 bytes, got {}",
                        private_key.len()
                    ))
                })?;
                LocalKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(bytes))
            }
        };

        Ok(Self {
            key,
            hash_algorithm,
        })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self.key {
            LocalKey::Secp256k1(_) => SignatureAlgorithm::EcdsaSecp256k1,
            LocalKey::Ed25519(_) => SignatureAlgorithm::Ed25519,
        }
    }

    /// Hash `message` and sign the digest.
    ///
    /// Both schemes are deterministic: the same key and message always give
    /// the same 64 bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let digest = self.hash_algorithm.digest(message);
        sign_digest(&self.key, &digest)
    }

    /// Public key bytes (SEC1 compressed for secp256k1, raw for Ed25519).
    pub fn public_key(&self) -> Vec<u8> {
        match &self.key {
            LocalKey::Secp256k1(signer) => signer
                .credential()
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
            LocalKey::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
        }
    }
}

fn sign_digest(key: &LocalKey, digest: &[u8]) -> Result<Vec<u8>, KeyError> {
    match key {
        LocalKey::Secp256k1(signer) => {
            let hash = B256::try_from(digest)
                .map_err(|_| KeyError::InvalidKey("secp256k1 needs a 32-byte digest".into()))?;
            let signature = signer
                .sign_hash_sync(&hash)
                .map_err(|e| KeyError::InvalidKey(format!("Signing failed: {}", e)))?;
            // r || s, recovery byte dropped
            Ok(signature.as_bytes()[..64].to_vec())
        }
        LocalKey::Ed25519(key) => Ok(key.sign(digest).to_bytes().to_vec()),
    }
}

// Implement Debug manually to avoid exposing the key
impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("algorithm", &self.algorithm())
            .field("hash_algorithm", &self.hash_algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Request body sent to a remote signer.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoteSignRequest {
    pub signature_algorithm: SignatureAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    pub key_index: u32,
    /// Hex-encoded digest to sign.
    pub digest: String,
}

/// Response body returned by a remote signer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RemoteSignResponse {
    Success { signature: String },
    Rejected { reason: String },
}

/// Signer that delegates to an external service over HTTP.
///
/// The private key never enters this process; only the digest is sent.
#[derive(Debug)]
pub struct RemoteSigner {
    client: reqwest::Client,
    url: url::Url,
    signature_algorithm: SignatureAlgorithm,
    hash_algorithm: HashAlgorithm,
    key_index: u32,
}

impl RemoteSigner {
    pub fn new(
        url: url::Url,
        signature_algorithm: SignatureAlgorithm,
        hash_algorithm: HashAlgorithm,
        key_index: u32,
    ) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder()
            .timeout(REMOTE_SIGNER_TIMEOUT)
            .build()
            .map_err(|e| KeyError::Remote(e.to_string()))?;

        Ok(Self {
            client,
            url,
            signature_algorithm,
            hash_algorithm,
            key_index,
        })
    }

    pub async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let request = RemoteSignRequest {
            signature_algorithm: self.signature_algorithm,
            hash_algorithm: self.hash_algorithm,
            key_index: self.key_index,
            digest: hex::encode(self.hash_algorithm.digest(message)),
        };

        tracing::debug!(url = %self.url, key_index = self.key_index, "Requesting remote signature");

        let resp = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| KeyError::Remote(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KeyError::Remote(format!(
                "signer at {} returned status {}",
                self.url, status
            )));
        }

        let body: RemoteSignResponse = resp
            .json()
            .await
            .map_err(|e| KeyError::Remote(format!("malformed response: {}", e)))?;

        match body {
            RemoteSignResponse::Success { signature } => {
                let signature = hex::decode(signature.trim_start_matches("0x"))
                    .map_err(|e| KeyError::Remote(format!("signature is not hex: {}", e)))?;
                let expected = self.signature_algorithm.signature_len();
                if signature.len() != expected {
                    return Err(KeyError::Remote(format!(
                        "expected {} signature bytes, got {}",
                        expected,
                        signature.len()
                    )));
                }
                Ok(signature)
            }
            RemoteSignResponse::Rejected { reason } => {
                Err(KeyError::Remote(format!("signature rejected: {}", reason)))
            }
        }
    }
}
