//! Accounts, keys and signers.
//!
//! # Data Flow
//! ```text
//! cosign.toml [[accounts]]
//!     → account.rs (Accounts registry, lookup by name)
//!     → key.rs (algorithm pair checked, key material referenced)
//!     → signer.rs (resolved only inside a sign operation)
//! ```
//!
//! # Security Constraints
//! - Key material is resolved lazily, once per signature
//! - Secrets are zeroized when the signer is dropped
//! - Never log private keys or sensitive data

#[allow(clippy::module_inception)]
pub mod account;
pub mod key;
pub mod signer;

pub use account::{Account, Accounts};
pub use key::{AccountKey, HashAlgorithm, KeyError, KeyMaterial, SignatureAlgorithm};
pub use signer::{LocalSigner, RemoteSigner, Signer};
