//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! cosign.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CosignConfig (validated, immutable)
//!     → account::Accounts (keys built, algorithm pairs checked)
//!     → relay::RelayTransport (timeouts, redirect policy)
//! ```
//!
//! # Design Decisions
//! - Config is read once per invocation and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, save_config, ConfigError};
pub use schema::{
    AccountConfig, CosignConfig, KeyConfig, KeyMaterialConfig, ObservabilityConfig,
    RedirectPolicy, RelayConfig,
};
