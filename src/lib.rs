//! Multi-party transaction co-signing over an HTTP relay.

pub mod account;
pub mod config;
pub mod error;
pub mod observability;
pub mod relay;
pub mod transaction;

pub use account::{Account, AccountKey, Accounts};
pub use config::CosignConfig;
pub use error::{CosignError, CosignResult};
pub use relay::{RelayTransport, RelayWorkflow, SignOptions, SignOutcome};
pub use transaction::SigningService;
