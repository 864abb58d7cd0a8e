//! Error taxonomy shared by every stage of the co-signing pipeline.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::transaction::codec::CodecError;

/// Errors that terminate a sign invocation.
///
/// None of these are retried. They propagate to the command boundary, which
/// reports the message and exits non-zero.
#[derive(Debug, Error)]
pub enum CosignError {
    /// Empty or malformed URL, unreadable local file, bad CLI value.
    #[error("{0}")]
    Input(String),

    /// Configuration problem, including an unknown signer name.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Connection-level failure (refused, DNS, TLS, timeout).
    #[error("network error talking to {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The relay answered, but not with 200.
    #[error("{message} (HTTP {status})")]
    Protocol { message: String, status: u16 },

    /// The envelope does not parse as a transaction.
    #[error("failed to decode transaction envelope: {0}")]
    Decode(#[from] CodecError),

    /// Key resolution or signature production failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The confirmation gate declined.
    #[error("transaction signing aborted by user")]
    UserAborted,
}

/// Result type for co-signing operations.
pub type CosignResult<T> = Result<T, CosignError>;

impl CosignError {
    /// Short machine-friendly name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CosignError::Input(_) => "input",
            CosignError::Config(_) => "config",
            CosignError::Network { .. } => "network",
            CosignError::Protocol { .. } => "protocol",
            CosignError::Decode(_) => "decode",
            CosignError::Signing(_) => "signing",
            CosignError::UserAborted => "user_aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        let err = CosignError::Protocol {
            message: "error downloading multisig identifier".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "error downloading multisig identifier (HTTP 404)"
        );
        assert_eq!(err.kind(), "protocol");
    }

    #[test]
    fn test_unknown_signer_is_config_error() {
        let err: CosignError = ConfigError::UnknownAccount("alice".into()).into();
        assert_eq!(err.kind(), "config");
        assert_eq!(
            err.to_string(),
            "signer account: [alice] doesn't exists in configuration"
        );
    }
}
