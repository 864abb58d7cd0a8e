//! Envelope codec: bytes on the wire ↔ [`Transaction`].

use alloy::primitives::hex;
use thiserror::Error;

use crate::transaction::envelope::Transaction;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("envelope is empty")]
    Empty,

    #[error("invalid RLP: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}

/// Decodes and re-encodes transaction envelopes.
pub trait TransactionCodec: Send + Sync {
    fn decode(&self, envelope: &[u8]) -> Result<Transaction, CodecError>;

    /// Canonical encoding. Must be deterministic.
    fn encode(&self, transaction: &Transaction) -> Vec<u8>;
}

/// RLP codec accepting both binary and hex-text envelopes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RlpCodec;

impl TransactionCodec for RlpCodec {
    fn decode(&self, envelope: &[u8]) -> Result<Transaction, CodecError> {
        let bytes = normalize_envelope(envelope);
        if bytes.is_empty() {
            return Err(CodecError::Empty);
        }
        Ok(alloy_rlp::decode_exact(&bytes)?)
    }

    fn encode(&self, transaction: &Transaction) -> Vec<u8> {
        alloy_rlp::encode(transaction)
    }
}

/// Envelope bytes as fetched may be hex text or raw binary.
///
/// Surrounding whitespace and a `0x` prefix are ignored. If what is left is
/// valid hex it is decoded; anything else is returned unchanged.
pub fn normalize_envelope(raw: &[u8]) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(raw) else {
        return raw.to_vec();
    };
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    hex::decode(text).unwrap_or_else(|_| raw.to_vec())
}

/// Lowercase hex of the normalized envelope, without prefix.
pub fn envelope_hex(raw: &[u8]) -> String {
    hex::encode(normalize_envelope(raw))
}
