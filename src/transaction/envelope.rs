//! Transaction structure carried inside an envelope.
//!
//! Wire layout (RLP):
//! ```text
//! transaction = [payload, [signature, ...]]
//! payload     = [script, [argument, ...], reference_block_id, gas_limit, payer]
//! signature   = [address, key_index, signature]
//! ```
//!
//! Signatures cover the domain tag followed by the RLP-encoded payload, so
//! co-signers can add signatures in any order without invalidating each other.

use alloy::primitives::{Address, Bytes};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// Domain separation tag prepended to every signing message.
pub const TRANSACTION_DOMAIN_TAG: [u8; 32] = domain_tag(b"COSIGN-V1.0-transaction");

const fn domain_tag(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// The signed-over part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct TransactionPayload {
    pub script: Bytes,
    pub arguments: Vec<Bytes>,
    pub reference_block_id: Bytes,
    pub gas_limit: u64,
    pub payer: Address,
}

/// One signature slot, identified by signer address and key index.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct TransactionSignature {
    pub address: Address,
    pub key_index: u32,
    pub signature: Bytes,
}

/// A transaction with zero or more signatures.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Transaction {
    pub payload: TransactionPayload,
    pub signatures: Vec<TransactionSignature>,
}

impl Transaction {
    pub fn new(payload: TransactionPayload) -> Self {
        Self {
            payload,
            signatures: Vec::new(),
        }
    }

    /// Bytes a signer signs: domain tag followed by the encoded payload.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = TRANSACTION_DOMAIN_TAG.to_vec();
        message.extend_from_slice(&alloy_rlp::encode(&self.payload));
        message
    }

    /// Place a signature in the slot for `(address, key_index)`.
    ///
    /// An existing signature in that slot is replaced. Slots stay ordered by
    /// `(address, key_index)` so the encoding does not depend on signing order.
    pub fn add_signature(&mut self, address: Address, key_index: u32, signature: Bytes) {
        self.signatures
            .retain(|s| !(s.address == address && s.key_index == key_index));
        self.signatures.push(TransactionSignature {
            address,
            key_index,
            signature,
        });
        self.signatures.sort_by_key(|s| (s.address, s.key_index));
    }

    pub fn signature_for(&self, address: Address, key_index: u32) -> Option<&TransactionSignature> {
        self.signatures
            .iter()
            .find(|s| s.address == address && s.key_index == key_index)
    }
}
