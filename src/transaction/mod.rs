//! Transaction envelopes and the signing service.
//!
//! # Data Flow
//! ```text
//! envelope bytes (hex text or binary)
//!     → codec.rs (normalize, RLP decode)
//!     → service.rs (confirmation gate, resolve signer, sign domain message)
//!     → envelope.rs (attach signature at (address, key index) slot)
//!     → codec.rs (canonical re-encode)
//! ```

pub mod codec;
pub mod envelope;
pub mod service;

pub use codec::{CodecError, RlpCodec, TransactionCodec};
pub use envelope::{Transaction, TransactionPayload, TransactionSignature};
pub use service::{AlwaysApprove, ConfirmationGate, SignedTransaction, SigningService, StdinPrompt};
