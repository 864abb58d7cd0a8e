//! Signing service: decode, confirm, sign, attach.

use std::io::{BufRead, Write};

use alloy::primitives::{hex, Bytes};

use crate::account::Account;
use crate::error::{CosignError, CosignResult};
use crate::transaction::codec::{RlpCodec, TransactionCodec};
use crate::transaction::envelope::Transaction;

/// Decides whether a decoded transaction may be signed.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, signer: &Account, transaction: &Transaction) -> bool;
}

/// Approves everything. Used when the caller passed `--yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysApprove;

impl ConfirmationGate for AlwaysApprove {
    fn confirm(&self, _signer: &Account, _transaction: &Transaction) -> bool {
        true
    }
}

/// Prints a summary to stderr and asks on stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl ConfirmationGate for StdinPrompt {
    fn confirm(&self, signer: &Account, transaction: &Transaction) -> bool {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(describe(signer, transaction).as_bytes());
        let _ = write!(stderr, "Do you want to sign this transaction? [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Human-readable summary shown before signing.
pub fn describe(signer: &Account, transaction: &Transaction) -> String {
    let payload = &transaction.payload;
    let mut out = String::new();
    out.push_str(&format!("Signer\t\t{} ({})\n", signer.name(), signer.address()));
    out.push_str(&format!("Key index\t{}\n", signer.key().index()));
    out.push_str(&format!("Payer\t\t{}\n", payload.payer));
    out.push_str(&format!("Gas limit\t{}\n", payload.gas_limit));
    out.push_str(&format!(
        "Reference block\t{}\n",
        hex::encode(&payload.reference_block_id)
    ));
    out.push_str(&format!("Arguments\t{}\n", payload.arguments.len()));
    for (i, arg) in payload.arguments.iter().enumerate() {
        out.push_str(&format!("  [{}]\t\t{}\n", i, String::from_utf8_lossy(arg)));
    }
    out.push_str(&format!("Signatures\t{}\n", transaction.signatures.len()));
    for sig in &transaction.signatures {
        out.push_str(&format!("  {} key {}\n", sig.address, sig.key_index));
    }
    out.push_str("Code\n");
    out.push_str(&String::from_utf8_lossy(&payload.script));
    out.push('\n');
    out
}

/// A transaction with one more signature, plus its canonical encoding.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    transaction: Transaction,
    encoded: Vec<u8>,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Lowercase hex of the encoding, as posted to relays.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.encoded)
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}

/// Applies an account's key to transaction envelopes.
pub struct SigningService {
    codec: Box<dyn TransactionCodec>,
    gate: Box<dyn ConfirmationGate>,
}

impl SigningService {
    pub fn new(codec: Box<dyn TransactionCodec>, gate: Box<dyn ConfirmationGate>) -> Self {
        Self { codec, gate }
    }

    /// RLP codec with the given confirmation gate.
    pub fn with_gate(gate: impl ConfirmationGate + 'static) -> Self {
        Self::new(Box::new(RlpCodec), Box::new(gate))
    }

    /// Sign `envelope` with `account`'s key.
    ///
    /// When `require_confirmation` is set the decoded transaction must pass
    /// the confirmation gate first. The signer is resolved here and dropped
    /// before returning.
    pub async fn sign(
        &self,
        account: &Account,
        envelope: &[u8],
        require_confirmation: bool,
    ) -> CosignResult<SignedTransaction> {
        let mut transaction = self.codec.decode(envelope)?;

        if require_confirmation && !self.gate.confirm(account, &transaction) {
            tracing::info!(signer = %account.name(), "Signing declined");
            return Err(CosignError::UserAborted);
        }

        let key = account.key();
        let signature = {
            let signer = key
                .resolve()
                .map_err(|e| CosignError::Signing(e.to_string()))?;
            signer
                .sign(&transaction.signing_message())
                .await
                .map_err(|e| CosignError::Signing(e.to_string()))?
        };

        transaction.add_signature(account.address(), key.index(), Bytes::from(signature));
        let encoded = self.codec.encode(&transaction);

        tracing::info!(
            signer = %account.name(),
            address = %account.address(),
            key_index = key.index(),
            signatures = transaction.signatures.len(),
            "Transaction signed"
        );

        Ok(SignedTransaction {
            transaction,
            encoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountKey, HashAlgorithm, KeyMaterial, SignatureAlgorithm};
    use crate::transaction::envelope::TransactionPayload;
    use alloy::primitives::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct Decline;

    impl ConfirmationGate for Decline {
        fn confirm(&self, _: &Account, _: &Transaction) -> bool {
            false
        }
    }

    #[derive(Clone, Default)]
    struct Counting(Arc<AtomicUsize>);

    impl ConfirmationGate for Counting {
        fn confirm(&self, _: &Account, _: &Transaction) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn account(index: u32) -> Account {
        let key = AccountKey::from_private_key(
            SignatureAlgorithm::EcdsaSecp256k1,
            HashAlgorithm::Sha2_256,
            index,
            &hex::decode(TEST_PRIVATE_KEY).unwrap(),
        )
        .unwrap();
        Account::new("alice", Address::repeat_byte(0xa1), key)
    }

    fn envelope() -> Vec<u8> {
        RlpCodec.encode(&Transaction::new(TransactionPayload {
            script: Bytes::from_static(b"transaction {}"),
            arguments: vec![],
            reference_block_id: Bytes::from(vec![1; 32]),
            gas_limit: 1000,
            payer: Address::repeat_byte(0xa1),
        }))
    }

    #[tokio::test]
    async fn test_sign_is_deterministic() {
        let service = SigningService::with_gate(AlwaysApprove);
        let a = service.sign(&account(0), &envelope(), false).await.unwrap();
        let b = service.sign(&account(0), &envelope(), false).await.unwrap();
        assert_eq!(a.encoded(), b.encoded());
        assert_eq!(a.transaction().signatures.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_indexes_accumulate() {
        let service = SigningService::with_gate(AlwaysApprove);
        let first = service.sign(&account(0), &envelope(), false).await.unwrap();
        let second = service
            .sign(&account(1), first.encoded(), false)
            .await
            .unwrap();

        let sigs = &second.transaction().signatures;
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].key_index, 0);
        assert_eq!(sigs[1].key_index, 1);
        // Same key, same message: the signature bytes match across slots.
        assert_eq!(sigs[0].signature, sigs[1].signature);
    }

    #[tokio::test]
    async fn test_accepts_hex_text_envelope() {
        let service = SigningService::with_gate(AlwaysApprove);
        let text = hex::encode(envelope());
        let from_text = service.sign(&account(0), text.as_bytes(), false).await.unwrap();
        let from_binary = service.sign(&account(0), &envelope(), false).await.unwrap();
        assert_eq!(from_text.to_hex(), from_binary.to_hex());
    }

    #[tokio::test]
    async fn test_declined_confirmation() {
        let service = SigningService::with_gate(Decline);
        let result = service.sign(&account(0), &envelope(), true).await;
        assert!(matches!(result, Err(CosignError::UserAborted)));
    }

    #[tokio::test]
    async fn test_gate_skipped_without_confirmation() {
        let gate = Counting::default();
        let service = SigningService::with_gate(gate.clone());

        service.sign(&account(0), &envelope(), false).await.unwrap();
        assert_eq!(gate.0.load(Ordering::SeqCst), 0);

        service.sign(&account(0), &envelope(), true).await.unwrap();
        assert_eq!(gate.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decode_error() {
        let service = SigningService::with_gate(AlwaysApprove);
        let result = service.sign(&account(0), b"zz-not-rlp", false).await;
        assert!(matches!(result, Err(CosignError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unresolvable_key_is_signing_error() {
        let key = AccountKey::new(
            SignatureAlgorithm::Ed25519,
            HashAlgorithm::Sha2_256,
            0,
            KeyMaterial::Env("COSIGN_TEST_UNSET_VARIABLE".into()),
        )
        .unwrap();
        let account = Account::new("ghost", Address::ZERO, key);

        let service = SigningService::with_gate(AlwaysApprove);
        let result = service.sign(&account, &envelope(), false).await;
        assert!(matches!(result, Err(CosignError::Signing(_))));
    }

    #[test]
    fn test_describe_lists_fields() {
        let tx = RlpCodec.decode(&envelope()).unwrap();
        let text = describe(&account(0), &tx);
        assert!(text.contains("Gas limit\t1000"));
        assert!(text.contains("transaction {}"));
    }
}
