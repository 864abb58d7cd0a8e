//! Result artifact of a sign invocation and its renderings.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::hex;
use serde_json::{json, Map, Value};

use crate::relay::workflow::WorkflowState;
use crate::transaction::envelope::Transaction;

/// Optional fields added to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeField {
    Signatures,
    Code,
    Payload,
}

impl FromStr for IncludeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signatures" => Ok(IncludeField::Signatures),
            "code" => Ok(IncludeField::Code),
            "payload" => Ok(IncludeField::Payload),
            other => Err(format!(
                "unknown include field '{}', valid values: signatures, code, payload",
                other
            )),
        }
    }
}

/// How a [`SignOutcome`] is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Oneliner,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "oneliner" => Ok(OutputFormat::Oneliner),
            other => Err(format!(
                "unknown output format '{}', valid values: text, json, oneliner",
                other
            )),
        }
    }
}

impl OutputFormat {
    pub fn render(&self, outcome: &SignOutcome) -> String {
        match self {
            OutputFormat::Text => outcome.to_string(),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&outcome.to_json()).unwrap_or_default()
            }
            OutputFormat::Oneliner => outcome.oneliner(),
        }
    }
}

/// Original envelope and signed envelope, both as lowercase hex.
///
/// Produced once signing succeeds and kept even if delivery to the relay
/// fails, so the signed envelope can be handed over manually.
#[derive(Debug, Clone)]
pub struct SignOutcome {
    pub(crate) rlp: String,
    pub(crate) signed: String,
    pub(crate) transaction: Transaction,
    pub(crate) include: Vec<IncludeField>,
    pub(crate) fetched: bool,
    pub(crate) posted: bool,
    pub(crate) trail: Vec<WorkflowState>,
}

impl SignOutcome {
    /// Hex of the envelope as received.
    pub fn rlp(&self) -> &str {
        &self.rlp
    }

    /// Hex of the envelope with this signer's signature attached.
    pub fn signed(&self) -> &str {
        &self.signed
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Whether the envelope came from a relay.
    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// Whether the relay accepted the signed envelope.
    pub fn posted(&self) -> bool {
        self.posted
    }

    /// States the workflow passed through.
    pub fn trail(&self) -> &[WorkflowState] {
        &self.trail
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("rlp".into(), Value::String(self.rlp.clone()));
        map.insert("signed".into(), Value::String(self.signed.clone()));

        for field in &self.include {
            match field {
                IncludeField::Signatures => {
                    let sigs = self
                        .transaction
                        .signatures
                        .iter()
                        .map(|s| {
                            json!({
                                "address": s.address.to_string(),
                                "key_index": s.key_index,
                                "signature": hex::encode(&s.signature),
                            })
                        })
                        .collect();
                    map.insert("signatures".into(), Value::Array(sigs));
                }
                IncludeField::Code => {
                    map.insert(
                        "code".into(),
                        Value::String(
                            String::from_utf8_lossy(&self.transaction.payload.script).into_owned(),
                        ),
                    );
                }
                IncludeField::Payload => {
                    map.insert("payload".into(), Value::String(self.payload_hex()));
                }
            }
        }

        Value::Object(map)
    }

    pub fn oneliner(&self) -> String {
        format!("Done: {}", !self.signed.is_empty())
    }

    fn payload_hex(&self) -> String {
        hex::encode(alloy_rlp::encode(&self.transaction.payload))
    }
}

impl fmt::Display for SignOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fetched && !self.rlp.is_empty() {
            writeln!(f, "RLP retrieved successfully")?;
        }
        if self.posted {
            writeln!(f, "Signed RLP Posted successfully")?;
        }
        if !self.fetched {
            writeln!(f, "Transaction signed")?;
            writeln!(f, "Signatures\t{}", self.transaction.signatures.len())?;
            writeln!(f, "Signed RLP\t{}", self.signed)?;
        }

        for field in &self.include {
            match field {
                IncludeField::Signatures => {
                    for (i, sig) in self.transaction.signatures.iter().enumerate() {
                        writeln!(f, "Signature {}", i)?;
                        writeln!(f, "  Address\t{}", sig.address)?;
                        writeln!(f, "  Key Index\t{}", sig.key_index)?;
                        writeln!(f, "  Signature\t{}", hex::encode(&sig.signature))?;
                    }
                }
                IncludeField::Code => {
                    writeln!(f, "Code")?;
                    writeln!(
                        f,
                        "{}",
                        String::from_utf8_lossy(&self.transaction.payload.script)
                    )?;
                }
                IncludeField::Payload => {
                    writeln!(f, "Payload\t{}", self.payload_hex())?;
                }
            }
        }
        Ok(())
    }
}
