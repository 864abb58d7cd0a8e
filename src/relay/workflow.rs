//! Single-pass fetch → sign → post pipeline.
//!
//! ```text
//! relay mode:  Fetching → Fetched → Signing → Signed → Posting → Complete
//! local file:                       Signing → Signed → Complete
//!                    any step ──▶ Failed
//! ```
//!
//! A failed post still hands back the signed envelope.

use std::path::PathBuf;

use thiserror::Error;

use crate::account::Accounts;
use crate::error::CosignError;
use crate::relay::result::{IncludeField, SignOutcome};
use crate::relay::transport::RelayTransport;
use crate::transaction::codec::envelope_hex;
use crate::transaction::service::SigningService;

/// Pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Fetching,
    Fetched,
    Signing,
    Signed,
    Posting,
    Complete,
    Failed,
}

/// Where the envelope comes from and whether the result goes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignMode {
    /// Fetch from and post back to a relay URL.
    Relay { url: String },
    /// Read from a local file; no network.
    LocalFile { path: PathBuf },
}

/// Per-invocation settings.
#[derive(Debug, Clone)]
pub struct SignOptions {
    pub mode: SignMode,
    pub signer: String,
    pub include: Vec<IncludeField>,
    /// Skip the confirmation gate (`--yes`).
    pub skip_confirmation: bool,
    /// Prompt even when `skip_confirmation` is set.
    pub force_confirmation: bool,
}

impl SignOptions {
    pub fn relay(url: impl Into<String>, signer: impl Into<String>) -> Self {
        Self {
            mode: SignMode::Relay { url: url.into() },
            signer: signer.into(),
            include: Vec::new(),
            skip_confirmation: false,
            force_confirmation: false,
        }
    }

    pub fn local_file(path: impl Into<PathBuf>, signer: impl Into<String>) -> Self {
        Self {
            mode: SignMode::LocalFile { path: path.into() },
            signer: signer.into(),
            include: Vec::new(),
            skip_confirmation: false,
            force_confirmation: false,
        }
    }

    pub fn with_include(mut self, include: Vec<IncludeField>) -> Self {
        self.include = include;
        self
    }

    pub fn skip_confirmation(mut self, skip: bool) -> Self {
        self.skip_confirmation = skip;
        self
    }

    /// Always prompt, whatever `skip_confirmation` says.
    pub fn force_confirmation(mut self) -> Self {
        self.force_confirmation = true;
        self
    }

    pub fn requires_confirmation(&self) -> bool {
        self.force_confirmation || !self.skip_confirmation
    }
}

/// A workflow step failed.
///
/// `outcome` is present only when signing had already succeeded, i.e. the
/// failure happened while posting.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct WorkflowFailure {
    pub source: CosignError,
    pub failed_at: WorkflowState,
    pub trail: Vec<WorkflowState>,
    pub outcome: Option<SignOutcome>,
}

struct Progress {
    trail: Vec<WorkflowState>,
}

impl Progress {
    fn new() -> Self {
        Self { trail: Vec::new() }
    }

    fn enter(&mut self, state: WorkflowState) {
        tracing::debug!(state = ?state, "Workflow state");
        self.trail.push(state);
    }

    fn current(&self) -> Option<WorkflowState> {
        self.trail.last().copied()
    }

    fn fail(mut self, source: CosignError, outcome: Option<SignOutcome>) -> WorkflowFailure {
        let failed_at = self.current().unwrap_or(WorkflowState::Signing);
        tracing::warn!(
            failed_at = ?failed_at,
            kind = source.kind(),
            error = %source,
            "Workflow failed"
        );
        self.trail.push(WorkflowState::Failed);
        WorkflowFailure {
            source,
            failed_at,
            trail: self.trail,
            outcome,
        }
    }
}

/// Runs one sign invocation end to end.
pub struct RelayWorkflow {
    transport: RelayTransport,
    service: SigningService,
}

impl RelayWorkflow {
    pub fn new(transport: RelayTransport, service: SigningService) -> Self {
        Self { transport, service }
    }

    pub async fn run(
        &self,
        accounts: &Accounts,
        options: &SignOptions,
    ) -> Result<SignOutcome, WorkflowFailure> {
        let mut progress = Progress::new();

        let envelope = match &options.mode {
            SignMode::Relay { url } => {
                progress.enter(WorkflowState::Fetching);
                match self.transport.retrieve(url).await {
                    Ok(body) => {
                        progress.enter(WorkflowState::Fetched);
                        body
                    }
                    Err(e) => return Err(progress.fail(e, None)),
                }
            }
            SignMode::LocalFile { path } => match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    progress.enter(WorkflowState::Signing);
                    let err = CosignError::Input(format!(
                        "failed to read partial transaction from {}: {}",
                        path.display(),
                        e
                    ));
                    return Err(progress.fail(err, None));
                }
            },
        };

        progress.enter(WorkflowState::Signing);
        let account = match accounts.by_name(&options.signer) {
            Ok(account) => account,
            Err(e) => return Err(progress.fail(e.into(), None)),
        };

        let signed = match self
            .service
            .sign(account, &envelope, options.requires_confirmation())
            .await
        {
            Ok(signed) => signed,
            Err(e) => return Err(progress.fail(e, None)),
        };
        progress.enter(WorkflowState::Signed);

        let mut outcome = SignOutcome {
            rlp: envelope_hex(&envelope),
            signed: signed.to_hex(),
            transaction: signed.into_transaction(),
            include: options.include.clone(),
            fetched: false,
            posted: false,
            trail: Vec::new(),
        };

        if let SignMode::Relay { url } = &options.mode {
            outcome.fetched = true;
            progress.enter(WorkflowState::Posting);
            if let Err(e) = self.transport.post(url, &outcome.signed).await {
                let mut failure = progress.fail(e, None);
                outcome.trail = failure.trail.clone();
                failure.outcome = Some(outcome);
                return Err(failure);
            }
            outcome.posted = true;
        }

        progress.enter(WorkflowState::Complete);
        outcome.trail = progress.trail;
        Ok(outcome)
    }
}
