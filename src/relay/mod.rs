//! Relay subsystem: transport plus the fetch-sign-post workflow.
//!
//! # Data Flow
//! ```text
//! relay URL ──GET──▶ transport.rs ──envelope──▶ workflow.rs
//!                                                  │ Accounts::by_name
//!                                                  ▼
//!                                            SigningService::sign
//!                                                  │ signed hex
//! relay URL ◀──POST── transport.rs ◀───────────────┘
//!                                                  │
//!                                            result.rs (SignOutcome)
//! ```
//!
//! # Design Decisions
//! - One workflow serves both relay and local-file modes
//! - Every step is attempted once; failures end the run
//! - A post failure keeps the signed envelope in the returned failure

pub mod result;
pub mod transport;
pub mod workflow;

pub use result::{IncludeField, OutputFormat, SignOutcome};
pub use transport::RelayTransport;
pub use workflow::{RelayWorkflow, SignMode, SignOptions, WorkflowFailure, WorkflowState};
