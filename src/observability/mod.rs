//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (url, state, key_index)
//!
//! Consumers:
//!     → logging.rs subscriber on stderr (text or JSON)
//! ```
//!
//! # Design Decisions
//! - Key material and signatures are never logged
//! - Workflow state transitions are logged at debug, failures at warn

pub mod logging;

pub use logging::init_logging;
