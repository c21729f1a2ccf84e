//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (subscriber, filter, stdout)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the access span and every routing event
//! - No metrics export

pub mod logging;
