//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forward to backend fails:
//!     → retries.rs (retry same backend while budget remains)
//!     → budget spent: mark backend down, select another
//!     → attempts spent: 503
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline (see http::upstream)
//! - Retry and failover budgets are small, fixed and configurable

pub mod retries;

pub use retries::{AttemptState, RetryDecision, RetryPolicy};
