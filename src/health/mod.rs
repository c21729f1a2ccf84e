//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → ServerPool::health_check (TCP probe per backend, sequential)
//!     → Backend liveness updated
//!
//! Passive signal (routing::router):
//!     Retries against a backend exhausted
//!     → ServerPool::mark_backend_status(address, false)
//! ```
//!
//! # Design Decisions
//! - No thresholds: one failed probe marks down, one success marks up
//! - A backend marked down by failover heals on its next successful probe
//! - Health state is per-backend, not per-pool

pub mod active;

pub use active::HealthChecker;
