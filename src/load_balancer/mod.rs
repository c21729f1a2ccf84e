//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router asks for a peer
//!     → pool.rs (snapshot of current backends)
//!     → round_robin.rs (rotate from the cursor, skip dead backends)
//!     → backend.rs (forward through the transport)
//!     → Return response or ForwardError to the router
//! ```
//!
//! # Design Decisions
//! - Backend list is swapped whole on reload, never diffed
//! - Liveness is per backend; no lock spans the pool
//! - Unhealthy backends excluded from selection

use std::fmt::Debug;
use std::sync::Arc;

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, ForwardError, Transport};
pub use pool::ServerPool;

/// Backend selection strategy.
pub trait LoadBalancer: Send + Sync + Debug {
    /// Pick the next alive backend, or `None` if there is none.
    fn next_server(&self, backends: &[Arc<backend::Backend>]) -> Option<Arc<backend::Backend>>;
}
