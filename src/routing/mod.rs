//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered ProxyRequest
//!     → router.rs: attempts left? → pool.next_peer()
//!     → backend.forward()
//!         ok          → response to client
//!         err, retry  → sleep backoff, same backend
//!         err, spent  → mark down, next selection
//!     → nothing left  → 503
//! ```

pub mod router;

pub use router::{RouteError, Router};
