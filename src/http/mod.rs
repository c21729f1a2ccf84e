//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, access tracing)
//!     → request.rs (buffer body, keep for replay)
//!     → [routing layer retries and fails over]
//!     → upstream.rs (rewrite for the backend, send, strip hop-by-hop)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod upstream;

pub use request::{ProxyRequest, X_REQUEST_ID};
pub use server::HttpServer;
pub use upstream::HyperTransport;
