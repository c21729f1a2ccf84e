//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (per-backend, no pool-wide lock)
//! - Probe reachability with a bounded TCP connect
//! - Forward a request through the configured transport

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use axum::body::Body;
use axum::http::Response;
use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::net::TcpStream;
use url::{Host, Url};
use crate::http::request::ProxyRequest;

/// Why a single forward to a backend failed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("{0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Proxies one request to an upstream address.
///
/// Implementations report every failure as a `ForwardError`; the router owns
/// the retry and failover policy.
pub trait Transport: Send + Sync {
    fn forward<'a>(
        &'a self,
        target: &'a Url,
        request: &'a ProxyRequest,
    ) -> BoxFuture<'a, Result<Response<Body>, ForwardError>>;
}

/// A single backend server.
pub struct Backend {
    address: Url,
    alive: AtomicBool,
    transport: Arc<dyn Transport>,
}

impl Backend {
    /// Create a new backend. Backends start alive.
    pub fn new(address: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            address,
            alive: AtomicBool::new(true),
            transport,
        }
    }

    /// The upstream address.
    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Forward one request to this backend.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<Response<Body>, ForwardError> {
        self.transport.forward(&self.address, request).await
    }

    /// Try a TCP connection to the backend, giving up after `timeout`.
    ///
    /// Connection errors and timeouts both report unreachable.
    pub async fn probe(&self, timeout: Duration) -> bool {
        let Some(target) = connect_target(&self.address) else {
            return false;
        };

        match tokio::time::timeout(timeout, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(backend = %self.address, error = %e, "Probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(backend = %self.address, ?timeout, "Probe failed: timeout");
                false
            }
        }
    }
}

/// `host:port` to connect to, with IPv6 literals bracketed for the resolver.
fn connect_target(address: &Url) -> Option<String> {
    let port = address.port_or_known_default()?;
    match address.host()? {
        Host::Domain(domain) => Some(format!("{domain}:{port}")),
        Host::Ipv4(ip) => Some(SocketAddr::from((ip, port)).to_string()),
        Host::Ipv6(ip) => Some(SocketAddr::from((ip, port)).to_string()),
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("address", &self.address.as_str())
            .field("alive", &self.is_alive())
            .finish()
    }
}
