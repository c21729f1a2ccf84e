//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered backend list (order = rotation order)
//! - Select the next alive backend
//! - Apply liveness updates from health checks and failover
//! - Replace the whole backend set on reload

use std::sync::Arc;
use std::time::Duration;
use arc_swap::ArcSwap;
use url::Url;
use crate::load_balancer::{
    LoadBalancer,
    backend::{Backend, Transport},
    round_robin::RoundRobin,
};

/// The set of configured backends plus the selection cursor.
///
/// Readers take a lock-free snapshot of the list; writers publish a new list.
/// A backend removed by a reload may still serve requests that already hold
/// it, and liveness updates addressed to it are ignored.
#[derive(Debug)]
pub struct ServerPool {
    backends: ArcSwap<Vec<Arc<Backend>>>,
    balancer: Box<dyn LoadBalancer>,
}

impl Default for ServerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerPool {
    /// Create an empty round-robin pool.
    pub fn new() -> Self {
        Self::with_balancer(Box::new(RoundRobin::new()))
    }

    pub fn with_balancer(balancer: Box<dyn LoadBalancer>) -> Self {
        Self {
            backends: ArcSwap::from_pointee(Vec::new()),
            balancer,
        }
    }

    /// Build a pool with one backend per URL, all sharing `transport`.
    pub fn from_urls(urls: &[Url], transport: Arc<dyn Transport>) -> Self {
        let pool = Self::new();
        pool.replace_backends(build_backends(urls, transport));
        pool
    }

    /// Append a backend to the rotation.
    pub fn add_backend(&self, backend: Arc<Backend>) {
        tracing::info!(backend = %backend.address(), "Configured server");
        self.backends.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(backend.clone());
            next
        });
    }

    /// Drop every backend.
    pub fn remove_all_backends(&self) {
        self.backends.store(Arc::new(Vec::new()));
    }

    /// Remove all backends and add `backends` in order, published as one swap
    /// so concurrent selection never sees an empty pool in between.
    pub fn replace_backends(&self, backends: Vec<Arc<Backend>>) {
        for backend in &backends {
            tracing::info!(backend = %backend.address(), "Configured server");
        }
        self.backends.store(Arc::new(backends));
    }

    /// Set liveness for the backend at `address`.
    ///
    /// Returns false, and changes nothing, if no backend has that address.
    pub fn mark_backend_status(&self, address: &Url, alive: bool) -> bool {
        match self.backends.load().iter().find(|b| b.address() == address) {
            Some(backend) => {
                backend.set_alive(alive);
                true
            }
            None => {
                tracing::debug!(backend = %address, alive, "Status update for unknown backend ignored");
                false
            }
        }
    }

    /// Next alive backend in rotation, or `None` when the pool is empty or
    /// every backend is down.
    pub fn next_peer(&self) -> Option<Arc<Backend>> {
        self.balancer.next_server(&self.backends.load())
    }

    /// Probe every backend once and record the result.
    pub async fn health_check(&self, timeout: Duration) {
        let snapshot = self.backends.load_full();
        for backend in snapshot.iter() {
            let alive = backend.probe(timeout).await;
            backend.set_alive(alive);
            if alive {
                tracing::info!(backend = %backend.address(), status = "up", "Backend status");
            } else {
                tracing::warn!(backend = %backend.address(), status = "down", "Backend status");
            }
        }
    }

    /// Snapshot of the current backends.
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        self.backends.load().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.backends.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.load().is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.backends.load().iter().filter(|b| b.is_alive()).count()
    }
}

/// One backend per URL, in order.
pub fn build_backends(urls: &[Url], transport: Arc<dyn Transport>) -> Vec<Arc<Backend>> {
    urls.iter()
        .map(|url| Arc::new(Backend::new(url.clone(), transport.clone())))
        .collect()
}
