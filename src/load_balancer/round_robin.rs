//! Round-robin load balancing strategy.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Round-robin selector.
/// Stores an ever-increasing cursor; only its value modulo the pool size matters.
/// When dead backends are skipped the cursor jumps to just past the chosen one.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        // fetch_add wraps on overflow, which keeps the modulo walk valid
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let len = backends.len();

        for offset in 0..len {
            let index = start.wrapping_add(offset) % len;
            let backend = &backends[index];
            if backend.is_alive() {
                if offset != 0 {
                    // Resume the rotation right after the backend we skipped to.
                    self.cursor.store(index + 1, Ordering::Relaxed);
                }
                return Some(backend.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::backend::testing::{backend, EchoTransport};

    fn three() -> Vec<Arc<Backend>> {
        let t = Arc::new(EchoTransport);
        vec![
            backend("http://10.0.0.1:80", t.clone()),
            backend("http://10.0.0.2:80", t.clone()),
            backend("http://10.0.0.3:80", t),
        ]
    }

    fn host(b: &Arc<Backend>) -> &str {
        b.address().host_str().unwrap()
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let backends = three();

        let picked: Vec<_> = (0..6)
            .map(|_| lb.next_server(&backends).unwrap())
            .collect();
        let hosts: Vec<_> = picked.iter().map(host).collect();
        assert_eq!(
            hosts,
            ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.1", "10.0.0.2", "10.0.0.3"]
        );
    }

    #[test]
    fn skips_dead_backends() {
        let lb = RoundRobin::new();
        let backends = three();
        backends[1].set_alive(false);

        for _ in 0..30 {
            let b = lb.next_server(&backends).unwrap();
            assert!(b.is_alive());
            assert_ne!(host(&b), "10.0.0.2");
        }
    }

    #[test]
    fn all_dead_returns_none() {
        let lb = RoundRobin::new();
        let backends = three();
        for b in &backends {
            b.set_alive(false);
        }

        for _ in 0..10 {
            assert!(lb.next_server(&backends).is_none());
        }
    }

    #[test]
    fn empty_returns_none() {
        assert!(RoundRobin::new().next_server(&[]).is_none());
    }

    #[test]
    fn cursor_wraps_without_panicking() {
        let lb = RoundRobin { cursor: AtomicUsize::new(usize::MAX) };
        let backends = three();
        assert!(lb.next_server(&backends).is_some());
        assert!(lb.next_server(&backends).is_some());
    }
}
