//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Update backend liveness based on results

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use crate::config::HealthCheckConfig;
use crate::load_balancer::ServerPool;

pub struct HealthChecker {
    pool: Arc<ServerPool>,
    config: HealthCheckConfig,
}

impl HealthChecker {
    pub fn new(pool: Arc<ServerPool>, config: HealthCheckConfig) -> Self {
        Self { pool, config }
    }

    /// Run the checker on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            "Health checker starting"
        );

        let interval = self.config.interval();
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::info!("Starting health check...");
                    tokio::select! {
                        _ = self.pool.health_check(self.config.timeout()) => {
                            tracing::info!(
                                alive = self.pool.alive_count(),
                                total = self.pool.len(),
                                "Health check completed"
                            );
                        }
                        _ = shutdown.recv() => break,
                    }
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Health checker received shutdown signal, exiting loop");
    }
}
