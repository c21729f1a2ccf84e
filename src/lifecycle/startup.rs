//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and build the backend pool
//! - Start the health checker
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::validation::{parse_backend_urls, validate_config};
use crate::config::{BalancerConfig, ConfigError, ConfigReloader};
use crate::health::HealthChecker;
use crate::http::{HttpServer, HyperTransport};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{ServerPool, Transport};
use crate::resilience::RetryPolicy;
use crate::routing::Router as ProxyRouter;

/// Fatal startup and serving errors.
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no backends configured")]
    NoBackendsConfigured,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A fully wired load balancer, ready to serve.
pub struct Balancer {
    config: BalancerConfig,
    pool: Arc<ServerPool>,
    router: Arc<ProxyRouter>,
    reloader: Arc<ConfigReloader>,
}

impl Balancer {
    /// Build the pool and its collaborators from `config`.
    ///
    /// `path` is where reloads are persisted.
    pub fn from_config(config: BalancerConfig, path: Option<PathBuf>) -> Result<Self, BalancerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let urls = parse_backend_urls(&config.urls).map_err(ConfigError::Validation)?;
        if urls.is_empty() {
            return Err(BalancerError::NoBackendsConfigured);
        }

        let transport: Arc<dyn Transport> = Arc::new(HyperTransport::new(&config.timeouts));
        let pool = Arc::new(ServerPool::from_urls(&urls, transport.clone()));
        let router = Arc::new(ProxyRouter::new(pool.clone(), RetryPolicy::from(&config.retries)));
        let reloader = Arc::new(ConfigReloader::new(pool.clone(), transport, config.clone(), path));

        Ok(Self {
            config,
            pool,
            router,
            reloader,
        })
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    /// Serve client traffic on `listener` (and the admin API on
    /// `admin_listener`, if given) until `shutdown` fires.
    ///
    /// Every task subscribes to `shutdown` when this is called, not when the
    /// returned future is first polled, so a trigger in between is not lost.
    pub fn serve(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: &Shutdown,
    ) -> impl Future<Output = Result<(), BalancerError>> + Send + 'static {
        let health_shutdown = shutdown.subscribe();
        let admin_signal = shutdown.signalled();
        let server_signal = shutdown.signalled();
        let shutdown = shutdown.clone();

        async move {
            let health = HealthChecker::new(self.pool.clone(), self.config.health_check.clone())
                .spawn(health_shutdown);

            let admin = admin_listener.map(|admin_listener| {
                let app = setup_admin_router(AdminState {
                    pool: self.pool.clone(),
                    reloader: self.reloader.clone(),
                    api_key: self.config.admin.api_key.clone(),
                });
                tokio::spawn(async move {
                    if let Ok(addr) = admin_listener.local_addr() {
                        tracing::info!(address = %addr, "Admin API listening");
                    }
                    axum::serve(admin_listener, app)
                        .with_graceful_shutdown(admin_signal)
                        .await
                })
            });

            tracing::info!(
                backends = self.pool.len(),
                max_retries = self.config.retries.max_retries,
                max_attempts = self.config.retries.max_attempts,
                "Server configured"
            );

            let server = HttpServer::new(self.router.clone(), &self.config.listener);
            let result = server.run(listener, server_signal).await;

            // The client listener is gone either way; stop everything else too.
            shutdown.trigger();

            if let Some(admin) = admin {
                match admin.await {
                    Ok(Err(e)) => tracing::error!(error = %e, "Admin server failed"),
                    Err(e) => tracing::error!(error = %e, "Admin server task panicked"),
                    Ok(Ok(())) => {}
                }
            }
            if let Err(e) = health.await {
                tracing::error!(error = %e, "Health checker task panicked");
            }

            result?;
            tracing::info!("Shutdown complete");
            Ok(())
        }
    }
}

async fn bind(addr: &str) -> Result<TcpListener, BalancerError> {
    TcpListener::bind(addr).await.map_err(|source| BalancerError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Start the balancer from `config` and run until SIGINT/SIGTERM.
pub async fn run(config: BalancerConfig, path: Option<PathBuf>) -> Result<(), BalancerError> {
    let balancer = Balancer::from_config(config, path)?;

    let listener = bind(&balancer.config().listen_address()).await?;
    let admin_listener = if balancer.config().admin.enabled {
        Some(bind(&balancer.config().admin.bind_address).await?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let serving = balancer.serve(listener, admin_listener, &shutdown);

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    serving.await
}
