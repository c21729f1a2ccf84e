//! Runtime replacement of the backend list.
//!
//! # Responsibilities
//! - Parse and validate a reload payload before touching anything
//! - Persist the accepted config to the config file
//! - Swap the pool's backends in one step
//!
//! # Design Decisions
//! - One reload at a time (async mutex held for the whole reload)
//! - A rejected payload leaves the running pool and the file untouched
//! - A failed write is logged and the pool is still updated
//! - A changed `port` is persisted but only takes effect on restart

use std::path::PathBuf;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use crate::config::loader::save_config;
use crate::config::schema::BalancerConfig;
use crate::config::validation::{join_errors, parse_backend_urls, ValidationError};
use crate::load_balancer::{pool::build_backends, ServerPool, Transport};

/// Body accepted by the reload endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReloadPayload {
    #[serde(default)]
    pub port: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("malformed reload payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid reload payload: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("reload payload lists no backends")]
    NoBackends,
}

/// Applies reloads to a running pool.
pub struct ConfigReloader {
    pool: Arc<ServerPool>,
    transport: Arc<dyn Transport>,
    path: Option<PathBuf>,
    current: Mutex<BalancerConfig>,
}

impl ConfigReloader {
    /// `path` is where accepted configs are written; `None` keeps them in memory.
    pub fn new(
        pool: Arc<ServerPool>,
        transport: Arc<dyn Transport>,
        config: BalancerConfig,
        path: Option<PathBuf>,
    ) -> Self {
        Self {
            pool,
            transport,
            path,
            current: Mutex::new(config),
        }
    }

    /// The last accepted configuration.
    pub async fn current(&self) -> BalancerConfig {
        self.current.lock().await.clone()
    }

    /// Parse a raw JSON body and apply it.
    pub async fn reload_json(&self, body: &[u8]) -> Result<ReloadPayload, ReloadError> {
        let payload: ReloadPayload = serde_json::from_slice(body)?;
        self.reload(payload).await
    }

    /// Validate `payload`, persist it, then replace every backend in the pool.
    pub async fn reload(&self, payload: ReloadPayload) -> Result<ReloadPayload, ReloadError> {
        let mut errors = Vec::new();
        if !payload.port.is_empty() && payload.port.parse::<u16>().map(|p| p == 0).unwrap_or(true) {
            errors.push(ValidationError::InvalidPort(payload.port.clone()));
        }
        let urls = match parse_backend_urls(&payload.urls) {
            Ok(urls) => urls,
            Err(mut url_errors) => {
                errors.append(&mut url_errors);
                Vec::new()
            }
        };
        if !errors.is_empty() {
            return Err(ReloadError::Invalid(errors));
        }
        if urls.is_empty() {
            return Err(ReloadError::NoBackends);
        }

        let mut current = self.current.lock().await;

        let mut next = current.clone();
        next.urls = payload.urls.clone();
        if !payload.port.is_empty() {
            if payload.port != current.port {
                tracing::warn!(
                    current = %current.port,
                    requested = %payload.port,
                    "Port change takes effect on restart"
                );
            }
            next.port = payload.port.clone();
        }

        if let Some(path) = &self.path {
            if let Err(e) = save_config(path, &next) {
                tracing::error!(path = ?path, error = %e, "Failed to persist reloaded config");
            }
        }

        self.pool.replace_backends(build_backends(&urls, self.transport.clone()));
        *current = next;

        tracing::info!(backends = urls.len(), "Backend pool reloaded");
        Ok(ReloadPayload {
            port: current.port.clone(),
            urls: payload.urls,
        })
    }
}
