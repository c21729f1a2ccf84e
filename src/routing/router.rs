//! Request dispatch with retry and failover.
//!
//! # Responsibilities
//! - Pick a backend from the pool for each request
//! - Retry the same backend on transient failures
//! - Mark a backend down and fail over once its retries are spent
//! - Answer 503 when nothing is left to try
//!
//! # Design Decisions
//! - Bounded loops, no recursion: at most `max_attempts` selections with
//!   `max_retries + 1` forwards each
//! - An empty or all-dead pool costs no budget
//! - Marking down is pool-wide, not per request

use std::sync::Arc;
use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;
use crate::http::request::ProxyRequest;
use crate::load_balancer::{Backend, ServerPool};
use crate::resilience::{AttemptState, RetryDecision, RetryPolicy};

/// Terminal routing failures. Both reach the client as 503.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no healthy backend available")]
    NoHealthyBackend,

    #[error("max attempts reached after {attempts} backend selections")]
    AttemptsExhausted { attempts: u32 },
}

impl IntoResponse for RouteError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::SERVICE_UNAVAILABLE, "Service not available").into_response()
    }
}

/// Per-request dispatcher over a shared pool.
#[derive(Debug, Clone)]
pub struct Router {
    pool: Arc<ServerPool>,
    policy: RetryPolicy,
}

impl Router {
    pub fn new(pool: Arc<ServerPool>, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    /// Dispatch and turn routing failures into 503 responses.
    pub async fn route(&self, request: &ProxyRequest) -> Response<Body> {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    /// Forward `request` to the pool, retrying and failing over as needed.
    pub async fn dispatch(&self, request: &ProxyRequest) -> Result<Response<Body>, RouteError> {
        let mut state = AttemptState::new();

        loop {
            if self.policy.exhausted(state) {
                tracing::warn!(
                    request_id = %request.request_id(),
                    remote_addr = ?request.remote_addr,
                    path = %request.path(),
                    attempts = state.attempts,
                    "Max attempts reached, terminating"
                );
                return Err(RouteError::AttemptsExhausted { attempts: state.attempts });
            }

            let Some(backend) = self.pool.next_peer() else {
                tracing::warn!(
                    request_id = %request.request_id(),
                    path = %request.path(),
                    "No healthy backends"
                );
                return Err(RouteError::NoHealthyBackend);
            };

            match self.forward_with_retries(&backend, request, state).await {
                Ok(response) => return Ok(response),
                Err(spent) => {
                    self.pool.mark_backend_status(backend.address(), false);
                    tracing::info!(
                        request_id = %request.request_id(),
                        remote_addr = ?request.remote_addr,
                        path = %request.path(),
                        backend = %backend.address(),
                        attempt = spent.attempts,
                        "Attempting retry"
                    );
                    state = spent.next_attempt();
                }
            }
        }
    }

    /// Forward to one backend until it succeeds or its retry budget is spent.
    ///
    /// On failure returns the state at the moment the budget ran out.
    async fn forward_with_retries(
        &self,
        backend: &Backend,
        request: &ProxyRequest,
        mut state: AttemptState,
    ) -> Result<Response<Body>, AttemptState> {
        loop {
            let error = match backend.forward(request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                request_id = %request.request_id(),
                backend = %backend.address(),
                error = %error,
                attempt = state.attempts,
                retry = state.retries,
                "Forward error"
            );

            match self.policy.on_failure(state) {
                RetryDecision::RetrySame => {
                    tokio::time::sleep(self.policy.backoff).await;
                    state = state.next_retry();
                }
                RetryDecision::Failover => return Err(state),
            }
        }
    }
}
