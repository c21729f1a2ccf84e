//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Buffer each request and hand it to the routing engine
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::http::request::ProxyRequest;
use crate::routing::Router as ProxyRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub max_body_size: usize,
}

/// Client-facing HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(router: Arc<ProxyRouter>, config: &ListenerConfig) -> Self {
        let state = AppState {
            router,
            max_body_size: config.max_body_size,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The assembled router, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Load balancer started");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the request body, then lets the router pick a backend.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    let request = match ProxyRequest::from_request(request, remote_addr, state.max_body_size).await {
        Ok(request) => request,
        Err(e) if exceeds_length_limit(&e) => {
            tracing::warn!(remote_addr = ?remote_addr, limit = state.max_body_size, "Request body too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(remote_addr = ?remote_addr, error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    tracing::debug!(
        request_id = %request.request_id(),
        method = %request.method,
        path = %request.path(),
        "Proxying request"
    );

    state.router.route(&request).await
}

/// True when `error` (or anything it wraps) is the body length limit.
fn exceeds_length_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
