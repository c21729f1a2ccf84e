//! Administrative HTTP surface.
//!
//! Served on its own listener so it never competes with proxied paths.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use crate::config::ConfigReloader;
use crate::load_balancer::ServerPool;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub pool: Arc<ServerPool>,
    pub reloader: Arc<ConfigReloader>,
    pub api_key: Option<String>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/config", put(put_config))
        .route("/backends", get(get_backends))
        .route("/status", get(get_status))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
