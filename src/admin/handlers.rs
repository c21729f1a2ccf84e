use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use crate::admin::AdminState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub backends: usize,
    pub alive: usize,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub alive: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let alive = state.pool.alive_count();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if alive > 0 { "operational" } else { "degraded" },
        backends: state.pool.len(),
        alive,
    })
}

pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .pool
        .backends()
        .iter()
        .map(|b| BackendStatus {
            address: b.address().to_string(),
            alive: b.is_alive(),
        })
        .collect();

    Json(statuses)
}

/// Replace the backend list. The body is parsed here so that malformed JSON
/// gets the same 400 as a payload that fails validation.
pub async fn put_config(State(state): State<AdminState>, body: Bytes) -> Response {
    match state.reloader.reload_json(&body).await {
        Ok(accepted) => (StatusCode::OK, Json(accepted)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Reload rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
