use crate::{
    auth::AdminUser,
    websocket::hub::HubStats,
    AppState,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// Public liveness check
pub async fn basic_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Uptime, store connectivity and connection counts
pub async fn detailed_health(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<Value> {
    let store_status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::error!("Store connectivity issue: {}", e);
            "unhealthy"
        }
    };

    let stats = state.hub.stats();
    let status = if store_status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.server.environment,
        "store": {
            "backend": state.store.backend(),
            "status": store_status,
        },
        "connections": {
            "total": stats.total,
            "admins": stats.admins,
            "displays": stats.displays,
        },
    }))
}

pub async fn socket_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<HubStats> {
    Json(state.hub.stats())
}
