use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use contador::CounterKey;
use serde_json::{json, Value};

use crate::utils::logging::*;
use crate::AppState;

const SERVICE_NAME: &str = "vive-encante-catalogo";

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Pronto quando o store responde
pub async fn ready_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    log_health_check();

    let (ready, store_status) = match state.store.ping().await {
        Ok(()) => (true, json!({ "status": "connected" })),
        Err(e) => {
            log_warning(&format!("⚠️ Store indisponível no /ready: {}", e));
            (false, json!({ "status": "disconnected", "error": e.to_string() }))
        }
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "ready": ready,
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "dependencies": {
                "store": store_status,
                "backend": state.settings.server.store_backend
            }
        })),
    )
}

/// Estado dos contadores de código (último número emitido)
pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    let mut counters = serde_json::Map::new();
    for key in [CounterKey::Kits, CounterKey::Produtos] {
        let value = match state.codes.current(key).await {
            Ok(current) => json!({
                "current": current,
                "lastCode": if current > 0 {
                    Value::String(state.settings.codes.format_for(key).format(current))
                } else {
                    Value::Null
                }
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        counters.insert(key.as_str().to_string(), value);
    }

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
        "backend": state.settings.server.store_backend,
        "firestore": {
            "project": state.settings.firestore.project_id,
            "emulator": state.settings.firestore.emulator_host.is_some()
        },
        "admin_emails_configured": !state.settings.admin.allowed_emails().is_empty(),
        "counters": counters
    }))
}
