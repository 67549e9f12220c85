//! API administrativa (`/admin/api/...`), protegida por
//! [`require_admin_session`](crate::middleware::require_admin_session)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use super::extract::AppJson;
use crate::middleware::AdminIdentity;
use crate::models::Body;
use crate::services::Created;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// Corpo da requisição precisa ser um objeto JSON
fn body_object(value: Value) -> AppResult<Body> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::ValidationError("Invalid body".to_string())),
    }
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// ------------------------------------------------------------------
// Kits
// ------------------------------------------------------------------

pub async fn list_kits(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/kits", "GET");

    let kits = state.kits.list_all().await?;
    Ok(Json(json!({ "kits": kits })))
}

pub async fn create_kit(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Created>> {
    log_request_received("/admin/api/kits", "POST");

    let created = state.kits.create(&body_object(body)?).await?;
    log_info(&format!("👤 Kit {} criado por {}", created.id, admin.email));
    Ok(Json(created))
}

pub async fn get_kit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/kits/:id", "GET");

    let kit = state.kits.get(id.trim()).await?;
    Ok(Json(json!({ "kit": kit })))
}

pub async fn update_kit(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/kits/:id", "PATCH");

    state.kits.update(id.trim(), &body_object(body)?).await?;
    log_info(&format!("👤 Kit {} atualizado por {}", id, admin.email));
    Ok(ok())
}

pub async fn delete_kit(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/kits/:id", "DELETE");

    state.kits.delete(id.trim()).await?;
    log_info(&format!("👤 Kit {} removido por {}", id, admin.email));
    Ok(ok())
}

// ------------------------------------------------------------------
// Produtos
// ------------------------------------------------------------------

pub async fn list_produtos(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/produtos", "GET");

    let produtos = state.produtos.list_all().await?;
    Ok(Json(json!({ "produtos": produtos })))
}

pub async fn create_produto(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Created>> {
    log_request_received("/admin/api/produtos", "POST");

    let created = state.produtos.create(&body_object(body)?).await?;
    log_info(&format!("👤 Produto {} criado por {}", created.id, admin.email));
    Ok(Json(created))
}

pub async fn get_produto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/produtos/:id", "GET");

    let produto = state.produtos.get(id.trim()).await?;
    Ok(Json(json!({ "produto": produto })))
}

pub async fn update_produto(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/produtos/:id", "PATCH");

    state.produtos.update(id.trim(), &body_object(body)?).await?;
    log_info(&format!("👤 Produto {} atualizado por {}", id, admin.email));
    Ok(ok())
}

pub async fn delete_produto(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/produtos/:id", "DELETE");

    state.produtos.delete(id.trim()).await?;
    log_info(&format!("👤 Produto {} removido por {}", id, admin.email));
    Ok(ok())
}

// ------------------------------------------------------------------
// Galeria
// ------------------------------------------------------------------

pub async fn list_galeria(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/galeria", "GET");

    let items = state.galeria.list_all().await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn create_galeria_item(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Created>> {
    log_request_received("/admin/api/galeria", "POST");

    let created = state.galeria.create(&body_object(body)?).await?;
    log_info(&format!("👤 Foto {} adicionada por {}", created.id, admin.email));
    Ok(Json(created))
}

pub async fn get_galeria_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/galeria/:id", "GET");

    let item = state.galeria.get(id.trim()).await?;
    Ok(Json(json!({ "item": item })))
}

pub async fn update_galeria_item(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/galeria/:id", "PATCH");

    state.galeria.update(id.trim(), &body_object(body)?).await?;
    log_info(&format!("👤 Foto {} atualizada por {}", id, admin.email));
    Ok(ok())
}

pub async fn delete_galeria_item(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/admin/api/galeria/:id", "DELETE");

    state.galeria.delete(id.trim()).await?;
    log_info(&format!("👤 Foto {} removida por {}", id, admin.email));
    Ok(ok())
}
