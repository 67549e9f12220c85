//! Catálogo público (`/api/public/...`), sem autenticação

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::services::whatsapp::{build_whatsapp_link, contact_link, detail_link, QuoteItem};
use crate::utils::logging::*;
use crate::utils::AppResult;
use crate::AppState;

fn quote_link(state: &AppState, section: &str, id: &str, nome: &str, codigo: &str, foto: &str) -> String {
    let catalog = &state.settings.catalog;
    let link = detail_link(&catalog.site_url, section, id);

    let item = QuoteItem {
        nome,
        codigo: Some(codigo),
        link: &link,
        foto_url: Some(foto),
    };
    build_whatsapp_link(&catalog.whatsapp_number, &catalog.site_name, &item)
}

pub async fn public_kits(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/api/public/kits", "GET");

    let kits = state.kits.list_public().await?;
    Ok(Json(json!({ "kits": kits })))
}

pub async fn public_kit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/api/public/kits/:id", "GET");

    let kit = state.kits.get_public(id.trim()).await?;
    let whatsapp = quote_link(&state, "kits", &kit.id, &kit.nome, &kit.codigo, &kit.foto_url);

    Ok(Json(json!({ "kit": kit, "whatsappLink": whatsapp })))
}

pub async fn public_produtos(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/api/public/produtos", "GET");

    let produtos = state.produtos.list_public().await?;
    Ok(Json(json!({ "produtos": produtos })))
}

pub async fn public_produto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/api/public/produtos/:id", "GET");

    let produto = state.produtos.get_public(id.trim()).await?;
    let whatsapp = quote_link(
        &state,
        "produtos",
        &produto.id,
        &produto.nome,
        &produto.codigo,
        &produto.foto_url,
    );

    Ok(Json(json!({ "produto": produto, "whatsappLink": whatsapp })))
}

pub async fn public_galeria(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/api/public/galeria", "GET");

    let itens = state.galeria.list_public().await?;
    Ok(Json(json!({ "itens": itens })))
}

pub async fn public_contato(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_request_received("/api/public/contato", "GET");

    Json(json!({
        "whatsappNumber": state.settings.catalog.whatsapp_number,
        "whatsappLink": contact_link(&state.settings.catalog)
    }))
}
