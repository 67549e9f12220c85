// Biblioteca do catálogo Vive Encante
// Expõe módulos e o router para uso em testes e no binário

pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use contador::{CounterKey, CounterStore, SequentialCodeAllocator};
use tower_http::cors::{Any, CorsLayer};

use auth::SessionVerifier;
use config::Settings;
use services::{GaleriaService, KitService, ProdutoService};
use store::DocumentStore;

// AppState é definido aqui para ser compartilhado
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn DocumentStore>,
    pub codes: SequentialCodeAllocator,
    pub sessions: Arc<dyn SessionVerifier>,
    pub kits: KitService,
    pub produtos: ProdutoService,
    pub galeria: GaleriaService,
}

impl AppState {
    pub fn new(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        counters: Arc<dyn CounterStore>,
        sessions: Arc<dyn SessionVerifier>,
    ) -> Self {
        let codes = SequentialCodeAllocator::new(counters);

        let kits = KitService::new(
            store.clone(),
            codes.clone(),
            settings.codes.format_for(CounterKey::Kits),
        );
        let produtos = ProdutoService::new(
            store.clone(),
            codes.clone(),
            settings.codes.format_for(CounterKey::Produtos),
        );
        let galeria = GaleriaService::new(store.clone());

        Self {
            settings,
            store,
            codes,
            sessions,
            kits,
            produtos,
            galeria,
        }
    }
}

/// Rotas da aplicação (sem as layers de observabilidade, aplicadas no `main`)
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let public_routes = Router::new()
        .route("/api/public/kits", get(handlers::public_kits))
        .route("/api/public/kits/:id", get(handlers::public_kit))
        .route("/api/public/produtos", get(handlers::public_produtos))
        .route("/api/public/produtos/:id", get(handlers::public_produto))
        .route("/api/public/galeria", get(handlers::public_galeria))
        .route("/api/public/contato", get(handlers::public_contato))
        .layer(public_cors);

    // ✅ Rotas administrativas protegidas pelo cookie de sessão
    let admin_routes = Router::new()
        .route(
            "/admin/api/kits",
            get(handlers::list_kits).post(handlers::create_kit),
        )
        .route(
            "/admin/api/kits/:id",
            get(handlers::get_kit)
                .patch(handlers::update_kit)
                .delete(handlers::delete_kit),
        )
        .route(
            "/admin/api/produtos",
            get(handlers::list_produtos).post(handlers::create_produto),
        )
        .route(
            "/admin/api/produtos/:id",
            get(handlers::get_produto)
                .patch(handlers::update_produto)
                .delete(handlers::delete_produto),
        )
        .route(
            "/admin/api/galeria",
            get(handlers::list_galeria).post(handlers::create_galeria_item),
        )
        .route(
            "/admin/api/galeria/:id",
            get(handlers::get_galeria_item)
                .patch(handlers::update_galeria_item)
                .delete(handlers::delete_galeria_item),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin_session,
        ));

    Router::new()
        // Health checks (públicos)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/status", get(handlers::status_check))
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
