/// Servidor do catálogo Vive Encante
///
/// - Catálogo público (kits, produtos, galeria) e links de orçamento WhatsApp
/// - API administrativa com sessão do Firebase
/// - Códigos sequenciais (`KIT-0001`, `PROD-0001`) via transação no Firestore
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vive_encante_catalogo::auth::{FirebaseSessionVerifier, SessionVerifier};
use vive_encante_catalogo::config::Settings;
use vive_encante_catalogo::store::{DocumentStore, FirestoreStore, MemoryStore};
use vive_encante_catalogo::utils::logging::*;
use vive_encante_catalogo::{build_router, AppState};

use contador::{CounterStore, TransactionRetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vive_encante_catalogo=debug,contador=debug")),
        )
        .init();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        // Em produção (Cloud Run), não existe .env
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new().context("Failed to load settings")?;
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    if settings.admin.allowed_emails().is_empty() {
        log_warning("⚠️ ADMIN_ALLOWED_EMAILS vazio: a API administrativa vai negar todos os acessos");
    }

    let (store, counters): (Arc<dyn DocumentStore>, Arc<dyn CounterStore>) =
        match settings.server.store_backend.as_str() {
            "memory" => {
                log_warning("⚠️ Store em memória: dados são perdidos ao reiniciar");
                let retry = TransactionRetry::new(
                    settings.firestore.max_transaction_attempts,
                    std::time::Duration::from_millis(settings.firestore.initial_backoff_ms),
                );
                let memory = Arc::new(MemoryStore::with_retry(retry));
                let store: Arc<dyn DocumentStore> = memory.clone();
                let counters: Arc<dyn CounterStore> = memory;
                (store, counters)
            }
            "firestore" => {
                let firestore = Arc::new(FirestoreStore::from_settings(&settings.firestore));
                log_info(&format!(
                    "🔥 Firestore: {} ({})",
                    settings.firestore.database_path(),
                    settings.firestore.effective_endpoint()
                ));
                let store: Arc<dyn DocumentStore> = firestore.clone();
                let counters: Arc<dyn CounterStore> = firestore;
                (store, counters)
            }
            other => anyhow::bail!("Unknown store backend '{}' (expected 'firestore' or 'memory')", other),
        };

    let sessions: Arc<dyn SessionVerifier> = Arc::new(FirebaseSessionVerifier::from_settings(&settings));

    let host = settings.server.host.clone();
    let port = settings.server.port;

    let state = Arc::new(AppState::new(settings, store, counters, sessions));
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("❌ Falha ao instalar handler de Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("❌ Falha ao instalar handler de SIGTERM: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
