use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 Vive Encante catálogo server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_code_allocated(key: &str, code: &str) {
    info!("🔢 Código alocado: {} ({})", code, key);
}

pub fn log_entity_created(collection: &str, id: &str, codigo: Option<&str>) {
    match codigo {
        Some(c) => info!("✅ Documento criado: {}/{} - Código: {}", collection, id, c),
        None => info!("✅ Documento criado: {}/{}", collection, id),
    }
}

pub fn log_entity_updated(collection: &str, id: &str, fields: usize) {
    info!("✏️ Documento atualizado: {}/{} ({} campos)", collection, id, fields);
}

pub fn log_entity_deleted(collection: &str, id: &str) {
    info!("🗑️ Documento removido: {}/{}", collection, id);
}

pub fn log_admin_denied(reason: &str) {
    warn!("🔒 Acesso admin negado: {}", reason);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
