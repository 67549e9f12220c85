/// Middleware layer para o Axum router
///
/// - Autenticação da API administrativa (cookie de sessão + allow-list)
pub mod admin_auth;

pub use admin_auth::{require_admin_session, AdminIdentity};
