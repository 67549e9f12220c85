/// Middleware de autenticação para a API administrativa
///
/// Exige o cookie de sessão do Firebase (`session`) e que o e-mail da
/// sessão esteja em `ADMIN_ALLOWED_EMAILS`.
///
/// # Respostas
///
/// - **200 OK**: sessão válida e e-mail autorizado, segue para o handler
/// - **403 Forbidden**: `{"error": "Not authorized"}` para cookie ausente,
///   sessão inválida/expirada ou e-mail fora da lista
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::session_cookie_value;
use crate::utils::logging::log_admin_denied;
use crate::utils::AppError;
use crate::AppState;

/// E-mail do admin autenticado, disponível como extension nos handlers
#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub email: String,
}

pub async fn require_admin_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let cookie = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| session_cookie_value(header, &state.settings.admin.session_cookie));

    let Some(cookie) = cookie else {
        log_admin_denied("cookie de sessão ausente");
        return Err(forbidden());
    };

    let claims = match state.sessions.verify(&cookie).await {
        Ok(claims) => claims,
        Err(e) => {
            log_admin_denied(&e.to_string());
            return Err(forbidden());
        }
    };

    let email = match claims.email {
        Some(email) if state.settings.admin.is_allowed_email(Some(&email)) => email,
        other => {
            log_admin_denied(&format!("e-mail fora da lista: {:?}", other));
            return Err(forbidden());
        }
    };

    tracing::debug!("✅ Admin access granted: {}", email);
    request.extensions_mut().insert(AdminIdentity { email });

    Ok(next.run(request).await)
}

fn forbidden() -> Response {
    AppError::Unauthorized.into_response()
}
