//! Sessão do painel admin
//!
//! O login (fora deste serviço) troca o ID token do Firebase por um cookie
//! de sessão `session`. Aqui só verificamos o cookie recebido.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session cookie: {0}")]
    Invalid(String),

    #[error("Unknown signing key: {0}")]
    UnknownKey(String),

    #[error("Session keys unavailable: {0}")]
    KeysUnavailable(String),
}

/// Claims relevantes do cookie de sessão
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub exp: u64,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, session_cookie: &str) -> Result<SessionClaims, SessionError>;
}

/// Extrai e decodifica o cookie `name` do header `Cookie`
pub fn session_cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .filter(|value| !value.is_empty())
}
