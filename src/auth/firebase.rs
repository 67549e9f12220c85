//! Verificação do cookie de sessão do Firebase
//!
//! JWT RS256 assinado com as chaves publicadas pelo Google
//! (`kid` -> certificado PEM). Regras:
//! - `iss` = `https://session.firebase.google.com/{project}`
//! - `aud` = `{project}`
//! - `exp` no futuro, `sub` não vazio
//!
//! As chaves ficam em cache por 1 hora.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use tokio::sync::RwLock;

use super::session::{SessionClaims, SessionError, SessionVerifier};
use crate::config::Settings;

const KEYS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct KeyCache {
    keys: HashMap<String, String>,
    fetched_at: Instant,
}

impl KeyCache {
    fn is_valid(&self) -> bool {
        self.fetched_at.elapsed() < KEYS_TTL
    }
}

pub struct FirebaseSessionVerifier {
    http: Client,
    keys_url: String,
    project_id: String,
    cache: RwLock<Option<KeyCache>>,
}

impl FirebaseSessionVerifier {
    pub fn new(project_id: &str, keys_url: &str) -> Self {
        Self {
            http: Client::new(),
            keys_url: keys_url.to_string(),
            project_id: project_id.to_string(),
            cache: RwLock::new(None),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.firestore.project_id, &settings.admin.session_keys_url)
    }

    fn issuer(&self) -> String {
        format!("https://session.firebase.google.com/{}", self.project_id)
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, String>, SessionError> {
        let response = self
            .http
            .get(&self.keys_url)
            .send()
            .await
            .map_err(|e| SessionError::KeysUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::KeysUnavailable(format!(
                "status {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<HashMap<String, String>>()
            .await
            .map_err(|e| SessionError::KeysUnavailable(format!("invalid keys payload: {}", e)))
    }

    /// PEM do `kid`; um `kid` fora do cache força uma nova busca (rotação de chaves)
    async fn key_for(&self, kid: &str) -> Result<String, SessionError> {
        {
            let cached = self.cache.read().await;
            if let Some(cache) = cached.as_ref().filter(|c| c.is_valid()) {
                if let Some(pem) = cache.keys.get(kid) {
                    return Ok(pem.clone());
                }
                tracing::debug!("🔑 kid '{}' fora do cache, recarregando chaves", kid);
            }
        }

        tracing::debug!("🔄 Atualizando chaves públicas de sessão");
        let keys = self.fetch_keys().await?;
        let pem = keys.get(kid).cloned();

        *self.cache.write().await = Some(KeyCache {
            keys,
            fetched_at: Instant::now(),
        });

        pem.ok_or_else(|| SessionError::UnknownKey(kid.to_string()))
    }
}

#[async_trait]
impl SessionVerifier for FirebaseSessionVerifier {
    async fn verify(&self, session_cookie: &str) -> Result<SessionClaims, SessionError> {
        let header = decode_header(session_cookie).map_err(|e| SessionError::Invalid(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(SessionError::Invalid(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| SessionError::Invalid("missing kid".to_string()))?;

        let pem = self.key_for(&kid).await?;
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| SessionError::KeysUnavailable(format!("invalid certificate for {}: {}", kid, e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer()]);
        validation.set_audience(&[self.project_id.as_str()]);

        let data = decode::<SessionClaims>(session_cookie, &key, &validation)
            .map_err(|e| SessionError::Invalid(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(SessionError::Invalid("empty sub".to_string()));
        }
        Ok(data.claims)
    }
}
