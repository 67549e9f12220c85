//! Access token para o Firestore REST
//!
//! Ordem de resolução:
//! 1. Emulador: token fixo `owner` (o emulador não valida)
//! 2. Token estático vindo da configuração
//! 3. Metadata server do GCP (Cloud Run), com cache até perto de expirar

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::store::{StoreError, StoreResult};

const METADATA_TOKEN_URL: &str = "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token?scopes=https://www.googleapis.com/auth/datastore";

/// Margem para renovar antes do vencimento real
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum TokenSource {
    Emulator,
    Static(String),
    Metadata {
        url: String,
        cache: RwLock<Option<CachedToken>>,
    },
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

impl TokenSource {
    pub fn metadata() -> Self {
        Self::metadata_at(METADATA_TOKEN_URL)
    }

    pub fn metadata_at(url: &str) -> Self {
        TokenSource::Metadata {
            url: url.to_string(),
            cache: RwLock::new(None),
        }
    }

    pub async fn bearer(&self, http: &Client) -> StoreResult<String> {
        match self {
            TokenSource::Emulator => Ok("owner".to_string()),
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata { url, cache } => {
                {
                    let cached = cache.read().await;
                    if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
                        return Ok(token.token.clone());
                    }
                }

                tracing::debug!("🔄 Token do Firestore expirado ou ausente, consultando metadata server");
                let fresh = Self::fetch_metadata_token(http, url).await?;
                let token = fresh.token.clone();
                *cache.write().await = Some(fresh);

                Ok(token)
            }
        }
    }

    async fn fetch_metadata_token(http: &Client, url: &str) -> StoreResult<CachedToken> {
        let response = http
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to contact metadata service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!(
                "Metadata service error (status {}): {}",
                status, error
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("Failed to parse token response: {}", e)))?;

        Ok(CachedToken {
            token: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}
