//! Firestore via REST v1
//!
//! Documentos: `GET/DELETE {endpoint}/{database}/documents/{colecao}/{id}`,
//! escritas via `documents:commit` (com pré-condição `exists` e transforms de
//! `REQUEST_TIME` para os timestamps do servidor).
//!
//! Contadores: transação read-write explícita
//!
//! ```text
//! documents:beginTransaction  -> transaction id
//! GET _counters/{key}?transaction=..   (404 = valor 0)
//! documents:commit {writes, transaction}
//!     409 ABORTED -> conflito: backoff e nova transação (retryTransaction)
//!     outro erro  -> documents:rollback e falha
//! ```

pub mod token;
pub mod value;

use async_trait::async_trait;
use contador::{CounterError, CounterStore, TransactionRetry, COUNTERS_COLLECTION, COUNTER_VALUE_FIELD};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::FirestoreSettings;
use crate::store::{Document, DocumentStore, DocumentWrite, StoreError, StoreResult};

pub use token::TokenSource;
use value::{decode_document, encode_fields};

const LIST_PAGE_SIZE: &str = "300";

pub struct FirestoreStore {
    http: Client,
    endpoint: String,
    database_path: String,
    token: TokenSource,
    retry: TransactionRetry,
}

/// Resultado de uma tentativa de transação de contador
enum Attempt {
    Committed(u64),
    Conflict(Option<String>),
    Failed(StoreError),
}

#[derive(Deserialize)]
struct BeginTransactionResponse {
    transaction: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Value>,
    next_page_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(endpoint: &str, database_path: &str, token: TokenSource, retry: TransactionRetry) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            database_path: database_path.to_string(),
            token,
            retry,
        }
    }

    pub fn from_settings(settings: &FirestoreSettings) -> Self {
        let token = if settings.emulator_host.as_deref().is_some_and(|h| !h.is_empty()) {
            TokenSource::Emulator
        } else if let Some(token) = settings.access_token.clone().filter(|t| !t.is_empty()) {
            TokenSource::Static(token)
        } else {
            TokenSource::metadata()
        };

        let retry = TransactionRetry::new(
            settings.max_transaction_attempts,
            std::time::Duration::from_millis(settings.initial_backoff_ms),
        );

        Self::new(&settings.effective_endpoint(), &settings.database_path(), token, retry)
    }

    fn documents_url(&self) -> String {
        format!("{}/{}/documents", self.endpoint, self.database_path)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url(), collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url(), collection, urlencoding::encode(id))
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path, collection, id)
    }

    async fn authorized(&self, builder: RequestBuilder) -> StoreResult<RequestBuilder> {
        let token = self.token.bearer(&self.http).await?;
        Ok(builder.bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        self.authorized(builder)
            .await?
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Firestore request failed: {}", e)))
    }

    /// Converte uma resposta de erro do Firestore em `StoreError`
    async fn error_from(response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            StoreError::Unavailable(format!("Firestore status {}: {}", status.as_u16(), message))
        } else {
            StoreError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }

    async fn commit(&self, writes: Vec<Value>, transaction: Option<&str>) -> StoreResult<()> {
        let mut body = json!({ "writes": writes });
        if let Some(tx) = transaction {
            body["transaction"] = json!(tx);
        }

        let url = format!("{}:commit", self.documents_url());
        let response = self.send(self.http.post(url).json(&body)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    fn timestamp_transforms(fields: &[String]) -> Value {
        Value::Array(
            fields
                .iter()
                .map(|f| json!({ "fieldPath": f, "setToServerValue": "REQUEST_TIME" }))
                .collect(),
        )
    }

    fn write_for(&self, collection: &str, id: &str, write: &DocumentWrite) -> Value {
        let mut op = json!({
            "update": {
                "name": self.document_name(collection, id),
                "fields": encode_fields(&write.fields),
            }
        });

        if !write.server_timestamps.is_empty() {
            op["updateTransforms"] = Self::timestamp_transforms(&write.server_timestamps);
        }
        op
    }

    // ------------------------------------------------------------------
    // Transação de contador
    // ------------------------------------------------------------------

    async fn begin_transaction(&self, retry_of: Option<&str>) -> StoreResult<String> {
        let read_write = match retry_of {
            Some(previous) => json!({ "retryTransaction": previous }),
            None => json!({}),
        };
        let body = json!({ "options": { "readWrite": read_write } });

        let url = format!("{}:beginTransaction", self.documents_url());
        let response = self.send(self.http.post(url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let parsed: BeginTransactionResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("beginTransaction: {}", e)))?;
        Ok(parsed.transaction)
    }

    /// Lê o contador dentro da transação. `None` = registro ainda não existe
    async fn read_counter(&self, key: &str, transaction: &str) -> StoreResult<Option<u64>> {
        let url = self.document_url(COUNTERS_COLLECTION, key);
        let response = self
            .send(self.http.get(url).query(&[("transaction", transaction)]))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("counter document: {}", e)))?;
        let doc = decode_document(&raw)?;

        Ok(Some(counter_value(&doc)))
    }

    async fn rollback(&self, transaction: &str) {
        let url = format!("{}:rollback", self.documents_url());
        let body = json!({ "transaction": transaction });

        if let Err(e) = self.send(self.http.post(url).json(&body)).await {
            tracing::warn!("⚠️ Rollback da transação falhou (ignorado): {}", e);
        }
    }

    async fn attempt_counter_transaction(
        &self,
        key: &str,
        update: &(dyn Fn(u64) -> u64 + Send + Sync),
        retry_of: Option<&str>,
    ) -> Attempt {
        let transaction = match self.begin_transaction(retry_of).await {
            Ok(tx) => tx,
            Err(e) => return Attempt::Failed(e),
        };

        let existing = match self.read_counter(key, &transaction).await {
            Ok(value) => value,
            Err(StoreError::Rejected { status: 409, .. }) => return Attempt::Conflict(Some(transaction)),
            Err(e) => {
                self.rollback(&transaction).await;
                return Attempt::Failed(e);
            }
        };

        let next = update(existing.unwrap_or(0));

        let mut write = json!({
            "update": {
                "name": self.document_name(COUNTERS_COLLECTION, key),
                "fields": { COUNTER_VALUE_FIELD: { "integerValue": next.to_string() } },
            },
            "updateMask": { "fieldPaths": [COUNTER_VALUE_FIELD] },
        });
        if existing.is_none() {
            write["updateTransforms"] = Self::timestamp_transforms(&["createdAt".to_string()]);
        }

        match self.commit(vec![write], Some(&transaction)).await {
            Ok(()) => Attempt::Committed(next),
            Err(StoreError::Rejected { status: 409, .. }) => Attempt::Conflict(Some(transaction)),
            Err(e) => {
                self.rollback(&transaction).await;
                Attempt::Failed(e)
            }
        }
    }
}

/// Valor não numérico ou negativo conta como 0
fn counter_value(doc: &Document) -> u64 {
    doc.get(COUNTER_VALUE_FIELD)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)))
        .unwrap_or(0)
}

fn counter_error(e: StoreError) -> CounterError {
    CounterError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl CounterStore for FirestoreStore {
    async fn transact(
        &self,
        key: &str,
        update: &(dyn Fn(u64) -> u64 + Send + Sync),
    ) -> contador::Result<u64> {
        let mut attempt = 1;
        let mut previous: Option<String> = None;

        loop {
            match self
                .attempt_counter_transaction(key, update, previous.as_deref())
                .await
            {
                Attempt::Committed(value) => {
                    if attempt > 1 {
                        tracing::info!(
                            "✅ Contador '{}' commitado após {} tentativa(s)",
                            key,
                            attempt
                        );
                    }
                    return Ok(value);
                }
                Attempt::Failed(e) => {
                    tracing::error!("❌ Transação do contador '{}' falhou: {}", key, e);
                    return Err(counter_error(e));
                }
                Attempt::Conflict(tx) => {
                    if !self.retry.has_attempts_left(attempt) {
                        tracing::error!(
                            "❌ Contador '{}': {} tentativas abortadas por conflito",
                            key,
                            attempt
                        );
                        return Err(CounterError::TransactionConflict {
                            key: key.to_string(),
                            attempts: attempt,
                        });
                    }

                    let backoff = self.retry.backoff_for(attempt);
                    tracing::warn!(
                        "⚠️ Conflito no contador '{}' (tentativa {}/{}). Retry em {}ms...",
                        key,
                        attempt,
                        self.retry.max_attempts,
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;

                    previous = tx;
                    attempt += 1;
                }
            }
        }
    }

    async fn current(&self, key: &str) -> contador::Result<u64> {
        let doc = self
            .get(COUNTERS_COLLECTION, key)
            .await
            .map_err(counter_error)?;
        Ok(doc.as_ref().map(counter_value).unwrap_or(0))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let response = self.send(self.http.get(self.document_url(collection, id))).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        decode_document(&raw).map(Some)
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let request = self.http.get(self.collection_url(collection)).query(&query);
            let response = self.send(request).await?;

            if !response.status().is_success() {
                return Err(Self::error_from(response).await);
            }

            let page: ListDocumentsResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            for raw in &page.documents {
                documents.push(decode_document(raw)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("📚 {} documentos lidos de '{}'", documents.len(), collection);
        Ok(documents)
    }

    async fn create(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()> {
        let mut op = self.write_for(collection, id, &write);
        op["currentDocument"] = json!({ "exists": false });

        self.commit(vec![op], None).await.map_err(|e| match e {
            StoreError::Rejected { status: 409, .. } => StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            },
            other => other,
        })
    }

    async fn update(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()> {
        let mut op = self.write_for(collection, id, &write);
        op["updateMask"] = json!({ "fieldPaths": write.fields.keys().collect::<Vec<_>>() });
        op["currentDocument"] = json!({ "exists": true });

        self.commit(vec![op], None).await.map_err(|e| match e {
            StoreError::Rejected { status: 404, .. } => StoreError::not_found(collection, id),
            other => other,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let response = self.send(self.http.delete(self.document_url(collection, id))).await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        let request = self
            .http
            .get(self.collection_url(COUNTERS_COLLECTION))
            .query(&[("pageSize", "1")]);
        let response = self.send(request).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}
