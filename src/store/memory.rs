use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use contador::{CounterStore, MemoryCounterStore, TransactionRetry};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, DocumentWrite, StoreError, StoreResult};

type Collection = BTreeMap<String, Map<String, Value>>;

/// Store em memória
///
/// Documentos ficam num mapa por coleção; contadores delegam para
/// [`MemoryCounterStore`], que tem a mesma semântica otimista do Firestore.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    counters: MemoryCounterStore,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(retry: TransactionRetry) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            counters: MemoryCounterStore::with_retry(retry),
        }
    }

    /// Insere um documento cru, sem validação (dados legados, testes)
    pub async fn insert_raw(&self, collection: &str, id: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub async fn seed_counter(&self, key: &str, value: u64) {
        self.counters.seed(key, value).await;
    }

    fn apply(target: &mut Map<String, Value>, write: DocumentWrite) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        for (field, value) in write.fields {
            target.insert(field, value);
        }
        for field in write.server_timestamps {
            target.insert(field, Value::String(now.clone()));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        let mut fields = Map::new();
        Self::apply(&mut fields, write);
        docs.insert(id.to_string(), fields);

        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()> {
        let mut collections = self.collections.write().await;

        let fields = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        Self::apply(fields, write);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;

        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn transact(
        &self,
        key: &str,
        update: &(dyn Fn(u64) -> u64 + Send + Sync),
    ) -> contador::Result<u64> {
        self.counters.transact(key, update).await
    }

    async fn current(&self, key: &str) -> contador::Result<u64> {
        self.counters.current(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let write = DocumentWrite::new(fields(json!({"nome": "Kit Safari"})))
            .with_server_timestamp("createdAt");

        store.create("kits", "k1", write).await.unwrap();

        let doc = store.get("kits", "k1").await.unwrap().unwrap();
        assert_eq!(doc.id, "k1");
        assert_eq!(doc.get("nome"), Some(&json!("Kit Safari")));
        assert!(doc.get("createdAt").and_then(|v| v.as_str()).is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_existing_id() {
        let store = MemoryStore::new();
        store.insert_raw("kits", "k1", json!({"nome": "A"})).await;

        let err = store
            .create("kits", "k1", DocumentWrite::new(fields(json!({"nome": "B"}))))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert_raw("produtos", "p1", json!({"nome": "Mesa", "preco": 10}))
            .await;

        store
            .update("produtos", "p1", DocumentWrite::new(fields(json!({"preco": 15}))))
            .await
            .unwrap();

        let doc = store.get("produtos", "p1").await.unwrap().unwrap();
        assert_eq!(doc.get("nome"), Some(&json!("Mesa")));
        assert_eq!(doc.get("preco"), Some(&json!(15)));
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryStore::new();

        let err = store
            .update("galeria", "nope", DocumentWrite::new(fields(json!({"ativo": false}))))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let store = MemoryStore::new();
        store.insert_raw("galeria", "b", json!({})).await;
        store.insert_raw("galeria", "a", json!({})).await;

        store.delete("galeria", "b").await.unwrap();

        let ids: Vec<String> = store
            .list("galeria")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["a"]);
        assert!(store.list("vazia").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counters_do_not_touch_collections() {
        let store = MemoryStore::new();

        let next = store.transact("kits", &|v: u64| v + 1).await.unwrap();

        assert_eq!(next, 1);
        assert!(store.list("kits").await.unwrap().is_empty());
    }
}
