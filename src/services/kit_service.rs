use std::sync::Arc;

use contador::{CodeFormat, CounterKey, SequentialCodeAllocator};
use uuid::Uuid;

use super::ordering::sort_catalog;
use super::Created;
use crate::models::{kit_patch, Body, Kit, NewKit};
use crate::store::{DocumentStore, DocumentWrite, CREATED_AT, KITS};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct KitService {
    store: Arc<dyn DocumentStore>,
    codes: SequentialCodeAllocator,
    format: CodeFormat,
}

impl KitService {
    pub fn new(store: Arc<dyn DocumentStore>, codes: SequentialCodeAllocator, format: CodeFormat) -> Self {
        Self { store, codes, format }
    }

    /// Todos os kits (admin), inclusive inativos
    pub async fn list_all(&self) -> AppResult<Vec<Kit>> {
        let docs = self.store.list(KITS).await?;
        let mut kits: Vec<Kit> = docs.iter().map(Kit::from_document).collect();
        sort_catalog(&mut kits);
        Ok(kits)
    }

    pub async fn get(&self, id: &str) -> AppResult<Kit> {
        self.store
            .get(KITS, id)
            .await?
            .map(|doc| Kit::from_document(&doc))
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    /// Cria o kit com um código sequencial novo
    ///
    /// O código é alocado antes da escrita do documento: se a alocação falhar
    /// nenhum kit é gravado. Se a escrita falhar depois, o número fica perdido.
    pub async fn create(&self, body: &Body) -> AppResult<Created> {
        let new_kit = NewKit::from_body(body).map_err(|e| {
            log_validation_error("nome", &e.to_string());
            e
        })?;

        let allocated = self.codes.allocate(CounterKey::Kits, &self.format).await?;
        log_code_allocated(KITS, &allocated.code);

        let id = Uuid::new_v4().to_string();
        let write = DocumentWrite::new(new_kit.into_fields(&allocated.code))
            .with_server_timestamp(CREATED_AT);

        self.store.create(KITS, &id, write).await.map_err(|e| {
            log_error(&format!(
                "❌ Código {} alocado mas o kit não foi gravado: {}",
                allocated.code, e
            ));
            e
        })?;

        log_entity_created(KITS, &id, Some(&allocated.code));
        Ok(Created::with_codigo(id, allocated.code))
    }

    pub async fn update(&self, id: &str, body: &Body) -> AppResult<()> {
        let update = kit_patch(body)?;
        let fields = update.len();

        self.store.update(KITS, id, DocumentWrite::new(update)).await?;

        log_entity_updated(KITS, id, fields);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.get(KITS, id).await?.is_none() {
            return Err(AppError::NotFound("Not found".to_string()));
        }

        self.store.delete(KITS, id).await?;
        log_entity_deleted(KITS, id);
        Ok(())
    }

    /// Vitrine: só kits ativos e publicados
    pub async fn list_public(&self) -> AppResult<Vec<Kit>> {
        let mut kits = self.list_all().await?;
        kits.retain(Kit::is_public);
        Ok(kits)
    }

    pub async fn get_public(&self, id: &str) -> AppResult<Kit> {
        match self.get(id).await? {
            kit if kit.is_public() => Ok(kit),
            _ => Err(AppError::NotFound("Not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn service() -> (Arc<MemoryStore>, KitService) {
        let store = Arc::new(MemoryStore::new());
        let codes = SequentialCodeAllocator::new(store.clone());
        let service = KitService::new(store.clone(), codes, CodeFormat::for_key(CounterKey::Kits));
        (store, service)
    }

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_codes() {
        let (_, service) = service();

        let first = service.create(&body(json!({ "nome": "Kit Safari" }))).await.unwrap();
        let second = service.create(&body(json!({ "nome": "Kit Circo" }))).await.unwrap();

        assert_eq!(first.codigo.as_deref(), Some("KIT-0001"));
        assert_eq!(second.codigo.as_deref(), Some("KIT-0002"));
        assert_ne!(first.id, second.id);

        let kit = service.get(&first.id).await.unwrap();
        assert_eq!(kit.codigo, "KIT-0001");
        assert!(kit.created_at.is_some());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_allocation_is_logged_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (_, service) = service();
        service.create(&body(json!({ "nome": "Kit Safari" }))).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Código alocado").count(), 1);
        assert!(output.contains("KIT-0001"));
    }

    #[tokio::test]
    async fn test_invalid_body_does_not_consume_a_code() {
        let (store, service) = service();

        assert!(service.create(&body(json!({ "nome": "" }))).await.is_err());
        assert!(store.list(KITS).await.unwrap().is_empty());

        let created = service.create(&body(json!({ "nome": "Kit" }))).await.unwrap();
        assert_eq!(created.codigo.as_deref(), Some("KIT-0001"));
    }

    #[tokio::test]
    async fn test_public_listing_hides_unpublished() {
        let (store, service) = service();
        store
            .insert_raw(KITS, "a", json!({ "nome": "Publicado", "publicado": true, "ordem": 2 }))
            .await;
        store
            .insert_raw(KITS, "b", json!({ "nome": "Rascunho", "ordem": 1 }))
            .await;
        store
            .insert_raw(KITS, "c", json!({ "nome": "Inativo", "publicado": true, "ativo": false }))
            .await;

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "b");

        let public = service.list_public().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, "a");

        assert!(matches!(service.get_public("b").await, Err(AppError::NotFound(_))));
        assert!(service.get_public("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_codigo() {
        let (_, service) = service();
        let created = service.create(&body(json!({ "nome": "Kit" }))).await.unwrap();

        service
            .update(&created.id, &body(json!({ "codigo": "KIT-9999", "preco": 120 })))
            .await
            .unwrap();

        let kit = service.get(&created.id).await.unwrap();
        assert_eq!(kit.codigo, "KIT-0001");
        assert_eq!(kit.preco, 120.0);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_kit() {
        let (_, service) = service();

        let update = service.update("nope", &body(json!({ "ativo": false }))).await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        assert!(matches!(service.delete("nope").await, Err(AppError::NotFound(_))));
    }
}
