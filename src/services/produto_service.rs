use std::sync::Arc;

use contador::{CodeFormat, CounterKey, SequentialCodeAllocator};
use uuid::Uuid;

use super::ordering::sort_catalog;
use super::Created;
use crate::models::{produto_patch, Body, NewProduto, Produto};
use crate::store::{DocumentStore, DocumentWrite, CREATED_AT, PRODUTOS};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ProdutoService {
    store: Arc<dyn DocumentStore>,
    codes: SequentialCodeAllocator,
    format: CodeFormat,
}

impl ProdutoService {
    pub fn new(store: Arc<dyn DocumentStore>, codes: SequentialCodeAllocator, format: CodeFormat) -> Self {
        Self { store, codes, format }
    }

    /// Todos os produtos (admin), inclusive inativos
    pub async fn list_all(&self) -> AppResult<Vec<Produto>> {
        let docs = self.store.list(PRODUTOS).await?;
        let mut produtos: Vec<Produto> = docs.iter().map(Produto::from_document).collect();
        sort_catalog(&mut produtos);
        Ok(produtos)
    }

    pub async fn get(&self, id: &str) -> AppResult<Produto> {
        self.store
            .get(PRODUTOS, id)
            .await?
            .map(|doc| Produto::from_document(&doc))
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    /// Cria o produto com um código sequencial novo
    ///
    /// O código é alocado antes da escrita do documento: se a alocação falhar
    /// nenhum produto é gravado. Se a escrita falhar depois, o número fica perdido.
    pub async fn create(&self, body: &Body) -> AppResult<Created> {
        let new_produto = NewProduto::from_body(body).map_err(|e| {
            log_validation_error("nome", &e.to_string());
            e
        })?;

        let allocated = self.codes.allocate(CounterKey::Produtos, &self.format).await?;
        log_code_allocated(PRODUTOS, &allocated.code);

        let id = Uuid::new_v4().to_string();
        let write = DocumentWrite::new(new_produto.into_fields(&allocated.code))
            .with_server_timestamp(CREATED_AT);

        self.store.create(PRODUTOS, &id, write).await.map_err(|e| {
            log_error(&format!(
                "❌ Código {} alocado mas o produto não foi gravado: {}",
                allocated.code, e
            ));
            e
        })?;

        log_entity_created(PRODUTOS, &id, Some(&allocated.code));
        Ok(Created::with_codigo(id, allocated.code))
    }

    pub async fn update(&self, id: &str, body: &Body) -> AppResult<()> {
        let update = produto_patch(body)?;
        let fields = update.len();

        self.store.update(PRODUTOS, id, DocumentWrite::new(update)).await?;

        log_entity_updated(PRODUTOS, id, fields);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.get(PRODUTOS, id).await?.is_none() {
            return Err(AppError::NotFound("Not found".to_string()));
        }

        self.store.delete(PRODUTOS, id).await?;
        log_entity_deleted(PRODUTOS, id);
        Ok(())
    }

    /// Vitrine: só produtos ativos e publicados
    pub async fn list_public(&self) -> AppResult<Vec<Produto>> {
        let mut produtos = self.list_all().await?;
        produtos.retain(Produto::is_public);
        Ok(produtos)
    }

    pub async fn get_public(&self, id: &str) -> AppResult<Produto> {
        match self.get(id).await? {
            produto if produto.is_public() => Ok(produto),
            _ => Err(AppError::NotFound("Not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_codes_continue_from_existing_counter() {
        let store = Arc::new(MemoryStore::new());
        store.seed_counter("produtos", 11).await;

        let service = ProdutoService::new(
            store.clone(),
            SequentialCodeAllocator::new(store.clone()),
            CodeFormat::for_key(CounterKey::Produtos),
        );

        let created = service
            .create(&body(json!({ "nome": "Cadeira Tiffany", "quantidade": 40 })))
            .await
            .unwrap();
        assert_eq!(created.codigo.as_deref(), Some("PROD-0012"));

        let produto = service.get(&created.id).await.unwrap();
        assert_eq!(produto.quantidade, 40);
        assert!(!produto.is_public());
    }

    #[tokio::test]
    async fn test_kit_and_produto_counters_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let codes = SequentialCodeAllocator::new(store.clone());

        let kits = crate::services::KitService::new(
            store.clone(),
            codes.clone(),
            CodeFormat::for_key(CounterKey::Kits),
        );
        let produtos = ProdutoService::new(store.clone(), codes, CodeFormat::for_key(CounterKey::Produtos));

        kits.create(&body(json!({ "nome": "Kit" }))).await.unwrap();
        kits.create(&body(json!({ "nome": "Kit 2" }))).await.unwrap();
        let produto = produtos.create(&body(json!({ "nome": "Mesa" }))).await.unwrap();

        assert_eq!(produto.codigo.as_deref(), Some("PROD-0001"));
    }

    #[tokio::test]
    async fn test_patch_updates_quantidade() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_raw(PRODUTOS, "p1", json!({ "nome": "Mesa", "codigo": "PROD-0001" }))
            .await;
        let service = ProdutoService::new(
            store.clone(),
            SequentialCodeAllocator::new(store.clone()),
            CodeFormat::for_key(CounterKey::Produtos),
        );

        service.update("p1", &body(json!({ "quantidade": 3 }))).await.unwrap();

        assert_eq!(service.get("p1").await.unwrap().quantidade, 3);
    }
}
