use std::sync::Arc;

use uuid::Uuid;

use super::ordering::sort_catalog;
use super::Created;
use crate::models::{galeria_patch, Body, GaleriaItem, NewGaleriaItem};
use crate::store::{DocumentStore, DocumentWrite, CREATED_AT, GALERIA, UPDATED_AT};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Galeria de fotos de eventos (sem código sequencial)
#[derive(Clone)]
pub struct GaleriaService {
    store: Arc<dyn DocumentStore>,
}

impl GaleriaService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> AppResult<Vec<GaleriaItem>> {
        let docs = self.store.list(GALERIA).await?;
        let mut items: Vec<GaleriaItem> = docs.iter().map(GaleriaItem::from_document).collect();
        sort_catalog(&mut items);
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> AppResult<GaleriaItem> {
        self.store
            .get(GALERIA, id)
            .await?
            .map(|doc| GaleriaItem::from_document(&doc))
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    pub async fn create(&self, body: &Body) -> AppResult<Created> {
        let item = NewGaleriaItem::from_body(body)?;

        let id = Uuid::new_v4().to_string();
        let write = DocumentWrite::new(item.into_fields()).with_server_timestamp(CREATED_AT);
        self.store.create(GALERIA, &id, write).await?;

        log_entity_created(GALERIA, &id, None);
        Ok(Created::new(id))
    }

    /// Atualização parcial; carimba `updatedAt`
    pub async fn update(&self, id: &str, body: &Body) -> AppResult<()> {
        let update = galeria_patch(body)?;
        let fields = update.len();

        let write = DocumentWrite::new(update).with_server_timestamp(UPDATED_AT);
        self.store.update(GALERIA, id, write).await?;

        log_entity_updated(GALERIA, id, fields);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.get(GALERIA, id).await?.is_none() {
            return Err(AppError::NotFound("Not found".to_string()));
        }

        self.store.delete(GALERIA, id).await?;
        log_entity_deleted(GALERIA, id);
        Ok(())
    }

    /// Vitrine: só fotos ativas
    pub async fn list_public(&self) -> AppResult<Vec<GaleriaItem>> {
        let mut items = self.list_all().await?;
        items.retain(|item| item.ativo);
        Ok(items)
    }
}
