//! Store de documentos
//!
//! Capacidade mínima que o back-office precisa de um banco de documentos:
//! leitura/escrita pontual por chave, listagem de coleção e, para os
//! contadores, o primitivo transacional de [`contador::CounterStore`].
//!
//! Implementações:
//! - [`FirestoreStore`]: Firestore via REST v1 (produção / emulador)
//! - [`MemoryStore`]: em memória (desenvolvimento e testes)

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Coleções do catálogo
pub const KITS: &str = "kits";
pub const PRODUTOS: &str = "produtos";
pub const GALERIA: &str = "galeria";

/// Campos gerenciados pelo servidor
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// Documento cru: id + campos em JSON (timestamps como string RFC 3339)
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Escrita de documento: campos + campos a preencher com o horário do servidor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentWrite {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

impl DocumentWrite {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    pub fn with_server_timestamp(mut self, field: &str) -> Self {
        self.server_timestamps.push(field.to_string());
        self
    }
}

/// Erros do store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// Rede, DNS, timeout, token indisponível
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// O store respondeu com erro
    #[error("Store rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `None` se o documento não existe
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Todos os documentos da coleção, em ordem de id
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Cria o documento; falha com `AlreadyExists` se o id já existe
    async fn create(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()>;

    /// Atualização parcial (merge dos campos); `NotFound` se não existe
    async fn update(&self, collection: &str, id: &str, write: DocumentWrite) -> StoreResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Verifica conectividade (usado pelo /ready)
    async fn ping(&self) -> StoreResult<()>;
}
