pub mod galeria_service;
pub mod kit_service;
pub mod ordering;
pub mod produto_service;
pub mod whatsapp;

pub use galeria_service::GaleriaService;
pub use kit_service::KitService;
pub use produto_service::ProdutoService;

use serde::Serialize;

/// Resposta de criação (`{"ok": true, "id": ..., "codigo": ...}`)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Created {
    pub ok: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
}

impl Created {
    pub fn new(id: String) -> Self {
        Self { ok: true, id, codigo: None }
    }

    pub fn with_codigo(id: String, codigo: String) -> Self {
        Self {
            ok: true,
            id,
            codigo: Some(codigo),
        }
    }
}
