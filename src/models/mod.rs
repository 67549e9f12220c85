//! Entidades do catálogo
//!
//! Cada entidade tem três formas:
//! - a leitura tipada (`Kit`, `Produto`, `GaleriaItem`), decodificada uma vez
//!   a partir do [`Document`](crate::store::Document) com os defaults de
//!   [`coerce`];
//! - o corpo de criação (`NewKit`, ...), validado;
//! - o patch parcial, restrito a uma lista de campos editáveis.

pub mod coerce;
pub mod galeria;
pub mod kit;
pub mod produto;

pub use galeria::{galeria_patch, GaleriaItem, NewGaleriaItem};
pub use kit::{kit_patch, Kit, KitItem, NewKit, KIT_EDITABLE_FIELDS};
pub use produto::{produto_patch, NewProduto, Produto, PRODUTO_EDITABLE_FIELDS};

use serde_json::{json, Map, Value};

use crate::utils::{AppError, AppResult};
use coerce::{to_int, to_num, to_str, to_text, truthy};

pub const NOME_OBRIGATORIO: &str = "Nome obrigatório";
pub const NO_VALID_FIELDS: &str = "No valid fields to update";

/// Corpo JSON cru de uma requisição
pub type Body = Map<String, Value>;

/// `nome` obrigatório, sem espaços nas pontas
pub(crate) fn required_nome(body: &Body) -> AppResult<String> {
    let nome = to_str(body.get("nome"), "").trim().to_string();
    if nome.is_empty() {
        return Err(AppError::ValidationError(NOME_OBRIGATORIO.to_string()));
    }
    Ok(nome)
}

/// Patch parcial de kit/produto
///
/// Só os campos de `allowed` presentes no corpo entram; cada um é coagido
/// para o tipo do campo. `codigo` nunca é editável.
pub(crate) fn catalog_patch(body: &Body, allowed: &[&str]) -> AppResult<Body> {
    let mut update = Map::new();

    for &field in allowed {
        let Some(value) = body.get(field) else {
            continue;
        };

        let coerced = match field {
            "nome" => {
                let nome = to_text(value).trim().to_string();
                if nome.is_empty() {
                    return Err(AppError::ValidationError(NOME_OBRIGATORIO.to_string()));
                }
                json!(nome)
            }
            "descricao" => json!(to_text(value).trim()),
            "preco" => json!(to_num(Some(value), 0.0)),
            "quantidade" | "ordem" => json!(to_int(Some(value)).unwrap_or(0)),
            "ativo" | "publicado" => json!(truthy(value)),
            "fotoUrl" | "fotoPublicId" => json!(to_text(value)),
            _ => continue,
        };

        update.insert(field.to_string(), coerced);
    }

    if update.is_empty() {
        return Err(AppError::ValidationError(NO_VALID_FIELDS.to_string()));
    }
    Ok(update)
}
