use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::coerce::{now_millis, timestamp_millis, to_bool, to_int, to_str, to_text};
use super::{Body, NO_VALID_FIELDS};
use crate::store::Document;
use crate::utils::{AppError, AppResult};

pub const DADOS_OBRIGATORIOS: &str = "Dados obrigatórios ausentes";
pub const TITULO_CURTO: &str = "Título muito curto";

const MIN_TITULO_LEN: usize = 3;

/// Foto da galeria de eventos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GaleriaItem {
    pub id: String,
    pub titulo: String,
    pub descricao: String,
    pub foto_url: String,
    pub foto_public_id: String,
    pub ativo: bool,
    pub ordem: i64,
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl GaleriaItem {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            titulo: to_str(doc.get("titulo"), ""),
            descricao: to_str(doc.get("descricao"), ""),
            foto_url: to_str(doc.get("fotoUrl"), ""),
            foto_public_id: to_str(doc.get("fotoPublicId"), ""),
            ativo: to_bool(doc.get("ativo"), true),
            ordem: to_int(doc.get("ordem")).unwrap_or(0),
            created_at: timestamp_millis(doc.get("createdAt")),
            updated_at: timestamp_millis(doc.get("updatedAt")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGaleriaItem {
    pub titulo: String,
    pub descricao: String,
    pub foto_url: String,
    pub foto_public_id: String,
    pub ativo: bool,
    pub ordem: i64,
}

impl NewGaleriaItem {
    pub fn from_body(body: &Body) -> AppResult<Self> {
        let required = |field: &str| {
            let value = to_str(body.get(field), "").trim().to_string();
            if value.is_empty() {
                Err(AppError::ValidationError(DADOS_OBRIGATORIOS.to_string()))
            } else {
                Ok(value)
            }
        };

        Ok(Self {
            titulo: required("titulo")?,
            foto_url: required("fotoUrl")?,
            foto_public_id: required("fotoPublicId")?,
            descricao: to_str(body.get("descricao"), "").trim().to_string(),
            ativo: to_bool(body.get("ativo"), true),
            ordem: now_millis(),
        })
    }

    pub fn into_fields(self) -> Body {
        let value = json!({
            "titulo": self.titulo,
            "descricao": self.descricao,
            "fotoUrl": self.foto_url,
            "fotoPublicId": self.foto_public_id,
            "ativo": self.ativo,
            "ordem": self.ordem,
        });

        match value {
            Value::Object(map) => map,
            _ => Body::new(),
        }
    }
}

/// Patch parcial: permite alternar `ativo` sem reenviar o título
pub fn galeria_patch(body: &Body) -> AppResult<Body> {
    let mut update = Map::new();

    if let Some(value) = body.get("titulo") {
        let titulo = to_text(value).trim().to_string();
        if titulo.chars().count() < MIN_TITULO_LEN {
            return Err(AppError::ValidationError(TITULO_CURTO.to_string()));
        }
        update.insert("titulo".to_string(), json!(titulo));
    }
    if let Some(value) = body.get("descricao") {
        update.insert("descricao".to_string(), json!(to_text(value).trim()));
    }
    if body.contains_key("ativo") {
        update.insert("ativo".to_string(), json!(to_bool(body.get("ativo"), true)));
    }
    for field in ["fotoUrl", "fotoPublicId"] {
        if let Some(value) = body.get(field) {
            update.insert(field.to_string(), json!(to_str(Some(value), "")));
        }
    }

    if update.is_empty() {
        return Err(AppError::ValidationError(NO_VALID_FIELDS.to_string()));
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_new_item_requires_photo_and_title() {
        let err = NewGaleriaItem::from_body(&body(json!({ "titulo": "Festa", "fotoUrl": "u" })))
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == DADOS_OBRIGATORIOS));
    }

    #[test]
    fn test_new_item_defaults() {
        let item = NewGaleriaItem::from_body(&body(json!({
            "titulo": " Aniversário ",
            "fotoUrl": "https://res.cloudinary.com/x.jpg",
            "fotoPublicId": "galeria/x"
        })))
        .unwrap();

        assert_eq!(item.titulo, "Aniversário");
        assert!(item.ativo);
        assert!(item.ordem > 0);
    }

    #[test]
    fn test_patch_short_title() {
        let err = galeria_patch(&body(json!({ "titulo": "ab" }))).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == TITULO_CURTO));
    }

    #[test]
    fn test_patch_toggle_ativo_only() {
        let update = galeria_patch(&body(json!({ "ativo": false }))).unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(update["ativo"], json!(false));
    }

    #[test]
    fn test_patch_without_known_fields() {
        assert!(galeria_patch(&body(json!({ "ordem": 1 }))).is_err());
    }

    #[test]
    fn test_from_document_ordem_defaults_to_zero() {
        let item = GaleriaItem::from_document(&Document::new("g1", Map::new()));
        assert_eq!(item.ordem, 0);
        assert!(item.ativo);
    }
}
