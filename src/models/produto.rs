use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::coerce::{now_millis, timestamp_millis, to_bool, to_int, to_num, to_str};
use super::{catalog_patch, required_nome, Body};
use crate::store::Document;
use crate::utils::AppResult;

pub const PRODUTO_EDITABLE_FIELDS: &[&str] = &[
    "nome",
    "descricao",
    "preco",
    "quantidade",
    "ativo",
    "publicado",
    "ordem",
    "fotoUrl",
    "fotoPublicId",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Produto {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub preco: f64,
    /// Estoque disponível para locação
    pub quantidade: i64,
    pub foto_url: String,
    pub foto_public_id: String,
    pub codigo: String,
    pub ordem: Option<i64>,
    pub ativo: bool,
    pub publicado: bool,
    pub created_at: Option<i64>,
}

impl Produto {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            nome: to_str(doc.get("nome"), ""),
            descricao: to_str(doc.get("descricao"), ""),
            preco: to_num(doc.get("preco"), 0.0),
            quantidade: to_int(doc.get("quantidade")).unwrap_or(0),
            foto_url: to_str(doc.get("fotoUrl"), ""),
            foto_public_id: to_str(doc.get("fotoPublicId"), ""),
            codigo: to_str(doc.get("codigo"), ""),
            ordem: to_int(doc.get("ordem")),
            ativo: to_bool(doc.get("ativo"), true),
            publicado: to_bool(doc.get("publicado"), false),
            created_at: timestamp_millis(doc.get("createdAt")),
        }
    }

    pub fn is_public(&self) -> bool {
        self.ativo && self.publicado
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduto {
    pub nome: String,
    pub descricao: String,
    pub preco: f64,
    pub quantidade: i64,
    pub foto_url: String,
    pub foto_public_id: String,
    pub ordem: i64,
    pub ativo: bool,
    pub publicado: bool,
}

impl NewProduto {
    pub fn from_body(body: &Body) -> AppResult<Self> {
        Ok(Self {
            nome: required_nome(body)?,
            descricao: to_str(body.get("descricao"), "").trim().to_string(),
            preco: to_num(body.get("preco"), 0.0),
            quantidade: to_int(body.get("quantidade")).unwrap_or(0),
            foto_url: to_str(body.get("fotoUrl"), ""),
            foto_public_id: to_str(body.get("fotoPublicId"), ""),
            ordem: to_int(body.get("ordem")).unwrap_or_else(now_millis),
            ativo: to_bool(body.get("ativo"), true),
            publicado: to_bool(body.get("publicado"), false),
        })
    }

    pub fn into_fields(self, codigo: &str) -> Body {
        let value = json!({
            "nome": self.nome,
            "descricao": self.descricao,
            "preco": self.preco,
            "quantidade": self.quantidade,
            "fotoUrl": self.foto_url,
            "fotoPublicId": self.foto_public_id,
            "codigo": codigo,
            "ordem": self.ordem,
            "ativo": self.ativo,
            "publicado": self.publicado,
        });

        match value {
            Value::Object(map) => map,
            _ => Body::new(),
        }
    }
}

pub fn produto_patch(body: &Body) -> AppResult<Body> {
    catalog_patch(body, PRODUTO_EDITABLE_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_document() {
        let doc = Document::new(
            "p1",
            body(json!({
                "nome": "Mesa provençal",
                "quantidade": 4,
                "codigo": "PROD-0002",
                "ordem": 2,
                "ativo": true,
                "publicado": true,
                "createdAt": "2025-01-10T12:00:00.000Z"
            })),
        );

        let produto = Produto::from_document(&doc);

        assert_eq!(produto.quantidade, 4);
        assert_eq!(produto.codigo, "PROD-0002");
        assert_eq!(produto.ordem, Some(2));
        assert_eq!(produto.created_at, Some(1_736_510_400_000));
        assert!(produto.is_public());
    }

    #[test]
    fn test_patch_allows_quantidade() {
        let update = produto_patch(&body(json!({ "quantidade": "7" }))).unwrap();
        assert_eq!(update["quantidade"], json!(7));
    }

    #[test]
    fn test_new_produto_defaults() {
        let produto = NewProduto::from_body(&body(json!({ "nome": "Cadeira" }))).unwrap();
        let fields = produto.into_fields("PROD-0001");

        assert_eq!(fields["quantidade"], json!(0));
        assert_eq!(fields["ativo"], json!(true));
        assert_eq!(fields["publicado"], json!(false));
        assert_eq!(fields["codigo"], json!("PROD-0001"));
    }
}
