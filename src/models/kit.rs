use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::coerce::{now_millis, timestamp_millis, to_bool, to_int, to_num, to_str};
use super::{catalog_patch, required_nome, Body};
use crate::store::Document;
use crate::utils::AppResult;

pub const KIT_EDITABLE_FIELDS: &[&str] = &[
    "nome",
    "descricao",
    "preco",
    "ativo",
    "publicado",
    "ordem",
    "fotoUrl",
    "fotoPublicId",
];

/// Produto que compõe um kit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitItem {
    pub produto_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produto_nome: Option<String>,
    pub quantidade: i64,
}

impl KitItem {
    /// Entradas sem `produtoId` são descartadas
    fn from_value(value: &Value) -> Option<Self> {
        let produto_id = value.get("produtoId")?.as_str()?.trim();
        if produto_id.is_empty() {
            return None;
        }

        Some(Self {
            produto_id: produto_id.to_string(),
            produto_nome: value
                .get("produtoNome")
                .and_then(Value::as_str)
                .map(str::to_string),
            quantidade: to_int(value.get("quantidade")).unwrap_or(1),
        })
    }

    pub fn list_from(value: Option<&Value>) -> Vec<Self> {
        value
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub id: String,
    pub nome: String,
    pub descricao: String,
    pub preco: f64,
    pub itens: Vec<KitItem>,
    pub foto_url: String,
    pub foto_public_id: String,
    pub codigo: String,
    pub ordem: Option<i64>,
    pub ativo: bool,
    pub publicado: bool,
    pub created_at: Option<i64>,
}

impl Kit {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            nome: to_str(doc.get("nome"), ""),
            descricao: to_str(doc.get("descricao"), ""),
            preco: to_num(doc.get("preco"), 0.0),
            itens: KitItem::list_from(doc.get("itens")),
            foto_url: to_str(doc.get("fotoUrl"), ""),
            foto_public_id: to_str(doc.get("fotoPublicId"), ""),
            codigo: to_str(doc.get("codigo"), ""),
            ordem: to_int(doc.get("ordem")),
            // default true: documentos antigos não têm o campo
            ativo: to_bool(doc.get("ativo"), true),
            publicado: to_bool(doc.get("publicado"), false),
            created_at: timestamp_millis(doc.get("createdAt")),
        }
    }

    /// Visível no catálogo público
    pub fn is_public(&self) -> bool {
        self.ativo && self.publicado
    }
}

/// Corpo validado de criação de kit
#[derive(Debug, Clone, PartialEq)]
pub struct NewKit {
    pub nome: String,
    pub descricao: String,
    pub preco: f64,
    pub itens: Vec<KitItem>,
    pub foto_url: String,
    pub foto_public_id: String,
    pub ordem: i64,
    pub ativo: bool,
    pub publicado: bool,
}

impl NewKit {
    pub fn from_body(body: &Body) -> AppResult<Self> {
        Ok(Self {
            nome: required_nome(body)?,
            descricao: to_str(body.get("descricao"), "").trim().to_string(),
            preco: to_num(body.get("preco"), 0.0),
            itens: KitItem::list_from(body.get("itens")),
            foto_url: to_str(body.get("fotoUrl"), ""),
            foto_public_id: to_str(body.get("fotoPublicId"), ""),
            ordem: to_int(body.get("ordem")).unwrap_or_else(now_millis),
            ativo: to_bool(body.get("ativo"), true),
            publicado: to_bool(body.get("publicado"), false),
        })
    }

    /// Campos persistidos, com o código já alocado
    pub fn into_fields(self, codigo: &str) -> Body {
        let value = json!({
            "nome": self.nome,
            "descricao": self.descricao,
            "preco": self.preco,
            "itens": self.itens,
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

pub fn kit_patch(body: &Body) -> AppResult<Body> {
    catalog_patch(body, KIT_EDITABLE_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AppError;
    use serde_json::Map;

    fn body(value: Value) -> Body {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_document_applies_defaults() {
        let doc = Document::new("k1", body(json!({ "nome": "Kit Safari", "preco": "150" })));
        let kit = Kit::from_document(&doc);

        assert_eq!(kit.nome, "Kit Safari");
        assert_eq!(kit.preco, 150.0);
        assert!(kit.ativo);
        assert!(!kit.publicado);
        assert_eq!(kit.ordem, None);
        assert_eq!(kit.codigo, "");
        assert!(kit.itens.is_empty());
        assert!(!kit.is_public());
    }

    #[test]
    fn test_itens_without_produto_id_are_dropped() {
        let itens = json!([
            { "produtoId": "p1", "produtoNome": "Mesa", "quantidade": 2 },
            { "produtoNome": "sem id" },
            { "produtoId": "p2" }
        ]);

        let parsed = KitItem::list_from(Some(&itens));

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].quantidade, 2);
        assert_eq!(parsed[1].quantidade, 1);
        assert_eq!(parsed[1].produto_nome, None);
    }

    #[test]
    fn test_new_kit_requires_nome() {
        let err = NewKit::from_body(&body(json!({ "nome": "   " }))).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Nome obrigatório"));
    }

    #[test]
    fn test_new_kit_fields_carry_codigo() {
        let kit = NewKit::from_body(&body(json!({
            "nome": "  Kit Festa  ",
            "ordem": 5,
            "publicado": true
        })))
        .unwrap();

        let fields = kit.into_fields("KIT-0003");

        assert_eq!(fields["nome"], json!("Kit Festa"));
        assert_eq!(fields["codigo"], json!("KIT-0003"));
        assert_eq!(fields["ordem"], json!(5));
        assert_eq!(fields["ativo"], json!(true));
        assert_eq!(fields["publicado"], json!(true));
    }

    #[test]
    fn test_new_kit_ordem_defaults_to_now() {
        let before = now_millis();
        let kit = NewKit::from_body(&body(json!({ "nome": "Kit" }))).unwrap();
        assert!(kit.ordem >= before);
    }

    #[test]
    fn test_patch_ignores_codigo_and_unknown_fields() {
        let err = kit_patch(&body(json!({ "codigo": "KIT-9999", "foo": 1 }))).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "No valid fields to update"));
    }

    #[test]
    fn test_patch_coerces_values() {
        let update = kit_patch(&body(json!({
            "nome": " Novo ",
            "preco": "89.5",
            "ativo": 0,
            "publicado": "sim",
            "codigo": "KIT-0001"
        })))
        .unwrap();

        let mut expected = Map::new();
        expected.insert("nome".into(), json!("Novo"));
        expected.insert("preco".into(), json!(89.5));
        expected.insert("ativo".into(), json!(false));
        expected.insert("publicado".into(), json!(true));
        assert_eq!(update, expected);
    }

    #[test]
    fn test_patch_rejects_empty_nome() {
        assert!(kit_patch(&body(json!({ "nome": "" }))).is_err());
    }
}
