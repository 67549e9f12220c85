//! Conversão entre JSON e o formato tipado do Firestore REST
//!
//! ```text
//! "Kit"        <-> {"stringValue": "Kit"}
//! 42           <-> {"integerValue": "42"}
//! 9.9          <-> {"doubleValue": 9.9}
//! [..]         <-> {"arrayValue": {"values": [..]}}
//! {..}         <-> {"mapValue": {"fields": {..}}}
//! timestamp     -> string RFC 3339
//! ```

use serde_json::{json, Map, Number, Value};

use crate::store::{Document, StoreError, StoreResult};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(encoded)
}

pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        // Firestore serializa int64 como string
        return match i {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(d) = obj.get("doubleValue") {
        return match d {
            Value::Number(_) => d.clone(),
            // "NaN", "Infinity" chegam como string e não cabem em JSON
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        };
    }
    if let Some(ts) = obj.get("timestampValue") {
        return ts.clone();
    }
    if let Some(r) = obj.get("referenceValue") {
        return r.clone();
    }
    if let Some(b) = obj.get("bytesValue") {
        return b.clone();
    }
    if let Some(g) = obj.get("geoPointValue") {
        return g.clone();
    }
    if let Some(arr) = obj.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = obj.get("mapValue") {
        return Value::Object(decode_fields(map.get("fields")));
    }

    Value::Null
}

pub fn decode_fields(fields: Option<&Value>) -> Map<String, Value> {
    fields
        .and_then(|f| f.as_object())
        .map(|f| f.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
        .unwrap_or_default()
}

/// Documento REST (`{"name": ".../documents/kits/abc", "fields": {...}}`)
pub fn decode_document(raw: &Value) -> StoreResult<Document> {
    let name = raw
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| StoreError::Decode("document without name".to_string()))?;

    let id = name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Decode(format!("invalid document name: {}", name)))?;

    Ok(Document::new(id, decode_fields(raw.get("fields"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!("Kit")), json!({"stringValue": "Kit"}));
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(9.5)), json!({"doubleValue": 9.5}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&Value::Null), json!({"nullValue": null}));
    }

    #[test]
    fn test_encode_nested_kit_items() {
        let itens = json!([{ "produtoId": "p1", "quantidade": 2 }]);

        assert_eq!(
            encode_value(&itens),
            json!({
                "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "produtoId": { "stringValue": "p1" },
                        "quantidade": { "integerValue": "2" }
                    }}}
                ]}
            })
        );
    }

    #[test]
    fn test_decode_document_from_rest() {
        let raw = json!({
            "name": "projects/demo/databases/(default)/documents/kits/abc123",
            "fields": {
                "nome": { "stringValue": "Kit Safari" },
                "ordem": { "integerValue": "3" },
                "preco": { "doubleValue": 199.9 },
                "ativo": { "booleanValue": true },
                "createdAt": { "timestampValue": "2025-01-10T12:00:00.000Z" },
                "itens": { "arrayValue": {} }
            },
            "createTime": "2025-01-10T12:00:00.000Z"
        });

        let doc = decode_document(&raw).unwrap();

        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.get("nome"), Some(&json!("Kit Safari")));
        assert_eq!(doc.get("ordem"), Some(&json!(3)));
        assert_eq!(doc.get("preco"), Some(&json!(199.9)));
        assert_eq!(doc.get("createdAt"), Some(&json!("2025-01-10T12:00:00.000Z")));
        assert_eq!(doc.get("itens"), Some(&json!([])));
    }

    #[test]
    fn test_decode_document_without_fields() {
        let raw = json!({ "name": "projects/demo/databases/(default)/documents/galeria/g1" });
        let doc = decode_document(&raw).unwrap();
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn test_decode_document_without_name_fails() {
        assert!(decode_document(&json!({ "fields": {} })).is_err());
    }
}
