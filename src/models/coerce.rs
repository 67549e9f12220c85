//! Coerção de valores crus do Firestore
//!
//! Os documentos são escritos por mais de um cliente (app antigo, painel web)
//! e nem sempre têm o tipo esperado. Toda leitura passa por aqui: tipo certo
//! é usado, qualquer outra coisa cai no default do campo.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Só aceita booleano de verdade
pub fn to_bool(value: Option<&Value>, fallback: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(fallback)
}

/// Número JSON ou string numérica, sempre finito
pub fn to_num(value: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(fallback)
}

/// Inteiro (ordem, quantidade); decimais são truncados
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64),
        _ => None,
    }
}

/// Só aceita string
pub fn to_str(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Conversão leniente para texto (entrada de formulário)
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Truthiness de formulário: `false`, `0`, `""` e `null` são falsos
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Timestamp em epoch millis
///
/// Aceita string RFC 3339 (formato do store), número já em millis ou o
/// formato exportado `{seconds, nanos}` / `{_seconds, _nanoseconds}`.
pub fn timestamp_millis(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => seconds_field(map).map(|s| s * 1000),
        _ => None,
    }
}

fn seconds_field(map: &Map<String, Value>) -> Option<i64> {
    map.get("seconds")
        .or_else(|| map.get("_seconds"))
        .and_then(|v| to_int(Some(v)))
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_bool_is_strict() {
        assert!(to_bool(Some(&json!(true)), false));
        assert!(to_bool(Some(&json!("false")), true));
        assert!(to_bool(None, true));
        assert!(!to_bool(Some(&json!(1)), false));
    }

    #[test]
    fn test_to_num_accepts_numeric_strings() {
        assert_eq!(to_num(Some(&json!(199.9)), 0.0), 199.9);
        assert_eq!(to_num(Some(&json!(" 42 ")), 0.0), 42.0);
        assert_eq!(to_num(Some(&json!("abc")), 7.0), 7.0);
        assert_eq!(to_num(Some(&json!("NaN")), 7.0), 7.0);
        assert_eq!(to_num(Some(&json!(null)), 3.0), 3.0);
        assert_eq!(to_num(None, 0.0), 0.0);
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(Some(&json!(3))), Some(3));
        assert_eq!(to_int(Some(&json!(2.7))), Some(2));
        assert_eq!(to_int(Some(&json!("10"))), Some(10));
        assert_eq!(to_int(Some(&json!(true))), None);
        assert_eq!(to_int(None), None);
    }

    #[test]
    fn test_to_str_and_text() {
        assert_eq!(to_str(Some(&json!("Kit")), ""), "Kit");
        assert_eq!(to_str(Some(&json!(12)), "x"), "x");
        assert_eq!(to_text(&json!(12)), "12");
        assert_eq!(to_text(&Value::Null), "");
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!("sim")));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&Value::Null));
    }

    #[test]
    fn test_timestamp_millis() {
        assert_eq!(
            timestamp_millis(Some(&json!("2025-01-10T12:00:00.000Z"))),
            Some(1_736_510_400_000)
        );
        assert_eq!(
            timestamp_millis(Some(&json!({ "_seconds": 10, "_nanoseconds": 0 }))),
            Some(10_000)
        );
        assert_eq!(timestamp_millis(Some(&json!(1234))), Some(1234));
        assert_eq!(timestamp_millis(Some(&json!("ontem"))), None);
        assert_eq!(timestamp_millis(None), None);
    }
}
