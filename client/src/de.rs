//! Deserializers for the backend's loose typing: ids and amounts arrive as
//! either JSON strings or numbers, sometimes `null`.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String, number or bool → `Some(String)`; `null`/absent → `None`.
pub fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(|v| value_to_string(&v)))
}

/// Like [`opt_string`] but the field is required.
pub fn string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(d)?.ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Number or numeric string → `f64`; anything else → 0.
pub fn flex_f64<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_amount(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

/// `true`, `1`, `"true"`, `"success"` → `Some(true)`; other values → `Some(false)`.
pub fn opt_flag<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.map(|v| match v {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "success" | "1"),
        _ => false,
    }))
}

pub fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Leading-number parse of a money string: `"1500.50"` → 1500.5,
/// `"20 NGN"` → 20.0, garbage → `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let end = s
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    s[..end].parse().ok()
}
