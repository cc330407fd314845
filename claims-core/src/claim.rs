use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single claim as returned by the backend.
///
/// Fields are kept in the order the backend sent them, which is also the
/// order the presenter emits table rows in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim {
    fields: Map<String, Value>,
}

impl Claim {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Identifier of this claim under the given field name.
    ///
    /// A claim missing the field still gets an identifier, the literal text
    /// `undefined`, so every claim lands in the selection control.
    pub fn identifier(&self, id_field: &str) -> String {
        self.fields
            .get(id_field)
            .map(script_text)
            .unwrap_or_else(|| "undefined".to_string())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Claim {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Text a browser would show for `value` when coercing it to a string.
pub fn script_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        // Array coercion joins elements with commas, null members become empty
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => script_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Truthiness of a value as a script condition would evaluate it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
