use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("schema document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Name of a JSON value's kind, for messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
