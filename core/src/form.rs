//! Multipart form fields as plain data.
//!
//! Request payloads are flattened into ordered `(name, value)` pairs.
//! Absent values are skipped rather than sent empty, numbers and booleans
//! are stringified, and nested structures are rejected before dispatch.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Ordered list of text fields for a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a serializable struct into form fields.
    ///
    /// The payload must serialize to a JSON object whose values are scalars
    /// or null. Null values are omitted.
    pub fn from_serialize<T: Serialize>(payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ApiError::Malformed(
                "form payload must be a flat object".to_string(),
            ));
        };

        let mut form = Form::new();
        for (name, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => form.push(name, s),
                Value::Bool(b) => form.push(name, b.to_string()),
                Value::Number(n) => form.push(name, n.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::Malformed(format!(
                        "form field {name} must be a scalar value"
                    )));
                }
            }
        }
        Ok(form)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        seats: u32,
        active: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        nickname: Option<String>,
        note: Option<String>,
    }

    #[test]
    fn flattens_scalars_and_skips_nulls() {
        let form = Form::from_serialize(&Sample {
            name: "Ada".to_string(),
            seats: 4,
            active: true,
            nickname: None,
            note: None,
        })
        .unwrap();

        assert_eq!(form.len(), 3);
        assert_eq!(form.get("name"), Some("Ada"));
        assert_eq!(form.get("seats"), Some("4"));
        assert_eq!(form.get("active"), Some("true"));
        assert_eq!(form.get("note"), None);
    }

    #[test]
    fn empty_strings_are_kept() {
        let form = Form::from_serialize(&serde_json::json!({ "surname": "" })).unwrap();
        assert_eq!(form.get("surname"), Some(""));
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = Form::from_serialize(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn rejects_nested_values() {
        let err = Form::from_serialize(&serde_json::json!({ "tags": ["a"] })).unwrap_err();
        assert_eq!(err.message(), "form field tags must be a scalar value");
    }
}
