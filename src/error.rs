use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

/// Field-level validation failures, keyed by field name. Parsing collects
/// every violation before returning, so a caller sees the complete set in
/// one response rather than the first failing field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_body(self) -> JsonValue {
        let mut map = serde_json::Map::new();
        for (field, messages) in self.0 {
            map.insert(
                field,
                JsonValue::Array(messages.into_iter().map(JsonValue::String).collect()),
            );
        }
        JsonValue::Object(map)
    }
}

/// The four terminal outcomes a dispatch can fail with. None are retried;
/// the store write path is never reached once one of these is raised.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("not found")]
    NotFound,
    #[error("authentication credentials were not provided")]
    Unauthenticated,
    #[error("permission denied")]
    Forbidden,
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound => StatusCode::NOT_FOUND,
            DispatchError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DispatchError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn into_body(self) -> JsonValue {
        match self {
            DispatchError::Validation(errors) => errors.into_body(),
            DispatchError::NotFound => json!({"detail": "Not found."}),
            DispatchError::Unauthenticated => {
                json!({"detail": "Authentication credentials were not provided."})
            }
            DispatchError::Forbidden => {
                json!({"detail": "You do not have permission to perform this action."})
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("code", "This field is required.");
        errors.push("language", "\"cobol\" is not a valid choice.");
        errors.push("language", "second message");

        let body = errors.into_body();
        assert_eq!(body["code"], json!(["This field is required."]));
        assert_eq!(
            body["language"],
            json!(["\"cobol\" is not a valid choice.", "second message"])
        );
    }

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            DispatchError::Validation(FieldErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DispatchError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(DispatchError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(DispatchError::Forbidden.status(), StatusCode::FORBIDDEN);
    }
}
