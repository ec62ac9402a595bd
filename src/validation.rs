//! Payload checks for create and update requests.
//!
//! Raw request bodies go in, typed [`NewItem`] / [`ItemChanges`] come out.
//! Unrecognized fields are ignored.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::database::models::{ItemChanges, NewItem};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// field name -> reason
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    fn with_fields(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        Self {
            message: message.into(),
            field_errors,
        }
    }
}

/// Parse a request body into a JSON object
pub fn parse_payload(body: Option<&str>) -> Result<Map<String, Value>, ValidationError> {
    let body = match body {
        Some(b) if !b.trim().is_empty() => b,
        _ => return Err(ValidationError::new("Request body is required")),
    };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::new("Request body must be a JSON object")),
        Err(e) => Err(ValidationError::new(format!("Invalid JSON: {}", e))),
    }
}

/// `name` (non-empty string) and `description` (string) are both required
pub fn validate_create(payload: &Map<String, Value>) -> Result<NewItem, ValidationError> {
    let mut errors = BTreeMap::new();

    let name = match payload.get("name") {
        None => {
            errors.insert("name".to_string(), "This field is required".to_string());
            None
        }
        Some(value) => check_name(value).map_err(|reason| errors.insert("name".to_string(), reason)).ok(),
    };

    let description = match payload.get("description") {
        None => {
            errors.insert("description".to_string(), "This field is required".to_string());
            None
        }
        Some(value) => check_string(value)
            .map_err(|reason| errors.insert("description".to_string(), reason))
            .ok(),
    };

    match (name, description) {
        (Some(name), Some(description)) if errors.is_empty() => Ok(NewItem { name, description }),
        _ => Err(ValidationError::with_fields("Invalid request body", errors)),
    }
}

/// Both fields optional, at least one required; present fields must be strings
pub fn validate_update(payload: &Map<String, Value>) -> Result<ItemChanges, ValidationError> {
    let mut errors = BTreeMap::new();
    let mut changes = ItemChanges::default();

    if let Some(value) = payload.get("name") {
        match check_name(value) {
            Ok(name) => changes.name = Some(name),
            Err(reason) => {
                errors.insert("name".to_string(), reason);
            }
        }
    }

    if let Some(value) = payload.get("description") {
        match check_string(value) {
            Ok(description) => changes.description = Some(description),
            Err(reason) => {
                errors.insert("description".to_string(), reason);
            }
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError::with_fields("Invalid request body", errors));
    }
    if changes.is_empty() {
        return Err(ValidationError::new("No valid fields to update"));
    }
    Ok(changes)
}

fn check_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Err("Must not be null".to_string()),
        _ => Err("Must be a string".to_string()),
    }
}

fn check_name(value: &Value) -> Result<String, String> {
    let name = check_string(value)?;
    if name.trim().is_empty() {
        return Err("Must not be empty".to_string());
    }
    Ok(name)
}
