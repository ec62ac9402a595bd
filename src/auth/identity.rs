use serde_json::Value;
use thiserror::Error;

use crate::api::envelope::RequestEnvelope;

/// Authenticated caller, identified by the `sub` claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("request carries no authorizer claims")]
    MissingClaims,

    #[error("authorizer claims have no subject")]
    MissingSubject,

    #[error("subject claim must be a non-empty string")]
    InvalidSubject,
}

/// Read the principal from `requestContext.authorizer.claims.sub`.
/// The claims were verified upstream; nothing is re-checked here.
pub fn extract_principal(request: &RequestEnvelope) -> Result<Principal, IdentityError> {
    let claims = request.claims().ok_or(IdentityError::MissingClaims)?;

    match claims.get("sub") {
        None => Err(IdentityError::MissingSubject),
        Some(Value::String(sub)) if !sub.trim().is_empty() => Ok(Principal::new(sub.clone())),
        Some(_) => Err(IdentityError::InvalidSubject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn claims(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn extracts_subject() {
        let request = RequestEnvelope::new("GET", "/items").with_subject("u1");
        assert_eq!(extract_principal(&request).unwrap().subject(), "u1");
    }

    #[test]
    fn missing_authorizer_is_rejected() {
        let request = RequestEnvelope::new("GET", "/items");
        assert_eq!(extract_principal(&request), Err(IdentityError::MissingClaims));
    }

    #[test]
    fn missing_or_malformed_subject_is_rejected() {
        let request = RequestEnvelope::new("GET", "/items").with_claims(claims(json!({ "email": "a@b.c" })));
        assert_eq!(extract_principal(&request), Err(IdentityError::MissingSubject));

        let request = RequestEnvelope::new("GET", "/items").with_claims(claims(json!({ "sub": 7 })));
        assert_eq!(extract_principal(&request), Err(IdentityError::InvalidSubject));

        let request = RequestEnvelope::new("GET", "/items").with_claims(claims(json!({ "sub": "  " })));
        assert_eq!(extract_principal(&request), Err(IdentityError::InvalidSubject));
    }

    #[test]
    fn authorizer_without_claims_is_rejected() {
        let event = json!({
            "httpMethod": "GET",
            "path": "/items",
            "requestContext": { "authorizer": {} }
        });
        let request: RequestEnvelope = serde_json::from_value(event).unwrap();
        assert_eq!(extract_principal(&request), Err(IdentityError::MissingClaims));
    }
}
