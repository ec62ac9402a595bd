use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Normalized request as handed over by the gateway in front of the service.
/// Mirrors the proxy-integration event shape (camelCase on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub http_method: String,
    pub path: String,
    /// Matched route pattern, e.g. `/items/{id}`; filled in by the router
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: RequestContext,
}

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

/// Claims verified by the identity provider before the request reaches us
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: Option<Map<String, Value>>,
}

impl RequestEnvelope {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_context.request_id = Some(request_id.into());
        self
    }

    pub fn with_claims(mut self, claims: Map<String, Value>) -> Self {
        self.request_context.authorizer = Some(Authorizer { claims: Some(claims) });
        self
    }

    /// Shorthand for an envelope whose only claim is `sub`
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::String(subject.into()));
        self.with_claims(claims)
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    pub fn claims(&self) -> Option<&Map<String, Value>> {
        self.request_context
            .authorizer
            .as_ref()
            .and_then(|authorizer| authorizer.claims.as_ref())
    }

    pub fn request_id(&self) -> &str {
        self.request_context.request_id.as_deref().unwrap_or("-")
    }
}
