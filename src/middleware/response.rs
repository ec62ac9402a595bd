use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::ApiError;

/// Headers carried by every response the dispatcher produces
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
];

/// Status plus JSON body, independent of the transport that delivers it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Serialize `data` as the body; a serialization failure becomes a 500
    pub fn with_status<T: Serialize>(data: &T, status: StatusCode) -> Self {
        match serde_json::to_value(data) {
            Ok(body) => Self::json(status, body),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Internal Server Error").into()
            }
        }
    }

    /// 200 OK
    pub fn success<T: Serialize>(data: &T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    /// 201 Created
    pub fn created<T: Serialize>(data: &T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// `{"message": ...}` body
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "message": message.into() }))
    }

    /// Gateway proxy-integration result shape
    pub fn to_proxy_response(&self) -> ProxyResponse {
        ProxyResponse {
            status_code: self.status.as_u16(),
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: self.body.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [
                (header::CONTENT_TYPE, DEFAULT_HEADERS[0].1),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, DEFAULT_HEADERS[1].1),
            ],
            self.body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_carries_201() {
        let response = ApiResponse::created(&json!({ "id": "a" }));
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["id"], json!("a"));
    }

    #[test]
    fn proxy_response_has_json_and_cors_headers() {
        let proxy = ApiResponse::message(StatusCode::NOT_FOUND, "Not Found").to_proxy_response();
        assert_eq!(proxy.status_code, 404);
        assert_eq!(proxy.headers["Content-Type"], "application/json");
        assert_eq!(proxy.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(proxy.body, r#"{"message":"Not Found"}"#);

        let wire = serde_json::to_value(&proxy).unwrap();
        assert_eq!(wire["statusCode"], json!(404));
    }

    #[test]
    fn into_response_sets_headers() {
        let response = ApiResponse::success(&json!({ "items": [] })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
