use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::auth::TokenAuthority;
use crate::error::ApiError;

/// Claims of a verified bearer token, injected into request extensions
#[derive(Clone, Debug)]
pub struct VerifiedClaims(pub Map<String, Value>);

/// JWT authentication middleware that validates tokens and attaches their claims.
///
/// A request without an `Authorization` header passes through unauthenticated;
/// the item handlers answer it with 401. A header that is present but malformed
/// or carries an invalid token is rejected here.
pub async fn jwt_auth_middleware(
    State(tokens): State<Arc<TokenAuthority>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)?;

    if let Some(token) = token {
        let claims = tokens.verify(&token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ApiError::from(e)
        })?;
        request.extensions_mut().insert(VerifiedClaims(claims));
    }

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
