use futures::future::BoxFuture;
use serde_json::json;

use crate::api::envelope::RequestEnvelope;
use crate::auth::extract_principal;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;
use crate::services::ItemService;
use crate::validation::{parse_payload, validate_create, validate_update};

pub type HandlerResult = Result<ApiResponse, ApiError>;

/// Route target: borrows the service and request for the lifetime of the call
pub type Handler = for<'a> fn(&'a ItemService, &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult>;

fn item_id(request: &RequestEnvelope) -> Result<&str, ApiError> {
    request
        .path_parameter("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing item id"))
}

/// GET /items
pub fn list_items<'a>(service: &'a ItemService, request: &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let principal = extract_principal(request)?;
        let items = service.list(&principal).await?;
        Ok(ApiResponse::success(&json!({ "items": items })))
    })
}

/// POST /items
pub fn create_item<'a>(service: &'a ItemService, request: &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let principal = extract_principal(request)?;
        let payload = parse_payload(request.body.as_deref())?;
        let fields = validate_create(&payload)?;
        let item = service.create(&principal, fields).await?;
        Ok(ApiResponse::created(&item))
    })
}

/// GET /items/{id}
pub fn get_item<'a>(service: &'a ItemService, request: &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let principal = extract_principal(request)?;
        let item = service.get(&principal, item_id(request)?).await?;
        Ok(ApiResponse::success(&item))
    })
}

/// PUT /items/{id}
pub fn update_item<'a>(service: &'a ItemService, request: &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let principal = extract_principal(request)?;
        let id = item_id(request)?;
        let payload = parse_payload(request.body.as_deref())?;
        let changes = validate_update(&payload)?;
        let item = service.update(&principal, id, changes).await?;
        Ok(ApiResponse::success(&item))
    })
}

/// DELETE /items/{id}
pub fn delete_item<'a>(service: &'a ItemService, request: &'a RequestEnvelope) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let principal = extract_principal(request)?;
        service.delete(&principal, item_id(request)?).await?;
        Ok(ApiResponse::success(&json!({ "message": "Item deleted successfully" })))
    })
}
