use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

use super::chain::{Interceptor, Next};
use crate::api::envelope::RequestEnvelope;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;

/// Turns a panic anywhere below it into a 500 response
#[derive(Debug, Default, Clone, Copy)]
pub struct FaultBarrier;

#[async_trait]
impl Interceptor for FaultBarrier {
    async fn intercept(&self, request: RequestEnvelope, next: Next<'_>) -> ApiResponse {
        let request_id = request.request_id().to_string();

        match AssertUnwindSafe(next.run(request)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(request_id = %request_id, "Unhandled fault while processing request: {}", reason);
                ApiError::internal_server_error("Internal Server Error").into()
            }
        }
    }
}
