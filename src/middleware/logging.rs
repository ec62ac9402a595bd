use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn, Instrument};

use super::chain::{Interceptor, Next};
use crate::api::envelope::RequestEnvelope;
use crate::middleware::response::ApiResponse;

/// Logs method, path, status and latency of every dispatched request
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

#[async_trait]
impl Interceptor for RequestLogger {
    async fn intercept(&self, request: RequestEnvelope, next: Next<'_>) -> ApiResponse {
        let span = tracing::info_span!(
            "request",
            request_id = %request.request_id(),
            method = %request.http_method,
            path = %request.path,
        );

        async move {
            let started = Instant::now();
            let response = next.run(request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            if response.status.is_server_error() {
                warn!(status = response.status.as_u16(), elapsed_ms, "request failed");
            } else {
                info!(status = response.status.as_u16(), elapsed_ms, "request completed");
            }
            response
        }
        .instrument(span)
        .await
    }
}
