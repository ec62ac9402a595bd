use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::api::envelope::RequestEnvelope;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;
use crate::router::Router;
use crate::services::ItemService;

/// Wraps request handling. Implementations call `next.run(request)` to
/// continue the chain, or answer directly to short-circuit it.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, request: RequestEnvelope, next: Next<'_>) -> ApiResponse;
}

/// Remainder of the chain, ending at the router
pub struct Next<'a> {
    dispatcher: &'a Dispatcher,
    chain: &'a [Arc<dyn Interceptor>],
}

impl<'a> Next<'a> {
    pub async fn run(self, request: RequestEnvelope) -> ApiResponse {
        match self.chain.split_first() {
            Some((interceptor, rest)) => {
                let next = Next {
                    dispatcher: self.dispatcher,
                    chain: rest,
                };
                interceptor.intercept(request, next).await
            }
            None => self.dispatcher.route(request).await,
        }
    }
}

/// Router plus interceptors, outermost first
pub struct Dispatcher {
    router: Router,
    service: ItemService,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Dispatcher {
    pub fn new(router: Router, service: ItemService) -> Self {
        Self {
            router,
            service,
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor inside the ones already registered
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn service(&self) -> &ItemService {
        &self.service
    }

    /// Handle one request envelope; always produces a response
    pub async fn dispatch(&self, request: RequestEnvelope) -> ApiResponse {
        Next {
            dispatcher: self,
            chain: &self.interceptors,
        }
        .run(request)
        .await
    }

    async fn route(&self, mut request: RequestEnvelope) -> ApiResponse {
        let Some(matched) = self.router.resolve(&request.http_method, &request.path) else {
            debug!("No route for {} {}", request.http_method, request.path);
            return ApiError::not_found("Not Found").into();
        };

        debug!(
            mutation = matched.operation.is_mutation(),
            "Routing {} {} to {}",
            request.http_method,
            request.path,
            matched.operation.as_str()
        );
        request.resource = Some(matched.resource.to_string());
        request
            .path_parameters
            .get_or_insert_with(Default::default)
            .extend(matched.params);

        match (matched.handler)(&self.service, &request).await {
            Ok(response) => response,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_service;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Recorder {
        async fn intercept(&self, request: RequestEnvelope, next: Next<'_>) -> ApiResponse {
            self.log.lock().unwrap().push(format!("{}:before", self.name));
            let response = next.run(request).await;
            self.log.lock().unwrap().push(format!("{}:after", self.name));
            response
        }
    }

    struct Deny;

    #[async_trait]
    impl Interceptor for Deny {
        async fn intercept(&self, _request: RequestEnvelope, _next: Next<'_>) -> ApiResponse {
            ApiResponse::message(StatusCode::FORBIDDEN, "denied")
        }
    }

    #[tokio::test]
    async fn unmatched_route_is_404() {
        let dispatcher = Dispatcher::new(Router::items(), memory_service());
        let response = dispatcher
            .dispatch(RequestEnvelope::new("PATCH", "/items/a").with_subject("u1"))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "message": "Not Found" }));
    }

    #[tokio::test]
    async fn interceptors_wrap_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(Router::items(), memory_service())
            .with_interceptor(Recorder { name: "outer", log: log.clone() })
            .with_interceptor(Recorder { name: "inner", log: log.clone() });

        let response = dispatcher
            .dispatch(RequestEnvelope::new("GET", "/items").with_subject("u1"))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:before", "inner:before", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn interceptor_can_short_circuit() {
        let dispatcher = Dispatcher::new(Router::items(), memory_service()).with_interceptor(Deny);
        let response = dispatcher
            .dispatch(RequestEnvelope::new("GET", "/items").with_subject("u1"))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn router_fills_path_parameters() {
        let dispatcher = Dispatcher::new(Router::items(), memory_service());
        let created = dispatcher
            .dispatch(
                RequestEnvelope::new("POST", "/items")
                    .with_subject("u1")
                    .with_json(&json!({ "name": "Book", "description": "A novel" })),
            )
            .await;
        let id = created.body["id"].as_str().unwrap().to_string();

        // No pathParameters on the envelope; the router derives them from the path
        let fetched = dispatcher
            .dispatch(RequestEnvelope::new("GET", format!("/items/{}", id)).with_subject("u1"))
            .await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body["id"], json!(id));
    }

    #[tokio::test]
    async fn encoded_ids_reach_the_handler_decoded() {
        use crate::database::models::{Item, NewItem};

        let service = memory_service();
        let fields = NewItem {
            name: "Slash".to_string(),
            description: String::new(),
        };
        let item = Item::new("a/b".to_string(), "u1".to_string(), fields, crate::types::now());
        service.store().put(&item).await.unwrap();

        let dispatcher = Dispatcher::new(Router::items(), service);
        let response = dispatcher
            .dispatch(RequestEnvelope::new("GET", "/items/a%2Fb").with_subject("u1"))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["id"], json!("a/b"));
    }
}
