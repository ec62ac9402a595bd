#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use items_api_rust::auth::TokenAuthority;
use items_api_rust::config::ApiConfig;
use items_api_rust::database::InMemoryItemStore;
use items_api_rust::server::{app, AppState};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub tokens: TokenAuthority,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let tokens = TokenAuthority::new(TEST_SECRET, 1)?;
        let api = ApiConfig {
            enable_request_logging: false,
            max_request_size_bytes: 64 * 1024,
        };
        let state = AppState::new(Arc::new(InMemoryItemStore::new()), tokens.clone(), &api);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            port,
            base_url,
            tokens,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token_for(&self, sub: &str) -> String {
        self.tokens.issue(sub, None).expect("issue test token")
    }

    /// Authenticated request as `sub`; returns status and parsed JSON body
    pub async fn call(&self, sub: &str, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(self.token_for(sub));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let res = request.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

/// Fresh server with an empty in-memory store, one per test.
pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
