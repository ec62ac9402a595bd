mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server.client.get(server.url("/items")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server
        .client
        .get(server.url("/items"))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let foreign = items_api_rust::auth::TokenAuthority::new("some-other-secret", 1)?;

    let res = server
        .client
        .get(server.url("/items"))
        .bearer_auth(foreign.issue("u1", None)?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_items() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server
        .client
        .get(server.url("/items"))
        .bearer_auth(server.token_for("u1"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    Ok(())
}
