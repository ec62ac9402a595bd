use anyhow::{anyhow, Context};
use clap::{Args, Subcommand};
use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};
use url::Url;

use crate::cli::utils::{output_empty_collection, output_error, output_items, output_success};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct RemoteArgs {
    #[arg(long, env = "ITEMS_API_URL", default_value = "http://127.0.0.1:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, env = "ITEMS_API_TOKEN", help = "Bearer token (see `items token`)")]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    #[command(about = "List your items")]
    List,

    #[command(about = "Create an item")]
    Create {
        #[arg(long, help = "Item name")]
        name: String,
        #[arg(long, default_value = "", help = "Item description")]
        description: String,
    },

    #[command(about = "Show one item")]
    Get {
        #[arg(help = "Item ID")]
        id: String,
    },

    #[command(about = "Change name and/or description")]
    Update {
        #[arg(help = "Item ID")]
        id: String,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
    },

    #[command(about = "Delete an item")]
    Delete {
        #[arg(help = "Item ID")]
        id: String,
    },
}

/// Thin HTTP client for the item routes
pub struct ItemsClient {
    base: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl ItemsClient {
    pub fn new(base: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid server URL: {}", base))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("server URL cannot be used as a base: {}", base));
        }

        Ok(Self {
            base,
            token,
            http: reqwest::Client::new(),
        })
    }

    /// `<base>/items` or `<base>/items/<id>`, with the id percent-encoded
    pub fn endpoint(&self, id: Option<&str>) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("server URL cannot be used as a base"))?;
            segments.pop_if_empty().push("items");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    pub async fn send(&self, method: Method, id: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = self.http.request(method, self.endpoint(id)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.context("request to server failed")?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

pub async fn handle(remote: RemoteArgs, cmd: ItemCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ItemsClient::new(&remote.url, remote.token)?;

    let (status, body) = match &cmd {
        ItemCommands::List => client.send(Method::GET, None, None).await?,
        ItemCommands::Create { name, description } => {
            let payload = json!({ "name": name, "description": description });
            client.send(Method::POST, None, Some(payload)).await?
        }
        ItemCommands::Get { id } => client.send(Method::GET, Some(id), None).await?,
        ItemCommands::Update { id, name, description } => {
            let mut payload = Map::new();
            if let Some(name) = name {
                payload.insert("name".to_string(), json!(name));
            }
            if let Some(description) = description {
                payload.insert("description".to_string(), json!(description));
            }
            client.send(Method::PUT, Some(id), Some(Value::Object(payload))).await?
        }
        ItemCommands::Delete { id } => client.send(Method::DELETE, Some(id), None).await?,
    };

    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        output_error(&output_format, &message, Some(status.as_u16()))?;
        return Err(anyhow!("server answered {}: {}", status, message));
    }

    match cmd {
        ItemCommands::List => {
            let items = body
                .get("items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if items.is_empty() {
                output_empty_collection(&output_format, "items", "No items found")
            } else {
                output_items(&output_format, &items)
            }
        }
        ItemCommands::Delete { id } => output_success(&output_format, &format!("Deleted item {}", id), None),
        _ => output_items(&output_format, std::slice::from_ref(&body)),
    }
}
