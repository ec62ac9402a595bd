use anyhow::Context;
use clap::Args;
use std::io::Read;

use crate::api::envelope::RequestEnvelope;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database;
use crate::server::build_dispatcher;

#[derive(Args, Debug)]
pub struct InvokeArgs {
    #[arg(long, help = "Path to a request envelope JSON file, or - for stdin")]
    pub event: String,
}

pub async fn handle(args: InvokeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = read_event(&args.event)?;
    let envelope: RequestEnvelope = serde_json::from_str(&raw).context("event is not a valid request envelope")?;

    let config = AppConfig::from_env();
    config.validate()?;
    let store = database::connect(&config.storage)
        .await
        .context("failed to initialize item store")?;

    let response = build_dispatcher(store, &config.api).dispatch(envelope).await;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response.to_proxy_response())?);
        }
        OutputFormat::Text => {
            println!("{}", response.status);
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
    }
    Ok(())
}

fn read_event(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read event from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read event file {}", source))
    }
}
