pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "items")]
#[command(about = "Items CLI - tokens, local invocation and remote item management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Issue a signed development token")]
    Token(commands::token::TokenArgs),

    #[command(about = "Dispatch one request envelope against the configured store")]
    Invoke(commands::invoke::InvokeArgs),

    #[command(about = "Manage items on a running server")]
    Item {
        #[command(flatten)]
        remote: commands::item::RemoteArgs,

        #[command(subcommand)]
        cmd: commands::item::ItemCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Invoke(args) => commands::invoke::handle(args, output_format).await,
        Commands::Item { remote, cmd } => commands::item::handle(remote, cmd, output_format).await,
    }
}
