use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::TokenAuthority;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) the token is issued for")]
    pub sub: String,

    #[arg(long, help = "Optional email claim")]
    pub email: Option<String>,

    #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let expiry_hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);

    let authority = TokenAuthority::new(&config.security.jwt_secret, expiry_hours)
        .context("JWT_SECRET must be set to issue tokens")?;
    let token = authority.issue(&args.sub, args.email)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Issued token for {}", args.sub),
            Some(json!({ "token": token, "expires_in_hours": expiry_hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
