use chrono::{TimeZone, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::auth::{decode_unverified, JwtError};
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Print the claims of a session token without verifying its signature")]
    Decode {
        #[arg(help = "Token value, as found in the `token` cookie")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Decode { token } => decode(&token, output_format),
    }
}

fn decode(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    // Decode at time zero so an expired token still shows its claims
    let claims = decode_unverified(token, 0).map_err(|e| match e {
        JwtError::Malformed(reason) => anyhow::anyhow!("not a session token: {reason}"),
        other => anyhow::anyhow!(other),
    })?;

    let now = Utc::now().timestamp();
    let expires = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| claims.exp.to_string());

    let value = json!({
        "claims": claims,
        "expired": claims.is_expired_at(now),
        "expiresAt": expires,
        "verified": false,
    });

    utils::output_value(output_format, "Session claims (signature NOT verified)", &value)
}
