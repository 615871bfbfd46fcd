pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "pfe")]
#[command(about = "PFE CLI - database setup and session tooling for the PFE teams API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the embedded SQL migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Create the default admin, coordinator and team leader accounts")]
    Seed,

    #[command(about = "Print the argon2 hash of a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },

    #[command(about = "Session token utilities")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Migrate => commands::database::migrate(output_format).await,
        Commands::Seed => commands::database::seed(output_format).await,
        Commands::HashPassword { password } => commands::password::hash(&password, output_format),
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["pfe", "token", "decode", "a.b.c", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Token { .. }));
    }

    #[test]
    fn hash_password_takes_one_argument() {
        assert!(Cli::try_parse_from(["pfe", "hash-password"]).is_err());
        let cli = Cli::try_parse_from(["pfe", "hash-password", "secret1"]).unwrap();
        assert!(matches!(cli.command, Commands::HashPassword { ref password } if password == "secret1"));
    }
}
