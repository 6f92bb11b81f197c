pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "skyriders")]
#[command(about = "SKYRIDERS site backend: API server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve,

    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Print the content schemas the editor will use")]
    Schemas,

    #[command(about = "Mint a development JWT for a user id")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
    let config = std::sync::Arc::new(crate::config::config().clone());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Schemas => commands::schemas::handle(config, output_format),
        Commands::Token(args) => commands::token::handle(args, config, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["skyriders"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn text_output_unless_json_is_asked_for() {
        let cli = Cli::parse_from(["skyriders", "schemas"]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));
        assert!(Cli::try_parse_from(["skyriders", "--text", "schemas"]).is_err());
    }

    #[test]
    fn token_takes_a_user_id() {
        let cli = Cli::parse_from([
            "skyriders",
            "--json",
            "token",
            "6f1c5f0e-8d6a-4f3e-9a55-3c1a0b8b9e21",
            "--email",
            "admin@skyriders.org",
        ]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Some(Commands::Token(args)) => {
                assert_eq!(args.email.as_deref(), Some("admin@skyriders.org"));
                assert_eq!(args.hours, None);
            }
            _ => panic!("expected token command"),
        }
    }
}
