pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive CLI - command-line client for the Hive multi-tenant API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Base URL of the API server (default: HIVE_SERVER_URL or http://localhost:3000)"
    )]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Server status")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Tenant onboarding and listing")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Authentication and token acquisition")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Minimal HTTP client wrapper shared by all commands
pub struct ApiClient {
    base_url: String,
    pub http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let server = cli
        .server
        .or_else(|| std::env::var("HIVE_SERVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let client = ApiClient::new(server);

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &client, format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &client, format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &client, format).await,
    }
}
