use anyhow::Context;
use clap::Subcommand;

use crate::cli::{ApiClient, OutputFormat};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server and master database health")]
    Health,

    #[command(about = "Show server info and available endpoints")]
    Info,
}

pub async fn handle(
    cmd: ServerCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health => {
            let response = client
                .http
                .get(client.url("/health"))
                .send()
                .await
                .context("server unreachable")?;
            let status = response.status();
            let body = response.json::<serde_json::Value>().await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    let state = body["status"].as_str().unwrap_or("unknown");
                    println!("server: {} ({})", state, status);
                }
            }
            Ok(())
        }
        ServerCommands::Info => {
            let body = client
                .http
                .get(client.url("/"))
                .send()
                .await
                .context("server unreachable")?
                .json::<serde_json::Value>()
                .await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    println!(
                        "{} {}",
                        body["name"].as_str().unwrap_or("?"),
                        body["version"].as_str().unwrap_or("?")
                    );
                    if let Some(endpoints) = body["endpoints"].as_object() {
                        for (name, route) in endpoints {
                            println!("  {:<12} {}", name, route.as_str().unwrap_or(""));
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
